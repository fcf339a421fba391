/// Input decoding for markup documents
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl Encoding {
    /// Sniff the byte-order mark, then fall back to UTF-8 validation.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            Encoding::Utf8Bom
        } else if bytes.starts_with(&[0xFF, 0xFE]) {
            Encoding::Utf16Le
        } else if bytes.starts_with(&[0xFE, 0xFF]) {
            Encoding::Utf16Be
        } else if std::str::from_utf8(bytes).is_ok() {
            Encoding::Utf8
        } else {
            Encoding::Latin1
        }
    }
}

/// Decoded document text and the encoding it was read from.
#[derive(Debug, Clone)]
pub struct DecodedInput {
    pub text: String,
    pub encoding: Encoding,
}

pub fn read_document(path: &Path) -> io::Result<DecodedInput> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

pub fn decode(bytes: &[u8]) -> io::Result<DecodedInput> {
    let encoding = Encoding::detect(bytes);
    let text = match encoding {
        Encoding::Utf8 => utf8(bytes)?,
        Encoding::Utf8Bom => utf8(&bytes[3..])?,
        Encoding::Utf16Le => utf16(&bytes[2..], u16::from_le_bytes)?,
        Encoding::Utf16Be => utf16(&bytes[2..], u16::from_be_bytes)?,
        // Latin-1 bytes map 1:1 onto U+0000..U+00FF
        Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    };
    if encoding != Encoding::Utf8 {
        log::debug!("Decoded input as {:?}", encoding);
    }
    Ok(DecodedInput { text, encoding })
}

fn utf8(bytes: &[u8]) -> io::Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> io::Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "odd number of bytes in UTF-16 input",
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
