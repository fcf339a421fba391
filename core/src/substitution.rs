/// Placeholder substitution: swaps an extracted fragment for the marker of
/// its block's first sentence.
use crate::records::SentenceRecord;
use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, NodeData};
use serde_json::Value;

/// A place in the document or payload that holds fragment text.
pub enum FragmentLocation<'a> {
    TextNode(&'a Handle),
    Attribute { element: &'a Handle, name: &'a str },
    Value(&'a mut Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    Replaced { placeholder: String },
    NoOp,
}

impl Substitution {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Substitution::Replaced { .. })
    }
}

/// With no sentences the location is left untouched.
pub fn substitute(location: FragmentLocation<'_>, sentences: &[SentenceRecord]) -> Substitution {
    let Some(first) = sentences.first() else {
        return Substitution::NoOp;
    };
    let placeholder = first.id.placeholder();

    let replaced = match location {
        FragmentLocation::TextNode(node) => match &node.data {
            NodeData::Text { contents } => {
                let mut contents = contents.borrow_mut();
                let padded = keep_padding(&contents, &placeholder);
                *contents = StrTendril::from_slice(&padded);
                true
            }
            _ => false,
        },
        FragmentLocation::Attribute { element, name } => match &element.data {
            NodeData::Element { attrs, .. } => {
                let mut attrs = attrs.borrow_mut();
                match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
                    Some(attr) => {
                        attr.value = StrTendril::from_slice(&placeholder);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        },
        FragmentLocation::Value(slot) => {
            *slot = Value::String(placeholder.clone());
            true
        }
    };

    if replaced {
        Substitution::Replaced { placeholder }
    } else {
        Substitution::NoOp
    }
}

/// Keep the original leading and trailing whitespace around `replacement`.
fn keep_padding(original: &str, replacement: &str) -> String {
    let trimmed_start = original.trim_start();
    let leading = &original[..original.len() - trimmed_start.len()];
    let trailing = &trimmed_start[trimmed_start.trim_end().len()..];
    format!("{leading}{replacement}{trailing}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::dom::{CandidateLocation, HtmlDocument};
    use crate::ids::BlockCounter;
    use serde_json::json;

    fn sentences(n: usize) -> Vec<SentenceRecord> {
        let block = BlockCounter::new().peek();
        (1..=n)
            .map(|i| SentenceRecord {
                id: block.sentence(i),
                text: format!("Sentence {i}."),
                words: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn keeps_whitespace_padding() {
        assert_eq!(keep_padding("  Hello \n", "__X__"), "  __X__ \n");
        assert_eq!(keep_padding("Hello", "__X__"), "__X__");
    }

    #[test]
    fn replaces_text_node_and_attribute() {
        let document = HtmlDocument::parse(r#"<p> Hello world. </p><img alt="Bike">"#);
        let candidates = document.collect_candidates(&Classifier::default());

        let CandidateLocation::TextNode(node) = &candidates.text_nodes[0].location else {
            panic!("expected text node");
        };
        let result = substitute(FragmentLocation::TextNode(node), &sentences(2));
        assert_eq!(
            result,
            Substitution::Replaced {
                placeholder: "__BLOCK_1_S1__".into()
            }
        );

        let alt = candidates
            .attributes
            .iter()
            .find(|c| c.context == "alt")
            .unwrap();
        let CandidateLocation::Attribute { element, name } = &alt.location else {
            panic!("expected attribute");
        };
        assert!(substitute(
            FragmentLocation::Attribute { element, name },
            &sentences(1)
        )
        .is_replaced());

        let html = document.serialize().unwrap();
        assert!(html.contains("<p> __BLOCK_1_S1__ </p>"));
        assert!(html.contains(r#"alt="__BLOCK_1_S1__""#));
    }

    #[test]
    fn zero_sentences_is_a_noop() {
        let mut value = json!("Acme Corp");
        let result = substitute(FragmentLocation::Value(&mut value), &[]);
        assert_eq!(result, Substitution::NoOp);
        assert_eq!(value, json!("Acme Corp"));

        let result = substitute(FragmentLocation::Value(&mut value), &sentences(1));
        assert!(result.is_replaced());
        assert_eq!(value, json!("__BLOCK_1_S1__"));
    }

    #[test]
    fn missing_attribute_is_a_noop() {
        let document = HtmlDocument::parse(r#"<img alt="Bike">"#);
        let candidates = document.collect_candidates(&Classifier::default());
        let CandidateLocation::Attribute { element, .. } = &candidates.attributes[0].location
        else {
            panic!("expected attribute");
        };
        let result = substitute(
            FragmentLocation::Attribute {
                element,
                name: "title",
            },
            &sentences(1),
        );
        assert_eq!(result, Substitution::NoOp);
    }
}
