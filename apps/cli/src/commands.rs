//! Subcommand implementations

use anyhow::{Context, Result};
use clap::Args;
use markup_extractor_core::{Extractor, ExtractorConfig, LanguageStats};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// HTML document to extract from
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Fixed language for every fragment (disables detection)
    #[arg(short, long, value_name = "CODE")]
    pub lang: Option<String>,

    /// Language used when detection and lang attributes give nothing
    #[arg(long, value_name = "CODE")]
    pub default_lang: Option<String>,

    /// Directory for the artifacts (default: next to the input)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// YAML or JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of a remote annotation service
    #[arg(long, value_name = "URL", env = "MARKUP_EXTRACTOR_ANNOTATOR_URL")]
    pub annotator_url: Option<String>,
}

impl ExtractArgs {
    /// File settings first, flags on top.
    fn load_config(&self) -> Result<ExtractorConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractorConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ExtractorConfig::default(),
        };

        if let Some(lang) = &self.lang {
            config.language.language = Some(lang.clone());
        }
        if let Some(default_lang) = &self.default_lang {
            config.language.default_language = default_lang.clone();
        }
        if let Some(url) = &self.annotator_url {
            config.language.annotator_url = Some(url.clone());
        }
        Ok(config)
    }

    fn out_dir(&self) -> PathBuf {
        match &self.out_dir {
            Some(dir) => dir.clone(),
            None => self
                .input
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn execute(&self) -> Result<()> {
        log::debug!("Arguments: {:?}", self);
        let config = self.load_config()?;
        let out_dir = self.out_dir();

        let mut extractor =
            Extractor::from_config(config).context("Failed to set up the extractor")?;
        let (output, paths) = extractor
            .extract_to_dir(&self.input, &out_dir)
            .with_context(|| format!("Failed to extract {}", self.input.display()))?;

        print!("{}", output.summary);
        println!("Artifacts:");
        for path in [&paths.flat, &paths.structured, &paths.sentences, &paths.document] {
            println!("  {}", path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Structured map written by `extract`
    #[arg(value_name = "STRUCTURED_JSON")]
    pub structured: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    pub fn execute(&self) -> Result<()> {
        let stats = LanguageStats::load(&self.structured)
            .with_context(|| format!("Failed to read {}", self.structured.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print!("{}", stats.render());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str) -> ExtractArgs {
        ExtractArgs {
            input: PathBuf::from(input),
            lang: None,
            default_lang: None,
            out_dir: None,
            config: None,
            annotator_url: None,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let mut args = args("page.html");
        args.lang = Some("de".into());
        args.default_lang = Some("fr".into());

        let config = args.load_config().unwrap();
        assert_eq!(config.language.language.as_deref(), Some("de"));
        assert_eq!(config.language.default_language, "fr");
        assert!(config.language.annotator_url.is_none());
    }

    #[test]
    fn out_dir_defaults_to_input_parent() {
        assert_eq!(args("site/page.html").out_dir(), PathBuf::from("site"));
        assert_eq!(args("page.html").out_dir(), PathBuf::from("."));
    }
}
