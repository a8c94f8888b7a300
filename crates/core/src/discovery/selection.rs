//! Compiled selection predicates.

use regex_lite::Regex;
use thiserror::Error;

use crate::config::SelectionConfig;

/// A selection pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid selection pattern {field}: {source}")]
pub struct SelectionError {
    pub field: &'static str,
    #[source]
    source: regex_lite::Error,
}

/// The four tree-level predicates plus the derived nightly filename
/// pattern, compiled once at construction.
///
/// The nightly pattern recombines the raw locale/target/filename patterns
/// into `{product}-(version).(locale).(target)(filename)` so a single
/// nightly file name yields all three captured attributes.
#[derive(Debug)]
pub struct Selection {
    version: Regex,
    target: Regex,
    locale: Regex,
    filename: Regex,
    nightly_file: Regex,
}

impl Selection {
    /// Compile the configured patterns for the given product.
    pub fn compile(config: &SelectionConfig, product: &str) -> Result<Self, SelectionError> {
        let compile = |field: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| SelectionError { field, source })
        };

        let nightly_pattern = format!(
            "{}-(.+)\\.({})\\.({}){}",
            product, config.locale, config.target, config.filename
        );

        Ok(Self {
            version: compile("version", &config.version)?,
            target: compile("target", &config.target)?,
            locale: compile("locale", &config.locale)?,
            filename: compile("filename", &config.filename)?,
            nightly_file: compile("nightly filename", &nightly_pattern)?,
        })
    }

    pub fn version_matches(&self, version: &str) -> bool {
        self.version.is_match(version)
    }

    pub fn target_matches(&self, target_prefix: &str) -> bool {
        self.target.is_match(target_prefix)
    }

    pub fn locale_matches(&self, locale_prefix: &str) -> bool {
        self.locale.is_match(locale_prefix)
    }

    pub fn filename_matches(&self, filename: &str) -> bool {
        self.filename.is_match(filename)
    }

    /// Match a nightly file name, capturing `(version, locale, target)`.
    pub fn nightly_captures(&self, filename: &str) -> Option<(String, String, String)> {
        let caps = self.nightly_file.captures(filename)?;
        Some((
            caps.get(1)?.as_str().to_string(),
            caps.get(2)?.as_str().to_string(),
            caps.get(3)?.as_str().to_string(),
        ))
    }
}
