//! # Source Classifier
//!
//! Maps a record's raw provenance label plus its validated flag onto one of
//! the fixed [`SourceCategory`] values.
//!
//! - Case-insensitive match against a configurable news-outlet allow-list.
//! - Labels carrying the citizen-report marker split on the validated flag.
//! - Everything else fails open to the news category, so an unrecognized
//!   label can never silently hide a record.
//! - Allow-list loads from TOML or JSON config with a built-in seed fallback.
//!
//! Classification is deterministic and re-derived per record at evaluation
//! time; it is never stored on the record.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::SourceCategory;

pub const ENV_SOURCES_PATH: &str = "HAZARD_SOURCES_PATH";
const DEFAULT_TOML_PATH: &str = "config/news_sources.toml";
const DEFAULT_JSON_PATH: &str = "config/news_sources.json";

/// Substring that marks a label as a citizen report (e.g. "citizen_report",
/// "citizen_unverified").
const CITIZEN_MARKER: &str = "citizen";

/// Classifier over a normalized news-outlet allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceClassifier {
    outlets: BTreeSet<String>,
}

impl Default for SourceClassifier {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SourceClassifier {
    /// Classify a raw provenance label.
    ///
    /// Order matters: a label on the outlet allow-list is news regardless of
    /// the validated flag; only then is the citizen marker consulted.
    pub fn classify(&self, raw_label: &str, validated: bool) -> SourceCategory {
        let label = normalize(raw_label);
        if self.outlets.contains(&label) {
            return SourceCategory::News;
        }
        if label.contains(CITIZEN_MARKER) {
            return if validated {
                SourceCategory::CitizenVerified
            } else {
                SourceCategory::CitizenUnverified
            };
        }
        SourceCategory::News
    }

    /// Build a classifier from explicit outlet labels (normalized on the way in).
    pub fn from_outlets<I, S>(outlets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outlets = outlets
            .into_iter()
            .map(|s| normalize(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self { outlets }
    }

    /// Load using env var + fallbacks:
    /// 1) $HAZARD_SOURCES_PATH
    /// 2) config/news_sources.toml
    /// 3) config/news_sources.json
    /// 4) built-in seed
    ///
    /// A broken config file logs a warning and falls back to the seed; the
    /// classifier itself never fails to construct.
    pub fn from_env_or_default() -> Self {
        let candidate = std::env::var(ENV_SOURCES_PATH)
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH]
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
            });

        match candidate {
            Some(path) => match load_outlets_from(&path) {
                Ok(outlets) => Self::from_outlets(outlets),
                Err(e) => {
                    tracing::warn!(error = ?e, path = %path.display(), "news-sources config unusable, using seed");
                    Self::default_seed()
                }
            },
            None => Self::default_seed(),
        }
    }

    /// Built-in seed: the Philippine outlets the RSS pipeline ingests.
    pub(crate) fn default_seed() -> Self {
        static SEED: Lazy<BTreeSet<String>> = Lazy::new(|| {
            [
                "gma_news",
                "gma",
                "rappler",
                "abs_cbn",
                "inquirer",
                "philstar",
                "manila_bulletin",
                "pna",
            ]
            .into_iter()
            .map(normalize)
            .collect()
        });
        Self {
            outlets: SEED.clone(),
        }
    }
}

/// Load outlet labels from an explicit path. Supports TOML or JSON formats.
pub fn load_outlets_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading news sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_outlets(&content, ext.as_str())
}

fn parse_outlets(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    let try_toml = hint_ext == "toml" || s.contains("outlets");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported news-sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlOutlets {
        outlets: Vec<String>,
    }
    let v: TomlOutlets = toml::from_str(s)?;
    Ok(v.outlets)
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(v)
}

/// Normalize a provenance label: lowercase, separators to spaces, collapse
/// whitespace. "GMA-News" and "gma_news" classify identically.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    for ch in ['—', '–', '-', '_', '/', '\\', '.'] {
        out = out.replace(ch, " ");
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clf() -> SourceClassifier {
        SourceClassifier::default_seed()
    }

    #[test]
    fn known_outlet_is_news_regardless_of_flag() {
        let c = clf();
        assert_eq!(c.classify("gma_news", true), SourceCategory::News);
        assert_eq!(c.classify("gma_news", false), SourceCategory::News);
        assert_eq!(c.classify("rappler", false), SourceCategory::News);
    }

    #[test]
    fn outlet_match_is_case_and_separator_insensitive() {
        let c = clf();
        assert_eq!(c.classify("GMA_NEWS", false), SourceCategory::News);
        assert_eq!(c.classify("Gma-News", false), SourceCategory::News);
        assert_eq!(c.classify("  manila.bulletin ", false), SourceCategory::News);
    }

    #[test]
    fn citizen_marker_splits_on_validated_flag() {
        let c = clf();
        assert_eq!(
            c.classify("citizen_report", true),
            SourceCategory::CitizenVerified
        );
        assert_eq!(
            c.classify("citizen_report", false),
            SourceCategory::CitizenUnverified
        );
        assert_eq!(
            c.classify("citizen_unverified", false),
            SourceCategory::CitizenUnverified
        );
    }

    #[test]
    fn unknown_label_fails_open_to_news() {
        let c = clf();
        assert_eq!(c.classify("mystery_blog", false), SourceCategory::News);
        assert_eq!(c.classify("", true), SourceCategory::News);
    }

    #[test]
    fn classification_is_deterministic() {
        let c = clf();
        let a = c.classify("citizen_report", false);
        let b = c.classify("citizen_report", false);
        assert_eq!(a, b);
    }

    #[test]
    fn toml_and_json_outlet_lists_parse() {
        let toml = r#"outlets = ["gma_news", "rappler"]"#;
        let json = r#"["gma_news", "rappler"]"#;
        assert_eq!(parse_outlets(toml, "toml").unwrap().len(), 2);
        assert_eq!(parse_outlets(json, "json").unwrap().len(), 2);
        assert!(parse_outlets("not a list", "txt").is_err());
    }

    #[test]
    fn configured_outlets_replace_the_seed() {
        let c = SourceClassifier::from_outlets(["barangay_bulletin"]);
        assert_eq!(c.classify("barangay_bulletin", false), SourceCategory::News);
        // The seed outlet is gone but still fails open to news.
        assert_eq!(c.classify("gma_news", false), SourceCategory::News);
    }
}
