//! Annotator configuration.
//!
//! Settings come either from a flat property map (the shape pipelines pass
//! around) or from a TOML table. Properties the annotator does not recognize
//! are kept in [`CorefConfig::resolver`] and passed through untouched.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, SievePass};

/// Default for `dcoref.allowReparsing`.
pub const ALLOW_REPARSING: bool = true;

pub const OLD_FORMAT_PROP: &str = "oldCorefFormat";
pub const ALLOW_REPARSING_PROP: &str = "dcoref.allowReparsing";
pub const SIEVE_PASSES_PROP: &str = "dcoref.sievePasses";
pub const DICTIONARIES_PROP: &str = "dcoref.dictionaries";

/// Configuration for [`crate::DeterministicCorefAnnotator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorefConfig {
    /// Also emit the legacy link graph and token clusters.
    pub old_coref_format: bool,
    /// Let the mention finder parse sentences that arrive without a tree.
    pub allow_reparsing: bool,
    /// Sieve passes, in the order they run.
    pub sieve_passes: Vec<SievePass>,
    /// Word-list file replacing the built-in English dictionaries.
    pub dictionaries: Option<PathBuf>,
    /// Unrecognized properties, passed through to the resolver.
    pub resolver: BTreeMap<String, String>,
}

impl Default for CorefConfig {
    fn default() -> Self {
        Self {
            old_coref_format: false,
            allow_reparsing: ALLOW_REPARSING,
            sieve_passes: SievePass::DEFAULT.to_vec(),
            dictionaries: None,
            resolver: BTreeMap::new(),
        }
    }
}

impl CorefConfig {
    /// Read settings from a property map.
    pub fn from_properties(props: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, value) in props {
            match key.as_str() {
                OLD_FORMAT_PROP => config.old_coref_format = parse_bool(key, value)?,
                ALLOW_REPARSING_PROP => config.allow_reparsing = parse_bool(key, value)?,
                SIEVE_PASSES_PROP => config.sieve_passes = SievePass::parse_list(value)?,
                DICTIONARIES_PROP => config.dictionaries = Some(PathBuf::from(value.trim())),
                _ => {
                    config.resolver.insert(key.clone(), value.clone());
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Read settings from a TOML document.
    ///
    /// ```
    /// use layered_coref::CorefConfig;
    ///
    /// let config = CorefConfig::from_toml_str("old_coref_format = true").unwrap();
    /// assert!(config.old_coref_format);
    /// assert!(config.allow_reparsing);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_old_format(mut self, enabled: bool) -> Self {
        self.old_coref_format = enabled;
        self
    }

    pub fn with_allow_reparsing(mut self, allowed: bool) -> Self {
        self.allow_reparsing = allowed;
        self
    }

    pub fn with_sieve_passes(mut self, passes: Vec<SievePass>) -> Self {
        self.sieve_passes = passes;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sieve_passes.is_empty() {
            return Err(ConfigError::EmptySievePasses);
        }
        Ok(())
    }

    /// Stable description of every setting that affects resolution.
    ///
    /// Two configs with equal signatures build interchangeable annotators,
    /// so pipelines can use it as a cache key.
    pub fn signature(&self) -> String {
        let passes: Vec<_> = self.sieve_passes.iter().map(|p| p.name()).collect();
        let mut sig = format!(
            "{}:{};{}:{};{}:{};",
            OLD_FORMAT_PROP,
            self.old_coref_format,
            ALLOW_REPARSING_PROP,
            self.allow_reparsing,
            SIEVE_PASSES_PROP,
            passes.join(","),
        );
        if let Some(path) = &self.dictionaries {
            sig.push_str(&format!("{}:{};", DICTIONARIES_PROP, path.display()));
        }
        for (key, value) in &self.resolver {
            sig.push_str(&format!("{}:{};", key, value));
        }
        sig
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = CorefConfig::from_properties(&BTreeMap::new()).unwrap();
        assert!(!config.old_coref_format);
        assert_eq!(config.allow_reparsing, ALLOW_REPARSING);
        assert_eq!(config.sieve_passes, SievePass::DEFAULT.to_vec());
        assert!(config.resolver.is_empty());
    }

    #[test]
    fn test_recognized_properties() {
        let config = CorefConfig::from_properties(&props(&[
            ("oldCorefFormat", "TRUE"),
            ("dcoref.allowReparsing", "false"),
            ("dcoref.sievePasses", "ExactStringMatch, PronounMatch"),
            ("dcoref.dictionaries", "dict.toml"),
        ]))
        .unwrap();
        assert!(config.old_coref_format);
        assert!(!config.allow_reparsing);
        assert_eq!(
            config.sieve_passes,
            vec![SievePass::ExactStringMatch, SievePass::PronounMatch]
        );
        assert_eq!(config.dictionaries, Some(PathBuf::from("dict.toml")));
    }

    #[test]
    fn test_unknown_properties_pass_through() {
        let config = CorefConfig::from_properties(&props(&[
            ("dcoref.score", "true"),
            ("dcoref.maxdist", "-1"),
        ]))
        .unwrap();
        assert_eq!(config.resolver.get("dcoref.maxdist").map(String::as_str), Some("-1"));
        assert_eq!(config.resolver.len(), 2);
    }

    #[test]
    fn test_invalid_boolean() {
        let err = CorefConfig::from_properties(&props(&[("oldCorefFormat", "yes")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoolean { .. }));
    }

    #[test]
    fn test_unknown_sieve() {
        let err =
            CorefConfig::from_properties(&props(&[("dcoref.sievePasses", "MarkRole")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSieve(name) if name == "MarkRole"));
    }

    #[test]
    fn test_empty_sieve_list() {
        let err = CorefConfig::from_properties(&props(&[("dcoref.sievePasses", " ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySievePasses));
    }

    #[test]
    fn test_toml() {
        let config = CorefConfig::from_toml_str(
            r#"
            old_coref_format = true
            sieve_passes = ["StrictHeadMatch", "PronounMatch"]

            [resolver]
            "dcoref.maxdist" = "3"
            "#,
        )
        .unwrap();
        assert!(config.old_coref_format);
        assert_eq!(config.sieve_passes.len(), 2);
        assert_eq!(config.resolver["dcoref.maxdist"], "3");

        assert!(matches!(
            CorefConfig::from_toml_str("sieve_passes = [\"Nope\"]"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_signature_is_stable() {
        let a = CorefConfig::from_properties(&props(&[("b", "2"), ("a", "1")])).unwrap();
        let b = CorefConfig::from_properties(&props(&[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(a.signature(), b.signature());
        assert!(a.signature().starts_with("oldCorefFormat:false;dcoref.allowReparsing:true;"));
        assert!(a.signature().ends_with("a:1;b:2;"));

        let c = a.clone().with_old_format(true);
        assert_ne!(a.signature(), c.signature());
    }
}
