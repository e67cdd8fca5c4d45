//! Immutable configuration view

use crate::constants::KEY_DELIMITER;
use driveline_errors::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Fold a key for case-insensitive lookup
pub(crate) fn fold_key(key: &str) -> String {
    key.chars().flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
}

/// Immutable snapshot of resolved key/value pairs.
///
/// Cloning is cheap. Keys are matched case-insensitively; the spelling of
/// the last write is the one reported by [`Configuration::iter`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: Arc<BTreeMap<String, Entry>>,
}

impl Configuration {
    /// An empty configuration
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a configuration directly from pairs, last write wins
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            insert(&mut entries, key.into(), value.into());
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    pub(crate) fn from_entries(entries: Vec<(String, String)>) -> Self {
        Self::from_pairs(entries)
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&fold_key(key))
            .map(|entry| entry.value.as_str())
    }

    /// Whether a key is present (an empty value still counts)
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&fold_key(key))
    }

    /// Parse a value with [`FromStr`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the key is present but the
    /// value does not parse.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// Read a boolean (`true`/`false`, any case), falling back to `default`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for anything else.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key).map(str::trim) {
            None => Ok(default),
            Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(true),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(false),
            Some(raw) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Sub-tree rooted at `path`; always succeeds, even for missing paths
    #[must_use]
    pub fn section(&self, path: &str) -> ConfigurationSection {
        ConfigurationSection {
            root: self.clone(),
            path: path.to_string(),
        }
    }

    /// Top-level sections
    #[must_use]
    pub fn children(&self) -> Vec<ConfigurationSection> {
        self.children_of(None)
    }

    /// Iterate over `(key, value)` pairs in case-insensitive key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn children_of(&self, parent: Option<&str>) -> Vec<ConfigurationSection> {
        let prefix = parent.map(|p| format!("{}{KEY_DELIMITER}", fold_key(p)));
        let mut seen: BTreeMap<String, String> = BTreeMap::new();

        for (folded, entry) in self.entries.iter() {
            let rest_start = match &prefix {
                Some(prefix) if folded.starts_with(prefix.as_str()) => prefix.len(),
                Some(_) => continue,
                None => 0,
            };
            // Folding can change byte lengths, so cut the original key by segment count.
            let depth = parent.map_or(0, |p| p.split(KEY_DELIMITER).count());
            let Some(segment) = entry.key.split(KEY_DELIMITER).nth(depth) else {
                continue;
            };
            let folded_segment = folded[rest_start..]
                .split(KEY_DELIMITER)
                .next()
                .unwrap_or_default()
                .to_string();
            seen.entry(folded_segment)
                .or_insert_with(|| segment.to_string());
        }

        seen.into_values()
            .map(|segment| {
                let path = match parent {
                    Some(p) => format!("{p}{KEY_DELIMITER}{segment}"),
                    None => segment,
                };
                self.section(&path)
            })
            .collect()
    }
}

fn insert(entries: &mut BTreeMap<String, Entry>, key: String, value: String) {
    entries.insert(fold_key(&key), Entry { key, value });
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A named sub-tree of a [`Configuration`]
#[derive(Debug, Clone)]
pub struct ConfigurationSection {
    root: Configuration,
    path: String,
}

impl ConfigurationSection {
    /// Full path of this section from the root
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path
    #[must_use]
    pub fn key(&self) -> &str {
        self.path
            .rsplit(KEY_DELIMITER)
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Value stored at exactly this path
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.root.get(&self.path)
    }

    /// Value stored under a relative key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.root.get(&self.join(key))
    }

    /// Parse a value under a relative key
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the value does not parse.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.root.get_parsed(&self.join(key))
    }

    /// Read a boolean under a relative key
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for anything but `true`/`false`.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.root.get_bool(&self.join(key), default)
    }

    /// Nested section
    #[must_use]
    pub fn section(&self, key: &str) -> ConfigurationSection {
        self.root.section(&self.join(key))
    }

    /// Immediate child sections
    #[must_use]
    pub fn children(&self) -> Vec<ConfigurationSection> {
        self.root.children_of(Some(&self.path))
    }

    /// Whether this section has a value or any descendants
    #[must_use]
    pub fn exists(&self) -> bool {
        self.value().is_some() || !self.children().is_empty()
    }

    fn join(&self, key: &str) -> String {
        format!("{}{KEY_DELIMITER}{key}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Configuration {
        Configuration::from_pairs([
            ("Logging:LogLevel:Default", "info"),
            ("Logging:LogLevel:driveline", "debug"),
            ("Logging:Format", "json"),
            ("environment", "Staging"),
        ])
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let config = sample();
        assert_eq!(config.get("ENVIRONMENT"), Some("Staging"));
        assert_eq!(config.get("logging:loglevel:default"), Some("info"));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_last_write_wins_across_case() {
        let config = Configuration::from_pairs([("Key", "one"), ("KEY", "two")]);
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("key"), Some("two"));
        assert_eq!(config.iter().next(), Some(("KEY", "two")));
    }

    #[test]
    fn test_sections_and_children() {
        let config = sample();
        let logging = config.section("logging");
        assert!(logging.exists());
        assert_eq!(logging.get("format"), Some("json"));

        let level = logging.section("LogLevel");
        let children: Vec<String> = level.children().iter().map(|c| c.key().to_string()).collect();
        assert_eq!(children, vec!["Default".to_string(), "driveline".to_string()]);

        let top: Vec<String> = config.children().iter().map(|c| c.path().to_string()).collect();
        assert_eq!(top, vec!["environment".to_string(), "Logging".to_string()]);
        assert!(!config.section("nope").exists());
    }

    #[test]
    fn test_typed_reads() {
        let config = Configuration::from_pairs([("port", " 8080 "), ("flag", "True"), ("bad", "x")]);
        assert_eq!(config.get_parsed::<u16>("port").unwrap(), Some(8080));
        assert_eq!(config.get_parsed::<u16>("absent").unwrap(), None);
        assert!(config.get_parsed::<u16>("bad").is_err());
        assert!(config.get_bool("flag", false).unwrap());
        assert!(config.get_bool("absent", true).unwrap());
        assert!(config.get_bool("bad", true).is_err());
    }
}
