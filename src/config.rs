//! Settings persistence
//!
//! Stores user preferences in `~/.config/calculate/config.toml`

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculator::{CalcError, SymbolNames, Value, canonicalize};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Keys accepted by [`Settings::set`].
pub const KEYS: &[&str] = &[
    "index_symbol",
    "count_symbol",
    "value_symbol",
    "auto_copy",
    "decimal_separator",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,

    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write config to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown setting '{0}' (expected one of: {keys})", keys = KEYS.join(", "))]
    UnknownKey(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// User settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the zero-based selection index symbol
    pub index_symbol: String,
    /// Name of the selection count symbol
    pub count_symbol: String,
    /// Name of the region value symbol
    pub value_symbol: String,
    /// Copy produced results to the clipboard
    pub auto_copy: bool,
    /// `.` or `,`; the other one is read as a digit-group separator
    pub decimal_separator: char,
}

impl Default for Settings {
    fn default() -> Self {
        let names = SymbolNames::default();
        Self {
            index_symbol: names.index,
            count_symbol: names.count,
            value_symbol: names.value,
            auto_copy: false,
            decimal_separator: '.',
        }
    }
}

impl Settings {
    /// Load settings from the default location, or return defaults.
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = crate::config_paths::config_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Update one setting by name, validating the new value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        let mut updated = self.clone();
        match key {
            "index_symbol" => updated.index_symbol = value.to_string(),
            "count_symbol" => updated.count_symbol = value.to_string(),
            "value_symbol" => updated.value_symbol = value.to_string(),
            "auto_copy" => {
                updated.auto_copy = value
                    .parse()
                    .map_err(|_| invalid("expected true or false"))?;
            }
            "decimal_separator" => {
                let mut chars = value.chars();
                updated.decimal_separator = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(invalid("expected a single character")),
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let symbols = [
            ("index_symbol", &self.index_symbol),
            ("count_symbol", &self.count_symbol),
            ("value_symbol", &self.value_symbol),
        ];
        for (key, name) in symbols {
            if !IDENTIFIER.is_match(name) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: name.clone(),
                    reason: "expected an identifier",
                });
            }
        }
        for (i, (key, name)) in symbols.iter().enumerate() {
            if symbols[..i].iter().any(|(_, other)| other == name) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: name.to_string(),
                    reason: "symbol names must be distinct",
                });
            }
        }
        if !matches!(self.decimal_separator, '.' | ',') {
            return Err(ConfigError::InvalidValue {
                key: "decimal_separator".to_string(),
                value: self.decimal_separator.to_string(),
                reason: "expected '.' or ','",
            });
        }
        Ok(())
    }

    /// Loop-slot names for the evaluator.
    pub fn symbol_names(&self) -> SymbolNames {
        SymbolNames {
            index: self.index_symbol.clone(),
            count: self.count_symbol.clone(),
            value: self.value_symbol.clone(),
        }
    }

    fn group_separator(&self) -> char {
        if self.decimal_separator == ',' { '.' } else { ',' }
    }

    /// Parse region text as a number using the configured separators.
    ///
    /// Surrounding whitespace, underscores and group separators are ignored.
    pub fn parse_number(&self, text: &str) -> Result<f64, CalcError> {
        let trimmed = text.trim();
        if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
            return Err(CalcError::ParseNumber(text.to_string()));
        }
        let group = self.group_separator();
        let cleaned: String = trimmed
            .chars()
            .filter(|&c| c != '_' && c != group)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| CalcError::ParseNumber(text.to_string()))
    }

    /// Exact value of region text that spells an integer: an optional sign
    /// and digits, with underscores and group separators allowed between them.
    pub fn parse_integer(&self, text: &str) -> Option<BigInt> {
        let group = self.group_separator();
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|&c| c != '_' && c != group)
            .collect();
        let digits = cleaned.strip_prefix(['+', '-']).unwrap_or(&cleaned);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        cleaned.parse().ok()
    }

    /// Render an aggregate result with the configured decimal separator.
    ///
    /// Magnitudes past `1e16` are always whole numbers and print as plain
    /// digits rather than in exponent form.
    pub fn format_number(&self, value: f64) -> String {
        let positional = (value.is_finite() && value.abs() >= 1e16)
            .then(|| BigInt::from_f64(value))
            .flatten();
        let rendered = match positional {
            Some(whole) => whole.to_string(),
            None => canonicalize(&Value::Float(value)),
        };
        if self.decimal_separator == '.' {
            rendered
        } else {
            rendered.replace('.', &self.decimal_separator.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.symbol_names(), SymbolNames::default());
        assert!(!settings.auto_copy);
        assert_eq!(settings.decimal_separator, '.');
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str("auto_copy = true").unwrap();
        assert!(settings.auto_copy);
        assert_eq!(settings.index_symbol, "i");
    }

    #[test]
    fn test_parse_number_with_dot() {
        let settings = Settings::default();
        assert_eq!(settings.parse_number(" 1,234.5 ").unwrap(), 1234.5);
        assert_eq!(settings.parse_number("1_000").unwrap(), 1000.0);
        assert_eq!(settings.parse_number("-3").unwrap(), -3.0);
        assert!(settings.parse_number("abc").is_err());
        assert!(settings.parse_number("inf").is_err());
        assert!(settings.parse_number("").is_err());
    }

    #[test]
    fn test_parse_integer_is_exact() {
        let settings = Settings::default();
        let big: BigInt = "10000000000000001".parse().unwrap();
        assert_eq!(settings.parse_integer("10000000000000001"), Some(big));
        assert_eq!(settings.parse_integer(" -1,000 "), Some(BigInt::from(-1000)));
        assert_eq!(settings.parse_integer("+7"), Some(BigInt::from(7)));
        assert_eq!(settings.parse_integer("1.5"), None);
        assert_eq!(settings.parse_integer("1e3"), None);
        assert_eq!(settings.parse_integer("-"), None);
    }

    #[test]
    fn test_parse_number_with_comma() {
        let mut settings = Settings::default();
        settings.set("decimal_separator", ",").unwrap();
        assert_eq!(settings.parse_number("1.234,5").unwrap(), 1234.5);
        assert_eq!(settings.format_number(2.5), "2,5");
        assert_eq!(settings.format_number(3.0), "3");
        assert_eq!(settings.format_number(1e16), "10000000000000000");
        assert_eq!(settings.format_number(-1.5e20), "-150000000000000000000");
        assert_eq!(settings.format_number(1e-5), "1e-05");
    }

    #[test]
    fn test_set_validates() {
        let mut settings = Settings::default();
        settings.set("index_symbol", "idx").unwrap();
        assert_eq!(settings.index_symbol, "idx");

        assert!(matches!(
            settings.set("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(settings.set("auto_copy", "maybe").is_err());
        assert!(settings.set("decimal_separator", ";").is_err());
        assert!(settings.set("value_symbol", "1x").is_err());
        // clashes with count_symbol
        assert!(settings.set("value_symbol", "n").is_err());
        assert_eq!(settings.value_symbol, "x");
    }
}
