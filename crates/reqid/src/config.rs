//! Configuration types and materialization.
//!
//! [`RawIdConfig`] is the loosely structured input (from a TOML file, env
//! vars, a JSON body, or code). [`materialize`] validates it and applies
//! defaults, producing an immutable [`IdConfig`].

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Length used for the primary identifier when none is configured.
pub const DEFAULT_LENGTH: usize = 21;

/// Longest identifier a configuration may ask for. Every request allocates
/// the configured length per namespace, so larger values are rejected at
/// materialization rather than on the request path.
pub const MAX_LENGTH: usize = 4096;

/// A length as it appears in raw input: a number of any kind, or text still
/// to be parsed. Anything that is not a whole number in range is rejected by
/// [`materialize`], not by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLength {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RawLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLength::Integer(n) => write!(f, "{n}"),
            RawLength::Unsigned(n) => write!(f, "{n}"),
            RawLength::Float(n) => write!(f, "{n}"),
            RawLength::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RawLength {
    fn from(n: i64) -> Self {
        RawLength::Integer(n)
    }
}

impl From<i32> for RawLength {
    fn from(n: i32) -> Self {
        RawLength::Integer(n.into())
    }
}

impl From<&str> for RawLength {
    fn from(s: &str) -> Self {
        RawLength::Text(s.to_string())
    }
}

/// One `(name, length)` entry for an additional identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAdditional {
    pub name: String,
    pub length: RawLength,
}

/// Unvalidated request ID configuration.
///
/// ```toml
/// [request_id]
/// length = 16
///
/// [[request_id.additional]]
/// name = "trace"
/// length = 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIdConfig {
    /// Primary identifier length. Defaults to [`DEFAULT_LENGTH`].
    #[serde(default)]
    pub length: Option<RawLength>,

    /// Additional identifiers, in declaration order.
    #[serde(default)]
    pub additional: Vec<RawAdditional>,
}

impl RawIdConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, length: impl Into<RawLength>) -> Self {
        self.length = Some(length.into());
        self
    }

    pub fn with_additional(mut self, name: impl Into<String>, length: impl Into<RawLength>) -> Self {
        self.additional.push(RawAdditional {
            name: name.into(),
            length: length.into(),
        });
        self
    }
}

/// Validated, immutable request ID configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdConfig {
    length: NonZeroUsize,
    additional: BTreeMap<String, NonZeroUsize>,
}

impl IdConfig {
    /// Length of the primary identifier.
    pub fn length(&self) -> NonZeroUsize {
        self.length
    }

    /// Additional identifier names and their lengths.
    pub fn additional(&self) -> impl Iterator<Item = (&str, NonZeroUsize)> {
        self.additional.iter().map(|(name, len)| (name.as_str(), *len))
    }

    /// Length configured for an additional name, if any.
    pub fn additional_length(&self, name: &str) -> Option<NonZeroUsize> {
        self.additional.get(name).copied()
    }

    /// Number of identifier namespaces (primary plus additional).
    pub fn namespace_count(&self) -> usize {
        1 + self.additional.len()
    }
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            additional: BTreeMap::new(),
        }
    }
}

impl TryFrom<RawIdConfig> for IdConfig {
    type Error = ConfigError;

    fn try_from(raw: RawIdConfig) -> Result<Self, Self::Error> {
        materialize(&raw)
    }
}

fn default_length() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_LENGTH).unwrap_or(NonZeroUsize::MIN)
}

/// Validate raw input and fill in defaults.
///
/// Lengths must be whole numbers in `1..=MAX_LENGTH`.
///
/// Additional entries are checked in the order given, so a duplicate is
/// reported under the name of its second occurrence.
pub fn materialize(raw: &RawIdConfig) -> Result<IdConfig, ConfigError> {
    let length = match &raw.length {
        Some(value) => parse_length("length", value)?,
        None => default_length(),
    };

    let mut additional = BTreeMap::new();
    for entry in &raw.additional {
        let len = parse_length(&format!("additional.{}", entry.name), &entry.length)?;
        if additional.contains_key(&entry.name) {
            return Err(ConfigError::DuplicateKey {
                name: entry.name.clone(),
            });
        }
        additional.insert(entry.name.clone(), len);
    }

    Ok(IdConfig { length, additional })
}

fn parse_length(field: &str, value: &RawLength) -> Result<NonZeroUsize, ConfigError> {
    let parsed = match value {
        RawLength::Integer(n) => usize::try_from(*n).ok(),
        RawLength::Unsigned(n) => usize::try_from(*n).ok(),
        RawLength::Float(_) => None,
        RawLength::Text(s) => s.parse::<usize>().ok(),
    };

    parsed
        .filter(|n| *n <= MAX_LENGTH)
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| ConfigError::InvalidLength {
            field: field.to_string(),
            value: value.to_string(),
        })
}
