//! Secrets bundle and placeholder rendering.
//!
//! A [`Secrets`] bundle is loaded per invocation and passed by reference into
//! deploy. Configuration values refer to entries with
//! `${secrets.<id>.<key>}` placeholders, which are substituted when the
//! deployer renders agent and asset configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ModelError, ModelResult};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*secrets\.([A-Za-z0-9_-]+)\.([A-Za-z0-9_.-]+)\s*\}")
        .expect("valid secrets placeholder regex")
});

/// A secret value with automatic memory zeroisation.
///
/// Debug output is always `[REDACTED]`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    #[zeroize(skip)]
    inner: SecretString,
}

impl SecretValue {
    /// Creates a new secret value from a string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::from(value.into()),
        }
    }

    /// Exposes the secret value for use.
    ///
    /// The returned reference must not be logged or stored.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecretValue {
    /// Constant-time comparison.
    fn eq(&self, other: &Self) -> bool {
        let a = self.inner.expose_secret().as_bytes();
        let b = other.inner.expose_secret().as_bytes();
        a.len() == b.len() && bool::from(a.ct_eq(b))
    }
}

impl Eq for SecretValue {}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self::new(s)),
            Value::Number(n) => Ok(Self::new(n.to_string())),
            Value::Bool(b) => Ok(Self::new(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "secret values must be scalars, found {}",
                value_kind(&other)
            ))),
        }
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A named secret holding one or more keyed values.
#[derive(Debug, Clone, Deserialize)]
pub struct Secret {
    /// Identifier used in placeholders.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Keyed values.
    #[serde(default)]
    pub data: BTreeMap<String, SecretValue>,
}

#[derive(Deserialize)]
struct SecretsDocument {
    #[serde(default)]
    secrets: Vec<Secret>,
}

/// The secrets bundle for one deploy or delete invocation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "SecretsDocument")]
pub struct Secrets {
    entries: BTreeMap<String, Secret>,
}

impl TryFrom<SecretsDocument> for Secrets {
    type Error = ModelError;

    fn try_from(doc: SecretsDocument) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for secret in doc.secrets {
            if secret.id.is_empty() {
                return Err(ModelError::InvalidSecret {
                    id: secret.name.clone().unwrap_or_default(),
                    reason: "secret id must not be empty".to_owned(),
                });
            }
            let id = secret.id.clone();
            if entries.insert(id.clone(), secret).is_some() {
                return Err(ModelError::InvalidSecret {
                    id,
                    reason: "declared more than once".to_owned(),
                });
            }
        }
        Ok(Self { entries })
    }
}

impl Secrets {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a secret.
    #[must_use]
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.entries.insert(secret.id.clone(), secret);
        self
    }

    /// Look up a single value.
    #[must_use]
    pub fn get(&self, id: &str, key: &str) -> Option<&SecretValue> {
        self.entries.get(id).and_then(|s| s.data.get(key))
    }

    /// Number of secrets in the bundle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute every placeholder in a JSON value.
    ///
    /// A string consisting of exactly one placeholder is replaced by the
    /// secret; placeholders embedded in longer strings are interpolated.
    /// All unresolved references are reported together.
    pub fn render(&self, value: &Value) -> ModelResult<Value> {
        let mut missing = Vec::new();
        let rendered = self.render_value(value, &mut missing);
        if missing.is_empty() {
            Ok(rendered)
        } else {
            Err(ModelError::missing_secret(missing.join(", ")))
        }
    }

    /// Substitute every placeholder in a configuration map.
    pub fn render_map(&self, map: &Map<String, Value>) -> ModelResult<Map<String, Value>> {
        let mut missing = Vec::new();
        let rendered = map
            .iter()
            .map(|(k, v)| (k.clone(), self.render_value(v, &mut missing)))
            .collect();
        if missing.is_empty() {
            Ok(rendered)
        } else {
            Err(ModelError::missing_secret(missing.join(", ")))
        }
    }

    fn render_value(&self, value: &Value, missing: &mut Vec<String>) -> Value {
        match value {
            Value::String(s) => Value::String(self.render_str(s, missing)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.render_value(item, missing))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.render_value(v, missing)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn render_str(&self, input: &str, missing: &mut Vec<String>) -> String {
        if !input.contains("${") {
            return input.to_owned();
        }
        PLACEHOLDER
            .replace_all(input, |caps: &Captures<'_>| {
                let (id, key) = (&caps[1], &caps[2]);
                match self.get(id, key) {
                    Some(value) => value.expose().to_owned(),
                    None => {
                        missing.push(format!("secrets.{id}.{key}"));
                        caps[0].to_owned()
                    }
                }
            })
            .into_owned()
    }
}
