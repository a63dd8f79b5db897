//! Extension matching/renaming rules.
//!
//! Raw rules come from configuration in three shapes:
//! - `".mjs"`: only accept `.mjs`, keep it
//! - `[".mjs", ".js"]`: accept `.mjs`, emit `.js`
//! - `[[".mjs", ".js"], ".js"]`: accept either in priority order, emit `.js`

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawExtensionRule {
    Bare(String),
    Pair(Vec<RawRulePart>),
}

/// One element of a `[source, destination]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRulePart {
    One(String),
    Many(Vec<String>),
    Null,
}

/// A normalized rule: any of `sources` (in order) is accepted and emitted as
/// `destination`, or kept verbatim when `destination` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionRule {
    pub sources: Vec<String>,
    pub destination: Option<String>,
}

impl ExtensionRule {
    /// Accept `source` and keep it.
    pub fn keep(source: impl Into<String>) -> Self {
        Self {
            sources: vec![source.into()],
            destination: None,
        }
    }

    /// Accept any of `sources` and emit `destination`.
    pub fn rename<I, S>(sources: I, destination: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            destination: Some(destination.into()),
        }
    }

    /// Extension emitted when `source` matched.
    #[must_use]
    pub fn emitted<'a>(&'a self, source: &'a str) -> &'a str {
        self.destination.as_deref().unwrap_or(source)
    }
}

impl TryFrom<&RawExtensionRule> for ExtensionRule {
    type Error = Error;

    fn try_from(raw: &RawExtensionRule) -> Result<Self, Error> {
        match raw {
            RawExtensionRule::Bare(ext) => Ok(Self::keep(ext.clone())),
            RawExtensionRule::Pair(parts) => {
                let (source, destination) = match parts.as_slice() {
                    [source] => (source, None),
                    [source, destination] => (source, Some(destination)),
                    _ => {
                        return Err(Error::configuration(format!(
                            "extension rule must have 1 or 2 elements, got {}",
                            parts.len()
                        )))
                    }
                };

                let sources = match source {
                    RawRulePart::One(ext) => vec![ext.clone()],
                    RawRulePart::Many(exts) => exts.clone(),
                    RawRulePart::Null => {
                        return Err(Error::configuration(
                            "extension rule source must be a string or a list of strings",
                        ))
                    }
                };

                let destination = match destination {
                    None | Some(RawRulePart::Null) => None,
                    Some(RawRulePart::One(ext)) => Some(ext.clone()),
                    Some(RawRulePart::Many(_)) => {
                        return Err(Error::configuration(
                            "extension rule destination must be a string or null",
                        ))
                    }
                };

                Ok(Self {
                    sources,
                    destination,
                })
            }
        }
    }
}

/// An ordered rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtensionRules(Vec<ExtensionRule>);

impl ExtensionRules {
    #[must_use]
    pub fn new(rules: Vec<ExtensionRule>) -> Self {
        Self(rules)
    }

    /// Normalize raw configuration rules, preserving order.
    pub fn normalize(raw: &[RawExtensionRule]) -> Result<Self, Error> {
        raw.iter()
            .map(ExtensionRule::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Flattened `(source, emitted)` pairs: rule order first, then source
    /// order within each rule.
    pub fn candidates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|rule| {
            rule.sources
                .iter()
                .map(move |source| (source.as_str(), rule.emitted(source)))
        })
    }

    #[must_use]
    pub fn rules(&self) -> &[ExtensionRule] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ExtensionRule>> for ExtensionRules {
    fn from(rules: Vec<ExtensionRule>) -> Self {
        Self(rules)
    }
}
