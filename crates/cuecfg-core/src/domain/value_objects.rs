//! Domain value objects: FeatureId, DependencyKind, selection and merge policies.
//!
//! # Design
//!
//! These are pure value types: equality by value, no identity. Each one owns
//! its string representation and its `FromStr` parser so that every layer
//! (catalog loader, config file, clap) agrees on the spelling.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

// ── FeatureId ────────────────────────────────────────────────────────────────

/// Identifier of a feature, unique within a catalog.
///
/// Identifiers are kebab-case by convention (`vite-react`) but the only hard
/// rule is: non-empty, no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Create an identifier without validation.
    ///
    /// Use [`FeatureId::parse`] for untrusted input.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse and validate an identifier.
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidFeatureId {
                id: id.into(),
                reason: "identifier cannot be empty".into(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidFeatureId {
                id: id.into(),
                reason: "identifier cannot contain whitespace".into(),
            });
        }
        Ok(Self(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower camel case form used to name evaluator source files
    /// (`vite-react` → `viteReact`).
    pub fn to_field_name(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut upper_next = false;
        for ch in self.0.chars() {
            if ch == '-' || ch == '_' {
                upper_next = !out.is_empty();
                continue;
            }
            if upper_next {
                out.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FeatureId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Borrow<str> for FeatureId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FeatureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── DependencyKind ───────────────────────────────────────────────────────────

/// Which dependency table a fragment contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Dev,
    Peer,
}

impl DependencyKind {
    /// Top-level manifest key of the table.
    pub const fn table_key(&self) -> &'static str {
        match self {
            Self::Dev => "devDependencies",
            Self::Peer => "peerDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_key())
    }
}

// ── ConfigSelectionPolicy ────────────────────────────────────────────────────

/// How the compiler configuration is chosen when the descriptor does not name
/// one explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSelectionPolicy {
    /// Scan the catalog's fixed priority list; the last entry present in the
    /// resolved set wins.
    #[default]
    Priority,
    /// Each resolved feature's own selector, in resolution order; later
    /// features override earlier ones.
    LastFeatureWins,
}

impl ConfigSelectionPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::LastFeatureWins => "last-feature-wins",
        }
    }
}

impl fmt::Display for ConfigSelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigSelectionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "priority" | "fixed" => Ok(Self::Priority),
            "last-feature-wins" | "last" | "last-wins" => Ok(Self::LastFeatureWins),
            other => Err(DomainError::InvalidOption(format!(
                "unknown config selection policy: {other}"
            ))),
        }
    }
}

// ── MergeDirection ───────────────────────────────────────────────────────────

/// Which side wins a scalar conflict when a generated manifest is reconciled
/// with the one already on disk.
///
/// Objects always recurse and arrays always concatenate; the direction only
/// decides scalars. The top-level `name` always comes from the generated side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeDirection {
    #[default]
    GeneratedWins,
    ExistingWins,
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneratedWins => f.write_str("generated-wins"),
            Self::ExistingWins => f.write_str("existing-wins"),
        }
    }
}

// ── Backend ──────────────────────────────────────────────────────────────────

/// Where manifest and ignore fragments come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Fold catalog fragments in-process.
    #[default]
    Native,
    /// Delegate fragment production to the CUE evaluator.
    Cue,
}

impl Backend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Cue => "cue",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "builtin" => Ok(Self::Native),
            "cue" => Ok(Self::Cue),
            other => Err(DomainError::InvalidOption(format!("unknown backend: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_id_rejects_empty_and_whitespace() {
        assert!(FeatureId::parse("").is_err());
        assert!(FeatureId::parse("vite react").is_err());
        assert_eq!(FeatureId::parse("vite-react").unwrap().as_str(), "vite-react");
    }

    #[test]
    fn field_name_is_lower_camel_case() {
        assert_eq!(FeatureId::new("vite-react").to_field_name(), "viteReact");
        assert_eq!(FeatureId::new("ts").to_field_name(), "ts");
        assert_eq!(FeatureId::new("a-b_c").to_field_name(), "aBC");
    }

    #[test]
    fn policy_parses_aliases() {
        assert_eq!(
            "priority".parse::<ConfigSelectionPolicy>().unwrap(),
            ConfigSelectionPolicy::Priority
        );
        assert_eq!(
            "LAST".parse::<ConfigSelectionPolicy>().unwrap(),
            ConfigSelectionPolicy::LastFeatureWins
        );
        assert!("random".parse::<ConfigSelectionPolicy>().is_err());
    }

    #[test]
    fn backend_round_trips_display() {
        for backend in [Backend::Native, Backend::Cue] {
            assert_eq!(backend.to_string().parse::<Backend>().unwrap(), backend);
        }
    }

    #[test]
    fn dependency_kind_table_keys() {
        assert_eq!(DependencyKind::Dev.table_key(), "devDependencies");
        assert_eq!(DependencyKind::Peer.table_key(), "peerDependencies");
    }
}
