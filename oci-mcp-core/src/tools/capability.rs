//! Capability-based permission system for tools
//!
//! Tools declare what they do to the tenancy; the server policy decides which
//! of those effects are granted. Nothing is granted by default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Effects a tool may have on the cloud account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// List and get calls
    CloudRead,

    /// Calls that change resource state (instance power actions)
    CloudWrite,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::CloudRead, Capability::CloudWrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CloudRead => "cloud_read",
            Capability::CloudWrite => "cloud_write",
        }
    }

    /// Whether the effect changes the tenancy
    pub fn is_mutating(&self) -> bool {
        matches!(self, Capability::CloudWrite)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_capabilities(iter: impl IntoIterator<Item = Capability>) -> Self {
        iter.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Capabilities in declaration order, for messages
    pub fn sorted(&self) -> Vec<Capability> {
        self.iter().collect()
    }

    /// Members of `self` missing from `other`
    pub fn difference(&self, other: &CapabilitySet) -> CapabilitySet {
        self.0.difference(&other.0).copied().collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The capabilities a server grants to the tools it exposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPolicy {
    granted: CapabilitySet,
}

impl CapabilityPolicy {
    /// Policy for the server's `allow_mutations` setting: every capability,
    /// minus the mutating ones when mutations are off
    pub fn for_mutations(allow_mutations: bool) -> Self {
        Self {
            granted: Capability::ALL
                .into_iter()
                .filter(|cap| allow_mutations || !cap.is_mutating())
                .collect(),
        }
    }

    /// `Err` carries the required capabilities that are not granted
    pub fn check_all(&self, required: &CapabilitySet) -> Result<(), CapabilitySet> {
        let missing = required.difference(&self.granted);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}
