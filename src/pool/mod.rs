//! Device pools and the rule sets that define their membership.
//!
//! The gateway expresses pool membership as a list of rules. This crate only
//! ever writes one shape of rule (`ARN IN [...]`) and only recognises that
//! shape when comparing an existing pool with a desired device set.

mod rules;

use serde::{Deserialize, Serialize};

pub use rules::{ARN_ATTRIBUTE, IN_OPERATOR, build_rules, pool_matches};

/// A single membership predicate evaluated by the gateway.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Device attribute the rule inspects (for example `ARN`).
    pub attribute: String,
    /// Comparison operator (for example `IN`).
    pub operator: String,
    /// Serialised operand; a JSON array of strings for `IN` rules.
    pub value: String,
}

impl Rule {
    /// Creates a rule from its three components.
    #[must_use]
    pub fn new(
        attribute: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// A named, rule-defined subset of devices.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePool {
    /// Provider handle for the pool.
    pub arn: String,
    /// Display name, unique within a project by convention.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Membership rules. Built with [`build_rules`]; never edited by hand.
    #[serde(default)]
    pub rules: Vec<Rule>,
}
