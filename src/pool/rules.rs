//! Translation between device identifier lists and gateway rule sets.
//!
//! Identifiers are encoded in caller order but compared as sets: the JSON
//! array in a rule value is only a transport for an unordered membership
//! list.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{DevicePool, Rule};

/// Attribute tag naming the device identifier in a rule.
pub const ARN_ATTRIBUTE: &str = "ARN";

/// Operator tag for set membership.
pub const IN_OPERATOR: &str = "IN";

/// Builds the rule set selecting exactly `identifiers`.
///
/// The result always holds a single `ARN IN [...]` rule whose value is the
/// compact JSON array of the identifiers in the order supplied.
///
/// # Examples
///
/// ```
/// use devicefarm::pool::build_rules;
///
/// let rules = build_rules(&["foo", "bar"]);
/// assert_eq!(rules.len(), 1);
/// assert_eq!(rules[0].value, r#"["foo","bar"]"#);
/// ```
#[must_use]
pub fn build_rules<S: AsRef<str>>(identifiers: &[S]) -> Vec<Rule> {
    let encoded = Value::Array(
        identifiers
            .iter()
            .map(|id| Value::String(id.as_ref().to_owned()))
            .collect(),
    );
    vec![Rule::new(ARN_ATTRIBUTE, IN_OPERATOR, encoded.to_string())]
}

/// Returns `true` when one of the pool's rules selects exactly `identifiers`.
///
/// Only `ARN IN [...]` rules are considered; the attribute is compared
/// without regard to ASCII case. Rules with any other attribute or operator
/// are skipped, as are rules whose value does not decode as a JSON array of
/// strings. Duplicate identifiers on either side collapse.
#[must_use]
pub fn pool_matches<S: AsRef<str>>(pool: &DevicePool, identifiers: &[S]) -> bool {
    let wanted: BTreeSet<&str> = identifiers.iter().map(AsRef::as_ref).collect();
    pool.rules
        .iter()
        .filter(|rule| is_membership_rule(rule))
        .filter_map(|rule| decode_identifiers(&rule.value).ok())
        .any(|members| members.iter().map(String::as_str).eq(wanted.iter().copied()))
}

fn is_membership_rule(rule: &Rule) -> bool {
    rule.attribute.eq_ignore_ascii_case(ARN_ATTRIBUTE) && rule.operator == IN_OPERATOR
}

fn decode_identifiers(value: &str) -> Result<BTreeSet<String>, serde_json::Error> {
    serde_json::from_str::<Vec<String>>(value).map(|ids| ids.into_iter().collect())
}
