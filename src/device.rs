//! Device catalogue types and the search filter applied to gateway listings.

use serde::{Deserialize, Serialize};

/// Operating system family reported for a device.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    /// Android handsets and tablets.
    Android,
    /// Apple iOS devices.
    Ios,
    /// Any platform tag this client does not recognise.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Platform {
    /// Returns the wire representation of the platform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Android => "ANDROID",
            Self::Ios => "IOS",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A remote test device as listed by the gateway.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Opaque provider handle identifying the device.
    pub arn: String,
    /// Human readable device name (for example `Apple iPhone 6S`).
    pub name: String,
    /// Platform family of the device.
    #[serde(default)]
    pub platform: Platform,
}

impl Device {
    /// Creates a device record.
    #[must_use]
    pub fn new(arn: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        Self {
            arn: arn.into(),
            name: name.into(),
            platform,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PlatformFilter {
    Any,
    Only(Platform),
}

impl PlatformFilter {
    // Asking for both exclusive filters cancels them out.
    const fn from_flags(android_only: bool, ios_only: bool) -> Self {
        match (android_only, ios_only) {
            (true, false) => Self::Only(Platform::Android),
            (false, true) => Self::Only(Platform::Ios),
            _ => Self::Any,
        }
    }

    fn allows(self, platform: Platform) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == platform,
        }
    }
}

/// Filters a device listing and orders the survivors by display name.
///
/// A device is kept when it satisfies the platform restriction and `query`
/// is empty or occurs in its name, ignoring case. Setting both
/// `android_only` and `ios_only` applies no platform restriction at all.
/// The result is sorted by name with a stable ordinal comparison, so devices
/// sharing a name keep their listing order.
#[must_use]
pub fn filter_devices(
    devices: Vec<Device>,
    query: &str,
    android_only: bool,
    ios_only: bool,
) -> Vec<Device> {
    let platform = PlatformFilter::from_flags(android_only, ios_only);
    let needle = query.to_lowercase();

    let mut matched: Vec<Device> = devices
        .into_iter()
        .filter(|device| platform.allows(device.platform))
        .filter(|device| needle.is_empty() || device.name.to_lowercase().contains(&needle))
        .collect();
    matched.sort_by(|left, right| left.name.cmp(&right.name));
    matched
}
