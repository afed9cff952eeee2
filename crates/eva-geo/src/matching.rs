//! Dual-radius match policy.
//!
//! A vendor can qualify for a search two ways: it sits within the searcher's
//! requested radius (`modeA`), or the searcher sits within the vendor's own
//! declared coverage radius (`modeB`). `both` is the union of the two.

use serde::{Deserialize, Serialize};

use crate::distance::{haversine_km, miles_to_km, Point};

/// Which matching rule a search runs under. Wire values are the public API
/// tokens accepted by `searchMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Vendor must be within the searcher's requested radius.
    #[serde(rename = "modeA")]
    ModeA,
    /// Searcher must be within the vendor's declared service radius.
    #[serde(rename = "modeB")]
    ModeB,
    /// Union of the two rules.
    #[serde(rename = "both")]
    Both,
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Both
    }
}

impl SearchMode {
    /// Parse a `searchMode` query value. Unrecognized values fall back to the
    /// default (`both`).
    #[must_use]
    pub fn from_param(s: &str) -> Self {
        match s {
            "modeA" => SearchMode::ModeA,
            "modeB" => SearchMode::ModeB,
            _ => SearchMode::Both,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::ModeA => "modeA",
            SearchMode::ModeB => "modeB",
            SearchMode::Both => "both",
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule(s) actually qualified a matched vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    #[serde(rename = "modeA")]
    ModeA,
    #[serde(rename = "modeB")]
    ModeB,
    #[serde(rename = "both")]
    Both,
}

impl MatchMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::ModeA => "modeA",
            MatchMode::ModeB => "modeB",
            MatchMode::Both => "both",
        }
    }
}

/// A successful distance evaluation for one vendor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusMatch {
    pub distance_km: f64,
    pub match_mode: MatchMode,
}

/// Evaluate one vendor against the search center under the given mode.
///
/// Returns `None` when the vendor has no coordinates (it cannot be evaluated)
/// or when it fails the active rule. Distances are exact here; rounding for
/// display happens at the response boundary.
#[must_use]
pub fn match_vendor(
    center: Point,
    vendor: Option<Point>,
    user_radius_miles: f64,
    service_radius_miles: f64,
    mode: SearchMode,
) -> Option<RadiusMatch> {
    let vendor = vendor?;
    let distance_km = haversine_km(center, vendor);

    let within_user = distance_km <= miles_to_km(user_radius_miles);
    let within_coverage = distance_km <= miles_to_km(service_radius_miles);

    let match_mode = match mode {
        SearchMode::ModeA => within_user.then_some(MatchMode::ModeA),
        SearchMode::ModeB => within_coverage.then_some(MatchMode::ModeB),
        SearchMode::Both => match (within_user, within_coverage) {
            (true, true) => Some(MatchMode::Both),
            (true, false) => Some(MatchMode::ModeA),
            (false, true) => Some(MatchMode::ModeB),
            (false, false) => None,
        },
    }?;

    Some(RadiusMatch {
        distance_km,
        match_mode,
    })
}
