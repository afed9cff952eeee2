//! Great-circle distance math and the dual-radius vendor match policy.

mod distance;
mod matching;

pub use distance::{haversine_km, km_to_miles, miles_to_km, round_tenth, Point, EARTH_RADIUS_KM};
pub use matching::{match_vendor, MatchMode, RadiusMatch, SearchMode};
