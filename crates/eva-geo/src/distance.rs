//! Haversine distance and mile/km conversions.
//!
//! All public functions take and return degrees/kilometers/miles as plain
//! `f64`; radian conversion is internal.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

const KM_PER_MILE: f64 = 1.60934;
const MILES_PER_KM: f64 = 0.621371;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points in kilometers.
#[must_use]
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

#[must_use]
pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

/// Round to one decimal place for reporting distances to callers.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
