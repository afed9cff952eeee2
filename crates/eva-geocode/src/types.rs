use serde::Deserialize;

/// One raw place entry as returned by the provider's `/search` endpoint.
///
/// Coordinates arrive as strings; [`crate::GeocodeClient::lookup_first`]
/// parses them into floats.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodePlace {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// The resolved coordinates for a query, plus a short city label derived
/// from the place's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
}

/// Derive a city label from a display name: the first comma-delimited
/// segment, trimmed. Returns `None` when that segment is empty.
#[must_use]
pub fn city_label(display_name: &str) -> Option<String> {
    let first = display_name.split(',').next().unwrap_or("").trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
