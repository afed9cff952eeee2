//! HTTP client for the external geocoding provider.
//!
//! Wraps `reqwest` with typed response deserialization and a base-URL
//! override for tests. The provider speaks the Nominatim `/search` shape:
//! a JSON array of places with string `lat`/`lon` fields and a
//! comma-delimited `display_name`.

mod client;
mod error;
mod types;

pub use client::GeocodeClient;
pub use error::GeocodeError;
pub use types::{city_label, GeocodePlace, GeocodeResult};
