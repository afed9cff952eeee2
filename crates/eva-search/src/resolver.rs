//! Postcode-to-coordinates resolution backed by the persisted cache.
//!
//! Lookup order: cache by normalized key, then the external provider with
//! the original string, then a best-effort write-through. Provider failures
//! degrade to unresolved coordinates; only database read failures propagate.

use eva_db::DbError;
use eva_geo::Point;
use eva_geocode::GeocodeClient;
use sqlx::PgPool;

/// Cache key normalization: uppercase, strip all whitespace.
#[must_use]
pub fn normalize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// The outcome of resolving a postcode. All-`None` means the input was empty
/// or the provider had nothing; the search then runs without distance
/// filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
}

impl ResolvedLocation {
    /// The search center as a point, when both coordinates resolved.
    #[must_use]
    pub fn point(&self) -> Option<Point> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Point::new(lat, lng)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_geocoded(&self) -> bool {
        self.point().is_some()
    }
}

/// Resolve a raw postcode/address string to coordinates.
///
/// Empty input short-circuits to unresolved without touching the cache or
/// the provider. On a cache miss the provider is called with the original
/// (non-normalized) string; a successful result is written through to the
/// cache best-effort — a lost duplicate-insert race or any other write
/// failure is logged and ignored, and the resolved coordinates are still
/// returned.
///
/// # Errors
///
/// Returns [`DbError`] only for cache read failures. Provider errors never
/// propagate; they resolve to unresolved coordinates.
pub async fn resolve_postcode(
    pool: &PgPool,
    geocoder: &GeocodeClient,
    raw: &str,
) -> Result<ResolvedLocation, DbError> {
    if raw.trim().is_empty() {
        return Ok(ResolvedLocation::default());
    }

    let key = normalize_postcode(raw);

    if let Some(row) = eva_db::get_postcode(pool, &key).await? {
        return Ok(ResolvedLocation {
            latitude: Some(row.latitude),
            longitude: Some(row.longitude),
            city: row.city,
        });
    }

    let result = match geocoder.lookup_first(raw).await {
        Ok(Some(result)) => result,
        Ok(None) => return Ok(ResolvedLocation::default()),
        Err(e) => {
            tracing::warn!(postcode = %key, error = %e, "geocoding lookup failed; search proceeds without coordinates");
            return Ok(ResolvedLocation::default());
        }
    };

    if let Err(e) = eva_db::insert_postcode(
        pool,
        &key,
        result.latitude,
        result.longitude,
        result.city.as_deref(),
    )
    .await
    {
        tracing::warn!(postcode = %key, error = %e, "postcode cache write failed; resolved coordinates still used");
    }

    Ok(ResolvedLocation {
        latitude: Some(result.latitude),
        longitude: Some(result.longitude),
        city: result.city,
    })
}
