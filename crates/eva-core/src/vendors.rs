use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A vendor entry in the seed catalog (`config/vendors.yaml`).
///
/// Coordinates are optional as a pair: a vendor without a geocoded address is
/// still listed but never participates in distance matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    pub business_name: String,
    pub category: String,
    pub city: Option<String>,
    pub starting_price: Option<Decimal>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub culture_tags: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_published")]
    pub published: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub service_radius_miles: f64,
}

fn default_published() -> bool {
    true
}

impl VendorConfig {
    /// Generate a URL-safe slug from the business name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.business_name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct VendorsFile {
    pub vendors: Vec<VendorConfig>,
}

/// Load and validate the vendor catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vendors(path: &Path) -> Result<VendorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let vendors_file: VendorsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogParse)?;

    validate_vendors(&vendors_file)?;

    Ok(vendors_file)
}

fn validate_vendors(vendors_file: &VendorsFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for vendor in &vendors_file.vendors {
        if vendor.business_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "vendor business_name must be non-empty".to_string(),
            ));
        }

        if vendor.category.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has an empty category",
                vendor.business_name
            )));
        }

        let slug = vendor.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor slug: '{}' (from vendor '{}')",
                slug, vendor.business_name
            )));
        }

        match (vendor.latitude, vendor.longitude) {
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(ConfigError::Validation(format!(
                        "vendor '{}' has out-of-range latitude {lat}",
                        vendor.business_name
                    )));
                }
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(ConfigError::Validation(format!(
                        "vendor '{}' has out-of-range longitude {lng}",
                        vendor.business_name
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "vendor '{}' must set both latitude and longitude or neither",
                    vendor.business_name
                )));
            }
        }

        if vendor.service_radius_miles < 0.0 {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has negative service_radius_miles",
                vendor.business_name
            )));
        }

        if let Some(rating) = vendor.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ConfigError::Validation(format!(
                    "vendor '{}' has rating {rating} outside 0..=5",
                    vendor.business_name
                )));
            }
        }
    }

    Ok(())
}
