use eva_core::VendorConfig;
use sqlx::PgPool;

use crate::DbError;

/// Upsert vendors from the seed catalog into the database.
///
/// Returns the number of vendors processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_vendors(pool: &PgPool, vendors: &[VendorConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for vendor in vendors {
        let slug = vendor.slug();

        sqlx::query(
            "INSERT INTO vendors \
                 (business_name, slug, category, city, starting_price, rating, culture_tags, \
                  is_verified, is_published, latitude, longitude, service_radius_miles) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (slug) DO UPDATE SET \
                 business_name = EXCLUDED.business_name, \
                 category = EXCLUDED.category, \
                 city = EXCLUDED.city, \
                 starting_price = EXCLUDED.starting_price, \
                 rating = EXCLUDED.rating, \
                 culture_tags = EXCLUDED.culture_tags, \
                 is_verified = EXCLUDED.is_verified, \
                 is_published = EXCLUDED.is_published, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 service_radius_miles = EXCLUDED.service_radius_miles, \
                 updated_at = NOW()",
        )
        .bind(&vendor.business_name)
        .bind(&slug)
        .bind(&vendor.category)
        .bind(&vendor.city)
        .bind(vendor.starting_price)
        .bind(vendor.rating)
        .bind(&vendor.culture_tags)
        .bind(vendor.verified)
        .bind(vendor.published)
        .bind(vendor.latitude)
        .bind(vendor.longitude)
        .bind(vendor.service_radius_miles)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
