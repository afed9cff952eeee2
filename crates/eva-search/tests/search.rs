//! End-to-end pipeline tests: real Postgres via `#[sqlx::test]`, mocked
//! geocoding provider via wiremock.

use eva_db::{VendorFilters, VendorSort};
use eva_geo::{MatchMode, SearchMode};
use eva_geocode::GeocodeClient;
use eva_search::{execute_search, SearchRequest};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_geocoder(base_url: &str) -> GeocodeClient {
    GeocodeClient::new(base_url, 10, "eva-search/0.1 (test)", "gb")
        .expect("client construction should not fail")
}

fn london_body() -> serde_json::Value {
    serde_json::json!([
        {
            "lat": "51.5074",
            "lon": "-0.1278",
            "display_name": "London, Greater London, England, United Kingdom"
        }
    ])
}

fn request(postcode: Option<&str>, radius_miles: f64, mode: SearchMode) -> SearchRequest {
    SearchRequest {
        postcode: postcode.map(ToOwned::to_owned),
        radius_miles,
        mode,
        filters: VendorFilters::default(),
        sort: VendorSort::Newest,
        page: 1,
        limit: 20,
    }
}

async fn seed_vendor(
    pool: &sqlx::PgPool,
    slug: &str,
    coords: Option<(f64, f64)>,
    service_radius_miles: f64,
) {
    sqlx::query(
        "INSERT INTO vendors \
             (business_name, slug, category, is_published, latitude, longitude, service_radius_miles) \
         VALUES ($1, $2, 'photographer', TRUE, $3, $4, $5)",
    )
    .bind(format!("Vendor {slug}"))
    .bind(slug)
    .bind(coords.map(|c| c.0))
    .bind(coords.map(|c| c.1))
    .bind(service_radius_miles)
    .execute(pool)
    .await
    .expect("seed vendor");
}

#[sqlx::test(migrations = "../../migrations")]
async fn empty_postcode_skips_provider_and_distance_filtering(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(0)
        .mount(&server)
        .await;

    seed_vendor(&pool, "with-coords", Some((52.4862, -1.8904)), 150.0).await;
    seed_vendor(&pool, "no-coords", None, 0.0).await;

    let geocoder = test_geocoder(&server.uri());
    let page = execute_search(&pool, &geocoder, 1000, &request(Some(""), 5.0, SearchMode::Both))
        .await
        .expect("search should succeed");

    assert!(!page.geocoded);
    assert!(page.city.is_none());
    assert_eq!(page.total, 2, "no distance filtering without a center");
    assert!(page
        .vendors
        .iter()
        .all(|v| v.distance_miles.is_none() && v.match_mode.is_none()));
}

#[sqlx::test(migrations = "../../migrations")]
async fn equivalent_postcodes_hit_the_provider_once(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "SW1A 1AA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    seed_vendor(&pool, "croydon", Some((51.3762, -0.0982)), 0.0).await;

    let geocoder = test_geocoder(&server.uri());

    let first = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 20.0, SearchMode::Both),
    )
    .await
    .expect("first search");
    assert!(first.geocoded);
    assert_eq!(first.city.as_deref(), Some("London"));

    // Differently formatted but equivalent: normalizes to the same cache key,
    // so no second provider call (the mock would panic on a second hit).
    let second = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("sw1a1aa"), 20.0, SearchMode::Both),
    )
    .await
    .expect("second search");
    assert!(second.geocoded);
    assert_eq!(second.total, first.total);

    let cached: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM postcode_cache")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(cached, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn dual_radius_modes_behave_per_policy(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .mount(&server)
        .await;

    // Birmingham: ~101 miles from the London center, travels 150 miles.
    seed_vendor(&pool, "birmingham", Some((52.4862, -1.8904)), 150.0).await;

    let geocoder = test_geocoder(&server.uri());

    let mode_a = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 5.0, SearchMode::ModeA),
    )
    .await
    .expect("modeA search");
    assert_eq!(mode_a.total, 0, "101 miles is outside the 5-mile radius");

    let mode_b = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 5.0, SearchMode::ModeB),
    )
    .await
    .expect("modeB search");
    assert_eq!(mode_b.total, 1, "the vendor's coverage reaches London");
    assert_eq!(mode_b.vendors[0].match_mode, Some(MatchMode::ModeB));

    let union = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 5.0, SearchMode::Both),
    )
    .await
    .expect("both search");
    assert_eq!(union.vendors[0].match_mode, Some(MatchMode::ModeB));

    let wide = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 200.0, SearchMode::Both),
    )
    .await
    .expect("wide search");
    assert_eq!(wide.vendors[0].match_mode, Some(MatchMode::Both));
    let miles = wide.vendors[0].distance_miles.expect("annotated");
    assert!((miles - 101.3).abs() < 1.0, "got {miles} mi");
}

#[sqlx::test(migrations = "../../migrations")]
async fn provider_failure_degrades_to_unfiltered_results(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    seed_vendor(&pool, "anywhere", Some((55.9533, -3.1883)), 0.0).await;

    let geocoder = test_geocoder(&server.uri());
    let page = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 5.0, SearchMode::Both),
    )
    .await
    .expect("search must survive a provider outage");

    assert!(!page.geocoded);
    assert_eq!(page.total, 1, "all non-geo matches are returned");
    assert!(page.vendors[0].distance_miles.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn every_search_records_an_analytics_row(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .mount(&server)
        .await;

    // Nine central-London vendors: enough to clear the liquidity threshold.
    for i in 0..9 {
        seed_vendor(&pool, &format!("central-{i}"), Some((51.51, -0.12)), 0.0).await;
    }

    let geocoder = test_geocoder(&server.uri());
    let page = execute_search(
        &pool,
        &geocoder,
        1000,
        &request(Some("SW1A 1AA"), 10.0, SearchMode::Both),
    )
    .await
    .expect("search");
    assert_eq!(page.total, 9);

    let (count, result_count, liquid): (i64, i32, bool) = sqlx::query_as(
        "SELECT COUNT(*) OVER (), result_count, met_liquidity_threshold \
         FROM search_logs LIMIT 1",
    )
    .fetch_one(&pool)
    .await
    .expect("log row");
    assert_eq!(count, 1);
    assert_eq!(result_count, 9);
    assert!(liquid, "9 results clears the >= 8 threshold");

    let logged_postcode: String = sqlx::query_scalar("SELECT postcode FROM search_logs LIMIT 1")
        .fetch_one(&pool)
        .await
        .expect("postcode");
    assert_eq!(logged_postcode, "SW1A1AA", "log stores the normalized key");
}
