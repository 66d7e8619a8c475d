//! Execution adapter over the observation store.
//!
//! The generator itself never touches the database; these helpers are the
//! one I/O surface, decoding the column contract each query shape emits.
//! The consumed store interface is three tables:
//!
//! - `facility_scada(trading_interval timestamptz, facility_code text,
//!   network_id text, generated double precision, eoi_quantity double
//!   precision)`
//! - `facility(code text, fueltech_id text)`
//! - `balancing_summary(trading_interval timestamptz, network_id text,
//!   network_region text, price double precision)`

use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::sql::GeneratedQuery;

/// One bucket of averaged facility output. `facility_code` and `generated`
/// are NULL on gap-filled buckets with no observations.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityPowerRow {
    pub trading_day: NaiveDateTime,
    pub facility_code: Option<String>,
    pub generated: Option<f64>,
}

/// One bucket of summed, scale-normalized facility energy.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityEnergyRow {
    pub trading_day: NaiveDateTime,
    pub facility_code: Option<String>,
    pub energy_output: Option<f64>,
}

/// One day's maximum energy quantity for one fuel technology.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FueltechEnergyRow {
    pub trading_day: NaiveDateTime,
    pub energy_output: Option<f64>,
    pub fueltech: String,
}

/// One bucket of averaged regional price.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegionPriceRow {
    pub trading_day: NaiveDateTime,
    pub price: Option<f64>,
}

pub async fn fetch_facility_power(
    pool: &PgPool,
    query: &GeneratedQuery,
) -> Result<Vec<FacilityPowerRow>, sqlx::Error> {
    sqlx::query_as(query.sql()).fetch_all(pool).await
}

pub async fn fetch_facility_energy(
    pool: &PgPool,
    query: &GeneratedQuery,
) -> Result<Vec<FacilityEnergyRow>, sqlx::Error> {
    sqlx::query_as(query.sql()).fetch_all(pool).await
}

pub async fn fetch_network_year_energy(
    pool: &PgPool,
    query: &GeneratedQuery,
) -> Result<Vec<FueltechEnergyRow>, sqlx::Error> {
    sqlx::query_as(query.sql()).fetch_all(pool).await
}

pub async fn fetch_region_price(
    pool: &PgPool,
    query: &GeneratedQuery,
) -> Result<Vec<RegionPriceRow>, sqlx::Error> {
    sqlx::query_as(query.sql()).fetch_all(pool).await
}
