//! Aggregation query builders.
//!
//! One operation per output shape: facility power, facility energy,
//! network-year energy, regional price. Each validates its tokens against
//! the closed catalogs and the network registry, plans the bucket series,
//! and only then renders text; a failed resolution never produces a
//! partially-specified query. The `_plan` variants stop before rendering
//! and return the pure query shape for inspection.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

use crate::error::QueryError;
use crate::intervals::{Interval, Period};
use crate::networks::NetworkRegistry;
use crate::normalizers::{normalize_code, normalize_code_set};
use crate::series::BucketSeries;
use crate::sql::{render_gap_filled, render_network_year, GeneratedQuery};

/// Which aggregate a gap-filled query computes, and over what scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryShape {
    /// Average observed output per bucket per facility.
    FacilityPower { facility_codes: Vec<String> },
    /// Summed quantity per bucket per facility, divided by the network's
    /// native sample scale.
    FacilityEnergy { facility_codes: Vec<String>, scale: i64 },
    /// Average price per bucket for a single region.
    RegionPrice { region_code: String },
}

/// A gap-filled aggregation over a planned bucket series. Pure data; the
/// textual backend in [`crate::sql`] turns it into executable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapFilledPlan {
    pub network_code: String,
    pub timezone: Tz,
    pub series: BucketSeries,
    pub shape: QueryShape,
}

/// Daily per-fueltech maxima over one calendar year of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkYearPlan {
    pub network_code: String,
    pub timezone: Tz,
    pub year: i32,
}

struct Resolved {
    network_code: String,
    timezone: Tz,
    sample_scale: i64,
    interval: Interval,
    period: Period,
}

/// Catalog tokens first, then the registry; the first failure aborts the
/// request. A network without a configured zone falls back to UTC here,
/// never inside the registry.
fn resolve_request(
    registry: &NetworkRegistry,
    network_code: &str,
    interval_token: &str,
    period_token: &str,
) -> Result<Resolved, QueryError> {
    let interval = Interval::parse(interval_token)?;
    let period = Period::parse(period_token)?;
    let network = registry.lookup(network_code)?;
    Ok(Resolved {
        network_code: network.code.clone(),
        timezone: network.timezone.unwrap_or(chrono_tz::UTC),
        sample_scale: network.sample_scale,
        interval,
        period,
    })
}

/// An empty selection is a usage error, not a zero-result query.
fn require_facilities(raw: &[String]) -> Result<Vec<String>, QueryError> {
    let codes = normalize_code_set(raw);
    if codes.is_empty() {
        return Err(QueryError::EmptyFacilitySelection);
    }
    Ok(codes)
}

fn rejected(operation: &'static str, network_code: &str, err: QueryError) -> QueryError {
    tracing::warn!(
        operation,
        network = %network_code,
        error = %err,
        "rejected aggregation request"
    );
    err
}

/// Plans the average observed output per bucket per facility.
pub fn facility_power_plan(
    registry: &NetworkRegistry,
    facility_codes: &[String],
    network_code: &str,
    interval_token: &str,
    period_token: &str,
    now: DateTime<Utc>,
) -> Result<GapFilledPlan, QueryError> {
    let resolved = resolve_request(registry, network_code, interval_token, period_token)?;
    let facility_codes = require_facilities(facility_codes)?;
    let series = BucketSeries::plan(resolved.interval, resolved.period, resolved.timezone, now);
    Ok(GapFilledPlan {
        network_code: resolved.network_code,
        timezone: resolved.timezone,
        series,
        shape: QueryShape::FacilityPower { facility_codes },
    })
}

/// Plans the summed energy quantity per bucket per facility, normalized by
/// the network's native sample scale.
pub fn facility_energy_plan(
    registry: &NetworkRegistry,
    facility_codes: &[String],
    network_code: &str,
    interval_token: &str,
    period_token: &str,
    now: DateTime<Utc>,
) -> Result<GapFilledPlan, QueryError> {
    let resolved = resolve_request(registry, network_code, interval_token, period_token)?;
    let facility_codes = require_facilities(facility_codes)?;
    let series = BucketSeries::plan(resolved.interval, resolved.period, resolved.timezone, now);
    Ok(GapFilledPlan {
        network_code: resolved.network_code,
        timezone: resolved.timezone,
        series,
        shape: QueryShape::FacilityEnergy {
            facility_codes,
            scale: resolved.sample_scale,
        },
    })
}

/// Plans the average regional price per bucket.
pub fn region_price_plan(
    registry: &NetworkRegistry,
    network_code: &str,
    region_code: &str,
    interval_token: &str,
    period_token: &str,
    now: DateTime<Utc>,
) -> Result<GapFilledPlan, QueryError> {
    let resolved = resolve_request(registry, network_code, interval_token, period_token)?;
    let region_code = normalize_code(region_code);
    let series = BucketSeries::plan(resolved.interval, resolved.period, resolved.timezone, now);
    Ok(GapFilledPlan {
        network_code: resolved.network_code,
        timezone: resolved.timezone,
        series,
        shape: QueryShape::RegionPrice { region_code },
    })
}

/// Plans one calendar year of daily per-fueltech maxima. `year: None`
/// means the current year in the network's local zone at `now`.
pub fn network_year_energy_plan(
    registry: &NetworkRegistry,
    network_code: &str,
    year: Option<i32>,
    now: DateTime<Utc>,
) -> Result<NetworkYearPlan, QueryError> {
    let network = registry.lookup(network_code)?;
    let timezone = network.timezone.unwrap_or(chrono_tz::UTC);
    let year = year.unwrap_or_else(|| now.with_timezone(&timezone).year());
    Ok(NetworkYearPlan {
        network_code: network.code.clone(),
        timezone,
        year,
    })
}

/// Average observed output per bucket per facility, gap-filled: every
/// bucket in the span appears in the result, observation or not.
pub fn facility_power(
    registry: &NetworkRegistry,
    facility_codes: &[String],
    network_code: &str,
    interval_token: &str,
    period_token: &str,
    now: DateTime<Utc>,
) -> Result<GeneratedQuery, QueryError> {
    facility_power_plan(
        registry,
        facility_codes,
        network_code,
        interval_token,
        period_token,
        now,
    )
    .map(|plan| render_gap_filled(&plan))
    .map_err(|err| rejected("facility_power", network_code, err))
}

/// Summed energy per bucket per facility, scaled to reporting units.
/// Buckets without data stay NULL so they remain distinguishable from
/// zero-energy buckets.
pub fn facility_energy(
    registry: &NetworkRegistry,
    facility_codes: &[String],
    network_code: &str,
    interval_token: &str,
    period_token: &str,
    now: DateTime<Utc>,
) -> Result<GeneratedQuery, QueryError> {
    facility_energy_plan(
        registry,
        facility_codes,
        network_code,
        interval_token,
        period_token,
        now,
    )
    .map(|plan| render_gap_filled(&plan))
    .map_err(|err| rejected("facility_energy", network_code, err))
}

/// Daily maxima per fuel technology across one calendar year, excluding
/// rows whose technology classification is unknown.
pub fn network_year_energy(
    registry: &NetworkRegistry,
    network_code: &str,
    year: Option<i32>,
    now: DateTime<Utc>,
) -> Result<GeneratedQuery, QueryError> {
    network_year_energy_plan(registry, network_code, year, now)
        .map(|plan| render_network_year(&plan))
        .map_err(|err| rejected("network_year_energy", network_code, err))
}

/// Average price per bucket for one region, gap-filled.
pub fn region_price(
    registry: &NetworkRegistry,
    network_code: &str,
    region_code: &str,
    interval_token: &str,
    period_token: &str,
    now: DateTime<Utc>,
) -> Result<GeneratedQuery, QueryError> {
    region_price_plan(
        registry,
        network_code,
        region_code,
        interval_token,
        period_token,
        now,
    )
    .map(|plan| render_gap_filled(&plan))
    .map_err(|err| rejected("region_price", network_code, err))
}
