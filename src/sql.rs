//! Textual Postgres rendering of query plans.
//!
//! The only module that turns plans into executable text. Everything
//! caller-supplied arriving here has been validated or normalized upstream;
//! facility and region codes are additionally quoted at the point of
//! embedding. Swapping the target dialect means swapping this file, not the
//! planners.

use std::fmt;

use chrono_tz::Tz;

use crate::normalizers::{quote_literal, quoted_code_list};
use crate::queries::{GapFilledPlan, NetworkYearPlan, QueryShape};

/// An executable query string. Immutable, no unresolved placeholders; the
/// caller owns execution and result interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuery {
    sql: String,
}

impl GeneratedQuery {
    pub(crate) fn new(sql: String) -> Self {
        Self { sql }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl fmt::Display for GeneratedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Observation timestamp converted to network-local wall time.
fn observed_at(table_alias: &str, timezone: &Tz) -> String {
    format!(
        "{table_alias}.trading_interval AT TIME ZONE {tz}",
        tz = quote_literal(timezone.name())
    )
}

/// Renders a gap-filled plan: a `generate_series` bucket CTE left-joined
/// to filtered observations. Observation filters live inside the
/// observations CTE; filtering after the join would collapse it and drop
/// the empty buckets the series exists to keep.
pub fn render_gap_filled(plan: &GapFilledPlan) -> GeneratedQuery {
    let sql = match &plan.shape {
        QueryShape::FacilityPower { facility_codes } => facility_sql(
            plan,
            facility_codes,
            "fs.generated",
            "avg(o.generated)",
            "generated",
        ),
        QueryShape::FacilityEnergy {
            facility_codes,
            scale,
        } => {
            let aggregate = if *scale > 1 {
                format!("sum(o.eoi_quantity) / {scale}")
            } else {
                "sum(o.eoi_quantity)".to_string()
            };
            facility_sql(
                plan,
                facility_codes,
                "fs.eoi_quantity",
                &aggregate,
                "energy_output",
            )
        }
        QueryShape::RegionPrice { region_code } => region_sql(plan, region_code),
    };
    GeneratedQuery::new(sql)
}

fn facility_sql(
    plan: &GapFilledPlan,
    facility_codes: &[String],
    value_column: &str,
    aggregate: &str,
    output_alias: &str,
) -> String {
    let start = plan.series.start_literal();
    let end = plan.series.end_literal();
    let step = plan.series.interval.step_sql();
    let trunc = plan.series.interval.truncation().sql_field();
    let local_ts = observed_at("fs", &plan.timezone);
    let codes = quoted_code_list(facility_codes);
    let network = quote_literal(&plan.network_code);
    format!(
        r#"WITH buckets as (
    SELECT generate_series(
        {start}::timestamp,
        {end}::timestamp,
        '{step}'::interval
    ) as bucket
),
observations as (
    SELECT
        date_trunc('{trunc}', {local_ts}) as bucket,
        fs.facility_code,
        {value_column}
    FROM facility_scada fs
    WHERE fs.facility_code IN ({codes})
      AND fs.network_id = {network}
      AND {local_ts} >= {start}::timestamp
)
SELECT
    b.bucket as trading_day,
    o.facility_code,
    {aggregate} as {output_alias}
FROM buckets b
LEFT JOIN observations o ON o.bucket = b.bucket
GROUP BY 1, 2
ORDER BY 2 ASC, 1 ASC"#
    )
}

fn region_sql(plan: &GapFilledPlan, region_code: &str) -> String {
    let start = plan.series.start_literal();
    let end = plan.series.end_literal();
    let step = plan.series.interval.step_sql();
    let trunc = plan.series.interval.truncation().sql_field();
    let local_ts = observed_at("bs", &plan.timezone);
    let network = quote_literal(&plan.network_code);
    let region = quote_literal(region_code);
    format!(
        r#"WITH buckets as (
    SELECT generate_series(
        {start}::timestamp,
        {end}::timestamp,
        '{step}'::interval
    ) as bucket
),
observations as (
    SELECT
        date_trunc('{trunc}', {local_ts}) as bucket,
        bs.price
    FROM balancing_summary bs
    WHERE bs.network_id = {network}
      AND bs.network_region = {region}
      AND {local_ts} >= {start}::timestamp
)
SELECT
    b.bucket as trading_day,
    avg(o.price) as price
FROM buckets b
LEFT JOIN observations o ON o.bucket = b.bucket
GROUP BY 1
ORDER BY 1 ASC"#
    )
}

/// Renders one calendar year of daily per-fueltech maxima. Not gap-filled:
/// a day with no classified observations has nothing to report.
pub fn render_network_year(plan: &NetworkYearPlan) -> GeneratedQuery {
    let local_ts = observed_at("fs", &plan.timezone);
    let network = quote_literal(&plan.network_code);
    let year = plan.year;
    let sql = format!(
        r#"SELECT
    date_trunc('day', {local_ts}) as trading_day,
    max(fs.eoi_quantity) as energy_output,
    f.fueltech_id as fueltech
FROM facility_scada fs
LEFT JOIN facility f ON fs.facility_code = f.code
WHERE f.fueltech_id IS NOT NULL
  AND fs.network_id = {network}
  AND date_part('year', {local_ts}) = {year}
GROUP BY 1, f.fueltech_id
ORDER BY 1 ASC, f.fueltech_id ASC"#
    );
    GeneratedQuery::new(sql)
}
