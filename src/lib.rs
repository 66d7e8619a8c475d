//! Gap-filled, time-bucketed aggregation query generation for
//! electricity-market telemetry.

pub mod error;
pub mod intervals;
pub mod networks;
pub mod normalizers;
pub mod queries;
pub mod series;
pub mod sql;
pub mod store;

pub use error::QueryError;
pub use intervals::{Interval, Period, TruncUnit};
pub use networks::{NetworkCharacteristics, NetworkRegistry};
pub use queries::{
    facility_energy, facility_power, network_year_energy, region_price, GapFilledPlan,
    NetworkYearPlan, QueryShape,
};
pub use series::BucketSeries;
pub use sql::GeneratedQuery;
