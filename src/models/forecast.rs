/// Number of entries in each forecast series, one per hour of the day
pub const HOURS_PER_DAY: usize = 24;

/// Hourly weather metrics for one calendar day, indexed by hour of day
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub temperature: [f64; HOURS_PER_DAY],
    pub rain: [f64; HOURS_PER_DAY],
    pub pressure: [f64; HOURS_PER_DAY],
    pub uv_index: [f64; HOURS_PER_DAY],
}
