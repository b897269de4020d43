use serde::{Deserialize, Serialize};

/// Travel time between two places under current traffic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficEstimate {
    pub travel_time_minutes: f64,
    pub delay_minutes: f64,
}
