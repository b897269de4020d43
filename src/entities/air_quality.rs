use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub aqi: u32,
    pub station: Option<String>,
    pub observed_at: Option<DateTime<FixedOffset>>,
}
