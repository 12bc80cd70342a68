use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity summary as delivered by the fitness-tracking source.
/// Lat/lng pairs arrive as two-element arrays, empty when the device had no fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceActivity {
    pub id: i64,
    pub athlete_id: i64,
    pub sport_type: String,
    pub start_date: DateTime<Utc>,
    pub elapsed_time: u32,
    pub moving_time: u32,
    pub distance: f64,
    #[serde(default)]
    pub max_speed: f64,
    #[serde(default)]
    pub average_speed: f64,
    #[serde(default)]
    pub start_latlng: Vec<f64>,
    #[serde(default)]
    pub end_latlng: Vec<f64>,
    #[serde(default)]
    pub summary_polyline: Option<String>,
    #[serde(default)]
    pub manual: bool,
}
