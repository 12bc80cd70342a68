pub mod geofence;
pub mod money;
pub mod polyline;

pub use geofence::GeofenceValidator;
pub use money::{format_duration, format_gbp};
