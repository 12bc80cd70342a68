use crate::config::{Config, ImportConfig};
use crate::error::AppResult;
use crate::models::{
    ActivitySubtype, Coordinate, NewSession, SegmentTimes, Session, SessionStatus, SourceActivity,
};
use crate::utils::{GeofenceValidator, polyline};

/// Turns fitness-source activities into sessions with their GPS and region flags set.
#[derive(Clone)]
pub struct ImportService {
    geofence: GeofenceValidator,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(geofence: GeofenceValidator, config: ImportConfig) -> Self {
        Self { geofence, config }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GeofenceValidator::new(config.geofence.clone()),
            config.import.clone(),
        )
    }

    /// `Ok(None)` for activities that are not paddling sessions.
    pub fn import(&self, activity: &SourceActivity) -> AppResult<Option<Session>> {
        let Some(subtype) = ActivitySubtype::from_source_type(&activity.sport_type) else {
            log::debug!(
                "Skipping activity {} of type {}",
                activity.id,
                activity.sport_type
            );
            return Ok(None);
        };

        let route = activity
            .summary_polyline
            .as_deref()
            .map(polyline::decode)
            .unwrap_or_default();
        let start_coordinate = to_coordinate(&activity.start_latlng);
        let end_coordinate = to_coordinate(&activity.end_latlng);

        let is_gps_verified = self.is_gps_authentic(activity, route.len());
        let is_in_region = self.is_in_region(start_coordinate, end_coordinate, &route);
        let status = if is_gps_verified && is_in_region {
            SessionStatus::Verified
        } else {
            SessionStatus::Pending
        };

        let session = Session::new(NewSession {
            id: activity.id.to_string(),
            user_id: activity.athlete_id.to_string(),
            activity: subtype,
            start_date: activity.start_date,
            elapsed_time: activity.elapsed_time,
            moving_time: activity.moving_time,
            distance: activity.distance,
            max_speed: activity.max_speed,
            average_speed: activity.average_speed,
            start_coordinate,
            end_coordinate,
            polyline: activity.summary_polyline.clone(),
            is_gps_verified,
            is_in_region,
            flag_count: 0,
            status,
            segment_times: SegmentTimes::default(),
        })?;

        log::info!(
            "Imported activity {} as {} session (gps verified: {}, in region: {})",
            activity.id,
            session.activity,
            is_gps_verified,
            is_in_region
        );
        Ok(Some(session))
    }

    fn is_gps_authentic(&self, activity: &SourceActivity, route_points: usize) -> bool {
        if activity.manual {
            log::debug!("Activity {} was entered manually", activity.id);
            return false;
        }
        if route_points < self.config.min_route_points {
            log::debug!("Activity {} has {route_points} route points", activity.id);
            return false;
        }
        if activity.max_speed > self.config.max_plausible_speed_ms {
            log::warn!(
                "Activity {} max speed {} m/s is not plausible for paddling",
                activity.id,
                activity.max_speed
            );
            return false;
        }
        if activity.average_speed > activity.max_speed {
            log::warn!(
                "Activity {} average speed exceeds max speed",
                activity.id
            );
            return false;
        }
        true
    }

    fn is_in_region(
        &self,
        start: Option<Coordinate>,
        end: Option<Coordinate>,
        route: &[Coordinate],
    ) -> bool {
        let endpoints_ok = [start, end]
            .iter()
            .flatten()
            .all(|c| self.geofence.contains(c));
        endpoints_ok && self.geofence.validate_points(route)
    }
}

fn to_coordinate(latlng: &[f64]) -> Option<Coordinate> {
    match latlng {
        [lat, lng] => Some(Coordinate::new(*lat, *lng)),
        _ => None,
    }
}
