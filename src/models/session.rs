use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySubtype {
    Canoe,
    Kayak,
    Row,
    StandUpPaddle,
}

impl ActivitySubtype {
    /// Maps the fitness source's sport type onto a paddling subtype.
    /// Returns `None` for anything that is not a paddling activity.
    pub fn from_source_type(sport_type: &str) -> Option<Self> {
        match sport_type.to_ascii_lowercase().as_str() {
            "canoeing" | "canoe" => Some(ActivitySubtype::Canoe),
            "kayaking" | "kayak" => Some(ActivitySubtype::Kayak),
            "rowing" | "row" => Some(ActivitySubtype::Row),
            "standuppaddling" | "standuppaddle" => Some(ActivitySubtype::StandUpPaddle),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivitySubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivitySubtype::Canoe => write!(f, "canoe"),
            ActivitySubtype::Kayak => write!(f, "kayak"),
            ActivitySubtype::Row => write!(f, "row"),
            ActivitySubtype::StandUpPaddle => write!(f, "stand_up_paddle"),
        }
    }
}

/// Moderation lifecycle: pending -> verified | flagged -> under_review -> disqualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Verified,
    Flagged,
    UnderReview,
    Disqualified,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Verified => write!(f, "verified"),
            SessionStatus::Flagged => write!(f, "flagged"),
            SessionStatus::UnderReview => write!(f, "under_review"),
            SessionStatus::Disqualified => write!(f, "disqualified"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Best known elapsed times (seconds) over fixed sub-distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentTimes {
    pub one_km: Option<f64>,
    pub five_km: Option<f64>,
    pub ten_km: Option<f64>,
}

impl SegmentTimes {
    fn validate_against(&self, distance: f64) -> AppResult<()> {
        let slots = [
            (self.one_km, 1_000.0, "1km"),
            (self.five_km, 5_000.0, "5km"),
            (self.ten_km, 10_000.0, "10km"),
        ];
        for (time, covered, label) in slots {
            let Some(seconds) = time else { continue };
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(AppError::ValidationError(format!(
                    "{label} time must be a positive number of seconds"
                )));
            }
            if distance < covered {
                return Err(AppError::ValidationError(format!(
                    "{label} time present but session only covers {distance}m"
                )));
            }
        }
        Ok(())
    }
}

/// Fields handed over by the import collaborator. Turned into a [`Session`] by [`Session::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub id: String,
    pub user_id: String,
    pub activity: ActivitySubtype,
    pub start_date: DateTime<Utc>,
    /// seconds
    pub elapsed_time: u32,
    /// seconds
    pub moving_time: u32,
    /// meters
    pub distance: f64,
    /// m/s
    pub max_speed: f64,
    /// m/s
    pub average_speed: f64,
    #[serde(default)]
    pub start_coordinate: Option<Coordinate>,
    #[serde(default)]
    pub end_coordinate: Option<Coordinate>,
    #[serde(default)]
    pub polyline: Option<String>,
    #[serde(default)]
    pub is_gps_verified: bool,
    #[serde(default)]
    pub is_in_region: bool,
    #[serde(default)]
    pub flag_count: u32,
    #[serde(default = "default_status")]
    pub status: SessionStatus,
    #[serde(default)]
    pub segment_times: SegmentTimes,
}

fn default_status() -> SessionStatus {
    SessionStatus::Pending
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NewSession")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub activity: ActivitySubtype,
    pub start_date: DateTime<Utc>,
    pub elapsed_time: u32,
    pub moving_time: u32,
    pub distance: f64,
    pub max_speed: f64,
    pub average_speed: f64,
    pub start_coordinate: Option<Coordinate>,
    pub end_coordinate: Option<Coordinate>,
    pub polyline: Option<String>,
    pub is_gps_verified: bool,
    pub is_in_region: bool,
    pub flag_count: u32,
    pub status: SessionStatus,
    pub segment_times: SegmentTimes,
}

impl TryFrom<NewSession> for Session {
    type Error = AppError;

    fn try_from(new: NewSession) -> AppResult<Self> {
        Self::new(new)
    }
}

impl Session {
    pub fn new(new: NewSession) -> AppResult<Self> {
        if new.id.trim().is_empty() || new.user_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Session id and user id are required".into(),
            ));
        }
        if !new.distance.is_finite() || new.distance < 0.0 {
            return Err(AppError::ValidationError(format!(
                "Session {} has invalid distance {}",
                new.id, new.distance
            )));
        }
        if new.moving_time > new.elapsed_time {
            return Err(AppError::ValidationError(format!(
                "Session {} moving time {}s exceeds elapsed time {}s",
                new.id, new.moving_time, new.elapsed_time
            )));
        }
        for speed in [new.max_speed, new.average_speed] {
            if !speed.is_finite() || speed < 0.0 {
                return Err(AppError::ValidationError(format!(
                    "Session {} has invalid speed {speed}",
                    new.id
                )));
            }
        }
        new.segment_times.validate_against(new.distance)?;

        Ok(Self {
            id: new.id,
            user_id: new.user_id,
            activity: new.activity,
            start_date: new.start_date,
            elapsed_time: new.elapsed_time,
            moving_time: new.moving_time,
            distance: new.distance,
            max_speed: new.max_speed,
            average_speed: new.average_speed,
            start_coordinate: new.start_coordinate,
            end_coordinate: new.end_coordinate,
            polyline: new.polyline,
            is_gps_verified: new.is_gps_verified,
            is_in_region: new.is_in_region,
            flag_count: new.flag_count,
            status: new.status,
            segment_times: new.segment_times,
        })
    }

    pub fn distance_km(&self) -> f64 {
        self.distance / 1_000.0
    }

    /// GPS-verified, inside the region and verified by moderation.
    pub fn is_race_ready(&self) -> bool {
        self.is_gps_verified && self.is_in_region && self.status == SessionStatus::Verified
    }

    fn ensure_mutable(&self) -> AppResult<()> {
        if self.status == SessionStatus::Disqualified {
            return Err(AppError::InvalidState(format!(
                "Session {} is disqualified",
                self.id
            )));
        }
        Ok(())
    }

    pub fn verify(&mut self) -> AppResult<()> {
        self.ensure_mutable()?;
        if self.status != SessionStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Cannot verify session {} from {}",
                self.id, self.status
            )));
        }
        self.status = SessionStatus::Verified;
        Ok(())
    }

    /// Records a moderation flag. Once `review_threshold` flags accumulate the
    /// session goes to review.
    pub fn flag(&mut self, review_threshold: u32) -> AppResult<()> {
        self.ensure_mutable()?;
        self.flag_count += 1;
        self.status = match self.status {
            SessionStatus::Pending | SessionStatus::Verified | SessionStatus::Flagged
                if self.flag_count >= review_threshold =>
            {
                SessionStatus::UnderReview
            }
            SessionStatus::Pending | SessionStatus::Verified => SessionStatus::Flagged,
            other => other,
        };
        log::debug!(
            "Session {} flagged ({} flags), now {}",
            self.id,
            self.flag_count,
            self.status
        );
        Ok(())
    }

    /// Moderator cleared the session: back to verified with no flags.
    pub fn clear(&mut self) -> AppResult<()> {
        self.ensure_mutable()?;
        match self.status {
            SessionStatus::Flagged | SessionStatus::UnderReview => {
                self.status = SessionStatus::Verified;
                self.flag_count = 0;
                Ok(())
            }
            other => Err(AppError::InvalidState(format!(
                "Cannot clear session {} from {other}",
                self.id
            ))),
        }
    }

    pub fn disqualify(&mut self) -> AppResult<()> {
        self.ensure_mutable()?;
        if self.status != SessionStatus::UnderReview {
            return Err(AppError::InvalidState(format!(
                "Session {} must be under review before disqualification",
                self.id
            )));
        }
        self.status = SessionStatus::Disqualified;
        log::info!("Session {} disqualified", self.id);
        Ok(())
    }

    pub fn backfill_segment_times(&mut self, times: SegmentTimes) -> AppResult<()> {
        self.ensure_mutable()?;
        times.validate_against(self.distance)?;
        self.segment_times = times;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_sessions::*;
    use super::*;

    #[test]
    fn test_from_source_type() {
        assert_eq!(
            ActivitySubtype::from_source_type("Kayaking"),
            Some(ActivitySubtype::Kayak)
        );
        assert_eq!(
            ActivitySubtype::from_source_type("StandUpPaddling"),
            Some(ActivitySubtype::StandUpPaddle)
        );
        assert_eq!(ActivitySubtype::from_source_type("Run"), None);
    }

    #[test]
    fn test_moving_time_cannot_exceed_elapsed() {
        let mut new = new_session("s1", 2_000.0);
        new.moving_time = new.elapsed_time + 1;
        assert!(matches!(
            Session::new(new),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let mut value = serde_json::to_value(new_session("s1", 1_500.0)).unwrap();
        let parsed: Session = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed.distance, 1_500.0);

        value["moving_time"] = serde_json::json!(99_999);
        assert!(serde_json::from_value::<Session>(value).is_err());
    }

    #[test]
    fn test_negative_distance_rejected() {
        assert!(Session::new(new_session("s1", -1.0)).is_err());
    }

    #[test]
    fn test_segment_time_requires_coverage() {
        let mut new = new_session("s1", 4_000.0);
        new.segment_times.five_km = Some(1_200.0);
        assert!(Session::new(new).is_err());

        let mut new = new_session("s2", 5_000.0);
        new.segment_times.five_km = Some(1_200.0);
        assert!(Session::new(new).is_ok());
    }

    #[test]
    fn test_flag_lifecycle() {
        let mut s = session("s1", 2_000.0);
        s.flag(3).unwrap();
        assert_eq!(s.status, SessionStatus::Flagged);
        s.flag(3).unwrap();
        assert_eq!(s.status, SessionStatus::Flagged);
        s.flag(3).unwrap();
        assert_eq!(s.status, SessionStatus::UnderReview);
        assert_eq!(s.flag_count, 3);

        s.disqualify().unwrap();
        assert_eq!(s.status, SessionStatus::Disqualified);
        assert!(s.flag(3).is_err());
        assert!(s.clear().is_err());
        assert!(s.backfill_segment_times(SegmentTimes::default()).is_err());
    }

    #[test]
    fn test_clear_resets_flags() {
        let mut s = session("s1", 2_000.0);
        s.flag(1).unwrap();
        assert_eq!(s.status, SessionStatus::UnderReview);
        s.clear().unwrap();
        assert_eq!(s.status, SessionStatus::Verified);
        assert_eq!(s.flag_count, 0);
    }

    #[test]
    fn test_verify_only_from_pending() {
        let mut new = new_session("s1", 2_000.0);
        new.status = SessionStatus::Pending;
        let mut s = Session::new(new).unwrap();
        s.verify().unwrap();
        assert_eq!(s.status, SessionStatus::Verified);
        assert!(s.verify().is_err());
    }

    #[test]
    fn test_disqualify_requires_review() {
        let mut s = session("s1", 2_000.0);
        assert!(matches!(s.disqualify(), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_backfill_segment_times() {
        let mut s = session("s1", 10_500.0);
        s.backfill_segment_times(SegmentTimes {
            one_km: Some(240.0),
            five_km: Some(1_290.5),
            ten_km: Some(2_650.0),
        })
        .unwrap();
        assert_eq!(s.segment_times.five_km, Some(1_290.5));
        assert!(
            s.backfill_segment_times(SegmentTimes {
                one_km: Some(0.0),
                ..Default::default()
            })
            .is_err()
        );
    }
}
