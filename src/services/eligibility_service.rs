use serde::Serialize;

use crate::config::EligibilityConfig;
use crate::models::{ActivitySubtype, Race, RaceType, Session, SessionStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IneligibleReason {
    OutsideRaceWindow,
    GpsNotVerified,
    OutsideRegion,
    ActivityNotAllowed { activity: ActivitySubtype },
    NotVerified { status: SessionStatus },
    BelowMinimumDistance { required_m: f64, actual_m: f64 },
}

impl std::fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IneligibleReason::OutsideRaceWindow => {
                write!(f, "Session was not recorded during the race window")
            }
            IneligibleReason::GpsNotVerified => write!(f, "GPS data could not be verified"),
            IneligibleReason::OutsideRegion => write!(f, "Session was recorded outside the UK"),
            IneligibleReason::ActivityNotAllowed { activity } => {
                write!(f, "Activity type {activity} is not eligible for races")
            }
            IneligibleReason::NotVerified { status } => {
                write!(f, "Session is {status}, only verified sessions can race")
            }
            IneligibleReason::BelowMinimumDistance {
                required_m,
                actual_m,
            } => write!(
                f,
                "Session covers {actual_m}m, this race needs at least {required_m}m"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Ineligible { reason: IneligibleReason },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

#[derive(Clone)]
pub struct EligibilityService {
    config: EligibilityConfig,
}

impl EligibilityService {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    /// Minimum session distance in meters for a race type, if any.
    pub fn minimum_distance_m(&self, race_type: RaceType) -> Option<f64> {
        match race_type {
            RaceType::Fastest1Km => Some(self.config.fastest_1km_min_m),
            RaceType::Fastest5Km => Some(self.config.fastest_5km_min_m),
            RaceType::Fastest10Km => Some(self.config.fastest_10km_min_m),
            RaceType::TopSpeed | RaceType::FurthestDistance => None,
        }
    }

    /// Ordered checks; the first failing rule is the reported reason.
    pub fn classify(&self, session: &Session, race: &Race) -> Eligibility {
        match self.first_violation(session, race) {
            None => Eligibility::Eligible,
            Some(reason) => {
                log::debug!(
                    "Session {} ineligible for race {}: {reason}",
                    session.id,
                    race.id
                );
                Eligibility::Ineligible { reason }
            }
        }
    }

    fn first_violation(&self, session: &Session, race: &Race) -> Option<IneligibleReason> {
        if !race.covers(session.start_date) {
            return Some(IneligibleReason::OutsideRaceWindow);
        }
        if !session.is_gps_verified {
            return Some(IneligibleReason::GpsNotVerified);
        }
        if !session.is_in_region {
            return Some(IneligibleReason::OutsideRegion);
        }
        if !self.config.allowed_activities.contains(&session.activity) {
            return Some(IneligibleReason::ActivityNotAllowed {
                activity: session.activity,
            });
        }
        if session.status != SessionStatus::Verified {
            return Some(IneligibleReason::NotVerified {
                status: session.status,
            });
        }
        // Raw meters, not a derived km quotient.
        if let Some(required_m) = self.minimum_distance_m(race.race_type)
            && session.distance < required_m
        {
            return Some(IneligibleReason::BelowMinimumDistance {
                required_m,
                actual_m: session.distance,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::race::test_races::race;
    use crate::models::session::test_sessions::session;
    use chrono::Duration;

    fn service() -> EligibilityService {
        EligibilityService::new(EligibilityConfig::default())
    }

    #[test]
    fn test_eligible_session() {
        let s = session("s1", 2_000.0);
        assert_eq!(
            service().classify(&s, &race(RaceType::TopSpeed)),
            Eligibility::Eligible
        );
    }

    #[test]
    fn test_window_is_inclusive() {
        let r = race(RaceType::TopSpeed);
        let mut s = session("s1", 2_000.0);
        s.start_date = r.start_date;
        assert!(service().classify(&s, &r).is_eligible());
        s.start_date = r.end_date;
        assert!(service().classify(&s, &r).is_eligible());
        s.start_date = r.end_date + Duration::seconds(1);
        assert!(!service().classify(&s, &r).is_eligible());
    }

    #[test]
    fn test_window_violation_reported_before_gps() {
        let r = race(RaceType::TopSpeed);
        let mut s = session("s1", 2_000.0);
        s.start_date = r.start_date - Duration::days(1);
        s.is_gps_verified = false;
        assert_eq!(
            service().classify(&s, &r),
            Eligibility::Ineligible {
                reason: IneligibleReason::OutsideRaceWindow
            }
        );
    }

    #[test]
    fn test_check_order() {
        let r = race(RaceType::Fastest5Km);
        let mut s = session("s1", 100.0);
        s.is_in_region = false;
        s.activity = ActivitySubtype::Row;
        assert_eq!(
            service().classify(&s, &r),
            Eligibility::Ineligible {
                reason: IneligibleReason::OutsideRegion
            }
        );

        s.is_in_region = true;
        assert_eq!(
            service().classify(&s, &r),
            Eligibility::Ineligible {
                reason: IneligibleReason::ActivityNotAllowed {
                    activity: ActivitySubtype::Row
                }
            }
        );

        s.activity = ActivitySubtype::Canoe;
        s.status = SessionStatus::Flagged;
        assert_eq!(
            service().classify(&s, &r),
            Eligibility::Ineligible {
                reason: IneligibleReason::NotVerified {
                    status: SessionStatus::Flagged
                }
            }
        );

        s.status = SessionStatus::Verified;
        assert!(matches!(
            service().classify(&s, &r),
            Eligibility::Ineligible {
                reason: IneligibleReason::BelowMinimumDistance { .. }
            }
        ));
    }

    #[test]
    fn test_stand_up_paddle_excluded() {
        let mut s = session("s1", 2_000.0);
        s.activity = ActivitySubtype::StandUpPaddle;
        assert!(!service().classify(&s, &race(RaceType::TopSpeed)).is_eligible());
    }

    #[test]
    fn test_minimum_distance_boundary() {
        let r = race(RaceType::Fastest1Km);
        assert!(!service().classify(&session("s1", 999.9), &r).is_eligible());
        assert!(service().classify(&session("s2", 1_000.0), &r).is_eligible());
    }

    #[test]
    fn test_no_minimum_for_distance_and_speed_races() {
        let s = session("s1", 10.0);
        assert!(service().classify(&s, &race(RaceType::TopSpeed)).is_eligible());
        assert!(
            service()
                .classify(&s, &race(RaceType::FurthestDistance))
                .is_eligible()
        );
    }

    #[test]
    fn test_reason_is_human_readable() {
        let reason = IneligibleReason::BelowMinimumDistance {
            required_m: 5_000.0,
            actual_m: 4_200.0,
        };
        assert_eq!(
            reason.to_string(),
            "Session covers 4200m, this race needs at least 5000m"
        );
    }
}
