use crate::models::{RaceType, Session};
use crate::utils::format_duration;

const MS_TO_KMH: f64 = 3.6;

#[derive(Clone, Default)]
pub struct ScoringService;

impl ScoringService {
    pub fn new() -> Self {
        Self
    }

    /// Comparable score for a race type, or `None` when the session cannot be scored.
    ///
    /// - top speed: km/h
    /// - furthest distance: km
    /// - fastest N km: seconds, from the recorded sub-effort when known, otherwise
    ///   moving-time pace scaled to N km. Never extrapolated past the recorded distance.
    pub fn score(&self, session: &Session, race_type: RaceType) -> Option<f64> {
        if !session.is_race_ready() {
            log::debug!("Session {} is not race ready, no score", session.id);
            return None;
        }

        let score = match race_type {
            RaceType::TopSpeed => session.max_speed * MS_TO_KMH,
            RaceType::FurthestDistance => session.distance_km(),
            RaceType::Fastest1Km | RaceType::Fastest5Km | RaceType::Fastest10Km => {
                self.segment_time(session, race_type)?
            }
        };

        score.is_finite().then_some(score)
    }

    fn segment_time(&self, session: &Session, race_type: RaceType) -> Option<f64> {
        let target_m = race_type.target_distance_m()?;
        if session.distance < target_m {
            log::debug!(
                "Session {} covers {}m, too short for {race_type}",
                session.id,
                session.distance
            );
            return None;
        }

        let known = match race_type {
            RaceType::Fastest1Km => session.segment_times.one_km,
            RaceType::Fastest5Km => session.segment_times.five_km,
            RaceType::Fastest10Km => session.segment_times.ten_km,
            RaceType::TopSpeed | RaceType::FurthestDistance => None,
        };
        if known.is_some() {
            return known;
        }

        if session.moving_time == 0 {
            return None;
        }
        let pace_per_km = f64::from(session.moving_time) / session.distance_km();
        Some(pace_per_km * target_m / 1_000.0)
    }

    /// Human-facing rendering of a score: `14.4 km/h`, `12.35 km`, `4:05`.
    pub fn display(&self, score: f64, race_type: RaceType) -> String {
        match race_type {
            RaceType::TopSpeed => format!("{score:.1} km/h"),
            RaceType::FurthestDistance => format!("{score:.2} km"),
            RaceType::Fastest1Km | RaceType::Fastest5Km | RaceType::Fastest10Km => {
                format_duration(score)
            }
        }
    }
}
