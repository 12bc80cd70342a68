use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RaceConfig;
use crate::error::{AppError, AppResult};
use crate::models::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceType {
    #[serde(rename = "top_speed")]
    TopSpeed,
    #[serde(rename = "furthest_distance")]
    FurthestDistance,
    #[serde(rename = "fastest_1km")]
    Fastest1Km,
    #[serde(rename = "fastest_5km")]
    Fastest5Km,
    #[serde(rename = "fastest_10km")]
    Fastest10Km,
}

/// Which end of the score range wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrdering {
    HigherIsBetter,
    LowerIsBetter,
}

impl RaceType {
    pub fn ordering(&self) -> ScoreOrdering {
        match self {
            RaceType::TopSpeed | RaceType::FurthestDistance => ScoreOrdering::HigherIsBetter,
            RaceType::Fastest1Km | RaceType::Fastest5Km | RaceType::Fastest10Km => {
                ScoreOrdering::LowerIsBetter
            }
        }
    }

    /// Sub-effort distance in meters for the fastest-N races.
    pub fn target_distance_m(&self) -> Option<f64> {
        match self {
            RaceType::Fastest1Km => Some(1_000.0),
            RaceType::Fastest5Km => Some(5_000.0),
            RaceType::Fastest10Km => Some(10_000.0),
            RaceType::TopSpeed | RaceType::FurthestDistance => None,
        }
    }
}

impl std::fmt::Display for RaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaceType::TopSpeed => write!(f, "top_speed"),
            RaceType::FurthestDistance => write!(f, "furthest_distance"),
            RaceType::Fastest1Km => write!(f, "fastest_1km"),
            RaceType::Fastest5Km => write!(f, "fastest_5km"),
            RaceType::Fastest10Km => write!(f, "fastest_10km"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceDuration {
    Daily,
    Weekly,
    Monthly,
}

impl RaceDuration {
    pub fn entry_fee(&self, config: &RaceConfig) -> Decimal {
        match self {
            RaceDuration::Daily => config.daily_fee,
            RaceDuration::Weekly => config.weekly_fee,
            RaceDuration::Monthly => config.monthly_fee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    #[default]
    Open,
    Junior,
    Senior,
    Masters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderCategory {
    #[default]
    Open,
    Men,
    Women,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RaceCategory {
    pub age_group: AgeGroup,
    pub gender: GenderCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Upcoming,
    Active,
    Ended,
    Cancelled,
}

impl std::fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaceStatus::Upcoming => write!(f, "upcoming"),
            RaceStatus::Active => write!(f, "active"),
            RaceStatus::Ended => write!(f, "ended"),
            RaceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRace {
    pub id: String,
    pub race_type: RaceType,
    pub duration: RaceDuration,
    #[serde(default)]
    pub category: RaceCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub entry_count: u32,
    #[serde(default)]
    pub prize_pool: Decimal,
    pub status: RaceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NewRace")]
pub struct Race {
    pub id: String,
    pub race_type: RaceType,
    pub duration: RaceDuration,
    pub category: RaceCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub entry_count: u32,
    /// Accumulated entry fees (GBP)
    pub prize_pool: Decimal,
    pub status: RaceStatus,
}

impl TryFrom<NewRace> for Race {
    type Error = AppError;

    fn try_from(new: NewRace) -> AppResult<Self> {
        Self::new(new)
    }
}

impl Race {
    pub fn new(new: NewRace) -> AppResult<Self> {
        if new.id.trim().is_empty() {
            return Err(AppError::ValidationError("Race id is required".into()));
        }
        if new.end_date <= new.start_date {
            return Err(AppError::ValidationError(format!(
                "Race {} must end after it starts",
                new.id
            )));
        }
        if new.prize_pool.is_sign_negative() {
            return Err(AppError::ValidationError(format!(
                "Race {} has a negative prize pool",
                new.id
            )));
        }
        Ok(Self {
            id: new.id,
            race_type: new.race_type,
            duration: new.duration,
            category: new.category,
            start_date: new.start_date,
            end_date: new.end_date,
            entry_count: new.entry_count,
            prize_pool: new.prize_pool,
            status: new.status,
        })
    }

    pub fn entry_deadline(&self, lead: Duration) -> DateTime<Utc> {
        self.end_date - lead
    }

    /// Inclusive on both ends of the race window.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }

    /// Status implied by the clock. Cancellation is sticky.
    pub fn status_at(&self, now: DateTime<Utc>) -> RaceStatus {
        if self.status == RaceStatus::Cancelled {
            RaceStatus::Cancelled
        } else if now < self.start_date {
            RaceStatus::Upcoming
        } else if now <= self.end_date {
            RaceStatus::Active
        } else {
            RaceStatus::Ended
        }
    }

    pub fn refresh_status(&mut self, now: DateTime<Utc>) {
        let next = self.status_at(now);
        if next != self.status {
            log::debug!("Race {} status {} -> {}", self.id, self.status, next);
            self.status = next;
        }
    }

    pub fn accepts_entries(&self, now: DateTime<Utc>, lead: Duration) -> bool {
        self.status == RaceStatus::Active && now < self.entry_deadline(lead)
    }

    /// Registers a paid entry: bumps the entry count and adds the fee to the pool.
    pub fn accept_entry(
        &mut self,
        user_id: &str,
        config: &RaceConfig,
        now: DateTime<Utc>,
    ) -> AppResult<Entry> {
        if !self.accepts_entries(now, config.entry_deadline_lead()) {
            return Err(AppError::InvalidState(format!(
                "Race {} is not accepting entries (status {}, deadline {})",
                self.id,
                self.status,
                self.entry_deadline(config.entry_deadline_lead())
            )));
        }
        let fee = self.duration.entry_fee(config);
        let entry = Entry::new(user_id, &self.id, now)?;
        self.entry_count += 1;
        self.prize_pool += fee;
        log::info!(
            "User {user_id} entered race {} (fee {fee}, pool {})",
            self.id,
            self.prize_pool
        );
        Ok(entry)
    }

    pub fn cancel(&mut self) -> AppResult<()> {
        if self.status == RaceStatus::Ended {
            return Err(AppError::InvalidState(format!(
                "Race {} has already ended",
                self.id
            )));
        }
        self.status = RaceStatus::Cancelled;
        Ok(())
    }
}
