use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Active,
    Completed,
    Disqualified,
    Refunded,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Active => write!(f, "active"),
            EntryStatus::Completed => write!(f, "completed"),
            EntryStatus::Disqualified => write!(f, "disqualified"),
            EntryStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub race_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub entered_at: DateTime<Utc>,
    /// Unit and direction depend on the race type
    #[serde(default)]
    pub score: Option<f64>,
    /// Set by settlement only
    #[serde(default)]
    pub rank: Option<u32>,
    pub status: EntryStatus,
    /// GBP, ranks 1-3 only
    #[serde(default)]
    pub prize_amount: Option<Decimal>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl Entry {
    pub fn new(user_id: &str, race_id: &str, entered_at: DateTime<Utc>) -> AppResult<Self> {
        if user_id.trim().is_empty() {
            return Err(AppError::ValidationError("Entry needs a user id".into()));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            race_id: race_id.to_string(),
            session_id: None,
            entered_at,
            score: None,
            rank: None,
            status: EntryStatus::Active,
            prize_amount: None,
            transaction_id: None,
        })
    }

    pub fn link_session(&mut self, session_id: &str) -> AppResult<()> {
        if self.status != EntryStatus::Active {
            return Err(AppError::InvalidState(format!(
                "Entry {} is {} and cannot take a session",
                self.id, self.status
            )));
        }
        self.session_id = Some(session_id.to_string());
        Ok(())
    }

    /// Disqualified and refunded entries never take part in ranking.
    pub fn is_rankable(&self) -> bool {
        matches!(self.status, EntryStatus::Active | EntryStatus::Completed)
    }
}

#[cfg(test)]
pub(crate) mod test_entries {
    use super::*;
    use chrono::TimeZone;

    pub fn scored(id: &str, score: Option<f64>) -> Entry {
        Entry {
            id: id.to_string(),
            user_id: format!("user-{id}"),
            race_id: "race-1".to_string(),
            session_id: Some(format!("session-{id}")),
            entered_at: Utc.with_ymd_and_hms(2026, 6, 9, 8, 0, 0).unwrap(),
            score,
            rank: None,
            status: EntryStatus::Active,
            prize_amount: None,
            transaction_id: None,
        }
    }
}
