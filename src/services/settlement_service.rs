//! End-of-race pipeline: score, rank, split the pool, emit awards.
//!
//! Settlement is a pure computation over its inputs. Persisting ranks, crediting
//! wallets and guarding against settling a race twice belong to the caller, which
//! receives the [`RaceResult`] as its input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::config::{Config, RaceConfig};
use crate::error::{AppError, AppResult};
use crate::models::{Entry, EntryStatus, PrizeAward, Race, RaceResult, RaceStatus, Refund, Session};
use crate::services::{EligibilityService, PrizeService, RankingService, ScoringService};

const PRIZE_PLACES: u32 = 3;

#[derive(Clone)]
pub struct SettlementService {
    eligibility_service: EligibilityService,
    scoring_service: ScoringService,
    ranking_service: RankingService,
    prize_service: PrizeService,
    race_config: RaceConfig,
}

impl SettlementService {
    pub fn new(
        eligibility_service: EligibilityService,
        scoring_service: ScoringService,
        ranking_service: RankingService,
        prize_service: PrizeService,
        race_config: RaceConfig,
    ) -> Self {
        Self {
            eligibility_service,
            scoring_service,
            ranking_service,
            prize_service,
            race_config,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EligibilityService::new(config.eligibility.clone()),
            ScoringService::new(),
            RankingService::new(),
            PrizeService::new(config.prizes.clone()),
            config.races.clone(),
        )
    }

    /// Fills in each entry's score from its linked session. Entries of other races are
    /// dropped. Entries whose session is missing, belongs to someone else, is ineligible
    /// for this race or cannot be scored end up with no score.
    pub fn score_entries(&self, race: &Race, entries: &[Entry], sessions: &[Session]) -> Vec<Entry> {
        let by_id: HashMap<&str, &Session> = sessions.iter().map(|s| (s.id.as_str(), s)).collect();

        self.entries_of(race, entries)
            .map(|entry| {
                let mut entry = entry.clone();
                entry.score = entry
                    .session_id
                    .as_deref()
                    .and_then(|id| by_id.get(id).copied())
                    .filter(|session| session.user_id == entry.user_id)
                    .filter(|session| self.eligibility_service.classify(session, race).is_eligible())
                    .and_then(|session| self.scoring_service.score(session, race.race_type));
                entry
            })
            .collect()
    }

    /// Ranks this race's entries and splits its pool among the top three.
    ///
    /// A cancelled race pays nothing: the result is empty and its entrants are owed
    /// [`SettlementService::refunds`] instead.
    pub fn settle(&self, race: &Race, entries: &[Entry], processed_at: DateTime<Utc>) -> RaceResult {
        if race.status == RaceStatus::Cancelled {
            log::warn!("Race {} is cancelled, no prizes awarded", race.id);
            return RaceResult {
                race_id: race.id.clone(),
                ranked_entries: Vec::new(),
                prize_awards: Vec::new(),
                total_pool: race.prize_pool,
                platform_fee: Decimal::ZERO,
                unawarded: Decimal::ZERO,
                processed_at,
            };
        }

        let own: Vec<Entry> = self.entries_of(race, entries).cloned().collect();
        let mut ranked_entries = self.ranking_service.rank(&own, race.race_type);
        let distribution = self.prize_service.calculate_prizes(race.prize_pool);

        let mut prize_awards = Vec::new();
        for entry in ranked_entries.iter_mut() {
            entry.status = EntryStatus::Completed;
            entry.prize_amount = None;
            let Some(rank) = entry.rank.filter(|r| *r <= PRIZE_PLACES) else {
                continue;
            };
            let amount = distribution.prize_for_rank(rank);
            entry.prize_amount = Some(amount);
            prize_awards.push(PrizeAward {
                entry_id: entry.id.clone(),
                user_id: entry.user_id.clone(),
                amount,
                rank,
            });
        }

        let unawarded: Decimal = (prize_awards.len() as u32 + 1..=PRIZE_PLACES)
            .map(|rank| distribution.prize_for_rank(rank))
            .sum();

        log::info!(
            "Settled race {}: {} ranked, {} awards, pool {}, fee {}, unawarded {}",
            race.id,
            ranked_entries.len(),
            prize_awards.len(),
            race.prize_pool,
            distribution.platform_fee,
            unawarded
        );

        RaceResult {
            race_id: race.id.clone(),
            ranked_entries,
            prize_awards,
            total_pool: race.prize_pool,
            platform_fee: distribution.platform_fee,
            unawarded,
            processed_at,
        }
    }

    pub fn settle_with_sessions(
        &self,
        race: &Race,
        entries: &[Entry],
        sessions: &[Session],
        processed_at: DateTime<Utc>,
    ) -> RaceResult {
        let scored = self.score_entries(race, entries, sessions);
        self.settle(race, &scored, processed_at)
    }

    /// Entry fees owed back to every still-active entrant of a cancelled race.
    pub fn refunds(&self, race: &Race, entries: &[Entry]) -> AppResult<Vec<Refund>> {
        if race.status != RaceStatus::Cancelled {
            return Err(AppError::InvalidState(format!(
                "Race {} is {}, only cancelled races are refunded",
                race.id, race.status
            )));
        }
        let fee = race.duration.entry_fee(&self.race_config);
        Ok(self
            .entries_of(race, entries)
            .filter(|e| e.status == EntryStatus::Active)
            .map(|e| Refund {
                entry_id: e.id.clone(),
                user_id: e.user_id.clone(),
                amount: fee,
            })
            .collect())
    }

    fn entries_of<'a>(
        &self,
        race: &'a Race,
        entries: &'a [Entry],
    ) -> impl Iterator<Item = &'a Entry> {
        entries.iter().filter(move |e| {
            let own = e.race_id == race.id;
            if !own {
                log::warn!("Ignoring entry {} of race {} in race {}", e.id, e.race_id, race.id);
            }
            own
        })
    }
}
