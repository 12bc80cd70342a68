use std::cmp::Ordering;

use crate::models::{Entry, RaceType, ScoreOrdering};

#[derive(Clone, Default)]
pub struct RankingService;

impl RankingService {
    pub fn new() -> Self {
        Self
    }

    /// Orders scored entries best first and numbers them 1, 2, 3, ...
    ///
    /// Entries without a finite score, or that are disqualified/refunded, are left out.
    /// Equal scores fall back to entry id, then entry time, so the order never depends
    /// on input order. Ranks are positional: tied scores still get distinct ranks.
    pub fn rank(&self, entries: &[Entry], race_type: RaceType) -> Vec<Entry> {
        let mut ranked: Vec<Entry> = entries
            .iter()
            .filter(|e| e.is_rankable() && e.score.is_some_and(f64::is_finite))
            .cloned()
            .collect();

        let ordering = race_type.ordering();
        ranked.sort_by(|a, b| Self::compare(a, b, ordering));

        for (position, entry) in ranked.iter_mut().enumerate() {
            entry.rank = Some(position as u32 + 1);
        }

        log::debug!(
            "Ranked {} of {} entries for {race_type}",
            ranked.len(),
            entries.len()
        );
        ranked
    }

    fn compare(a: &Entry, b: &Entry, ordering: ScoreOrdering) -> Ordering {
        // Scores are finite here.
        let (sa, sb) = (a.score.unwrap_or_default(), b.score.unwrap_or_default());
        let by_score = match ordering {
            ScoreOrdering::HigherIsBetter => sb.partial_cmp(&sa),
            ScoreOrdering::LowerIsBetter => sa.partial_cmp(&sb),
        }
        .unwrap_or(Ordering::Equal);

        by_score
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.entered_at.cmp(&b.entered_at))
    }
}
