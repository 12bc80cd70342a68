use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Entry;

/// Prize tiers for one pool. Derived from the race, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeDistribution {
    pub first: Decimal,
    pub second: Decimal,
    pub third: Decimal,
    pub platform_fee: Decimal,
}

impl PrizeDistribution {
    /// Rank 1/2/3 get their tier, everyone else gets nothing.
    pub fn prize_for_rank(&self, rank: u32) -> Decimal {
        match rank {
            1 => self.first,
            2 => self.second,
            3 => self.third,
            _ => Decimal::ZERO,
        }
    }

    pub fn net_pool(&self) -> Decimal {
        self.first + self.second + self.third
    }

    pub fn total(&self) -> Decimal {
        self.net_pool() + self.platform_fee
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeAward {
    pub entry_id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub rank: u32,
}

/// Entry fee owed back to an entrant of a cancelled race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub entry_id: String,
    pub user_id: String,
    pub amount: Decimal,
}

/// Output of settlement. The ledger collaborator applies it exactly once per race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: String,
    pub ranked_entries: Vec<Entry>,
    pub prize_awards: Vec<PrizeAward>,
    pub total_pool: Decimal,
    pub platform_fee: Decimal,
    /// Tiers left over when fewer than three entries placed
    pub unawarded: Decimal,
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_prize_for_rank() {
        let d = PrizeDistribution {
            first: dec!(74.25),
            second: dec!(19.80),
            third: dec!(4.95),
            platform_fee: dec!(1.00),
        };
        assert_eq!(d.prize_for_rank(1), dec!(74.25));
        assert_eq!(d.prize_for_rank(3), dec!(4.95));
        assert_eq!(d.prize_for_rank(4), Decimal::ZERO);
        assert_eq!(d.prize_for_rank(0), Decimal::ZERO);
        assert_eq!(d.total(), dec!(100.00));
    }
}
