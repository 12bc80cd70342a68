use rust_decimal::Decimal;

use crate::config::PrizeConfig;
use crate::models::PrizeDistribution;

#[derive(Clone)]
pub struct PrizeService {
    config: PrizeConfig,
}

impl PrizeService {
    pub fn new(config: PrizeConfig) -> Self {
        Self { config }
    }

    /// Splits a pool into the platform fee (share of the gross pool) and three tiers
    /// (shares of what is left). Exact decimal arithmetic, no rounding: the parts
    /// always add back up to the pool.
    pub fn calculate_prizes(&self, prize_pool: Decimal) -> PrizeDistribution {
        let platform_fee = prize_pool * self.config.platform_fee;
        let net_pool = prize_pool * (Decimal::ONE - self.config.platform_fee);

        PrizeDistribution {
            first: net_pool * self.config.first,
            second: net_pool * self.config.second,
            third: net_pool * self.config.third,
            platform_fee,
        }
    }

    pub fn prize_for_rank(&self, prize_pool: Decimal, rank: u32) -> Decimal {
        self.calculate_prizes(prize_pool).prize_for_rank(rank)
    }
}
