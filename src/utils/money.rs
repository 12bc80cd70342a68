use rust_decimal::{Decimal, RoundingStrategy};

/// Pounds and pence, e.g. `£74.25`. Rounds half away from zero for display only.
pub fn format_gbp(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-£{:.2}", rounded.abs())
    } else {
        format!("£{:.2}", rounded.abs())
    }
}

/// Whole seconds as `m:ss`, or `h:mm:ss` past the hour.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_gbp() {
        assert_eq!(format_gbp(dec!(74.25)), "£74.25");
        assert_eq!(format_gbp(dec!(19.8)), "£19.80");
        assert_eq!(format_gbp(dec!(0.7425)), "£0.74");
        assert_eq!(format_gbp(dec!(0.745)), "£0.75");
        assert_eq!(format_gbp(Decimal::ZERO), "£0.00");
        assert_eq!(format_gbp(dec!(-2.5)), "-£2.50");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(245.4), "4:05");
        assert_eq!(format_duration(245.5), "4:06");
        assert_eq!(format_duration(3_725.0), "1:02:05");
    }
}
