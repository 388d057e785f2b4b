//! Market conventions used by the pricers.
//!
//! Day counts are in trading days (252 per year). Cash dividends are assumed
//! to be paid quarterly, so one dividend period is 62.5 trading days.

/// Trading days in one year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trading days in one dividend period (a quarter of a 250-day year).
pub const DIVIDEND_PERIOD_DAYS: f64 = 62.5;

/// Dividend payments per year.
pub const DIVIDENDS_PER_YEAR: i32 = 4;

/// Convert a trading-day count to years.
pub fn days_to_years(days: f64) -> f64 {
    days / TRADING_DAYS_PER_YEAR
}

/// Convert years to trading days.
pub fn years_to_days(years: f64) -> f64 {
    years * TRADING_DAYS_PER_YEAR
}

/// Growth over one period of length `dt` (years) at an annually compounded
/// rate: `r̂ = (1 + r)^dt`.
pub fn period_growth(rate: f64, dt: f64) -> f64 {
    (1.0 + rate).powf(dt)
}

/// Whole dividend periods left in `remaining_days` trading days.
pub fn dividend_periods(remaining_days: f64) -> i32 {
    (remaining_days / DIVIDEND_PERIOD_DAYS).floor().max(0.0) as i32
}

/// Annual yield equivalent of a quarterly cash dividend: `(1 + D/S)⁴ − 1`.
pub fn cash_dividend_yield(amount: f64, spot: f64) -> f64 {
    (1.0 + amount / spot).powi(DIVIDENDS_PER_YEAR) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn two_years_is_504_days() {
        assert_abs_diff_eq!(days_to_years(504.0), 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(years_to_days(2.0), 504.0, epsilon = 1e-12);
    }

    #[test]
    fn period_growth_compounds_annually() {
        assert_abs_diff_eq!(period_growth(0.05, 1.0), 1.05, epsilon = 1e-15);
        assert_abs_diff_eq!(period_growth(0.05, 2.0), 1.1025, epsilon = 1e-12);
        assert_eq!(period_growth(0.05, 0.0), 1.0);
    }

    #[test]
    fn dividend_periods_floor_partial_quarters() {
        assert_eq!(dividend_periods(0.0), 0);
        assert_eq!(dividend_periods(62.4), 0);
        assert_eq!(dividend_periods(62.5), 1);
        assert_eq!(dividend_periods(504.0), 8);
        assert_eq!(dividend_periods(-5.0), 0);
    }

    #[test]
    fn cash_dividend_yield_zero_for_zero_amount() {
        assert_eq!(cash_dividend_yield(0.0, 100.0), 0.0);
        let q = cash_dividend_yield(1.0, 100.0);
        assert_abs_diff_eq!(q, 1.01_f64.powi(4) - 1.0, epsilon = 1e-15);
    }
}
