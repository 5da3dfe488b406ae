//! Integer money arithmetic for the pocket bank.
//!
//! Balances are whole currency units. Every monetary value that crosses a
//! boundary (persisted, displayed, or fed into the next calculation step)
//! passes through [`round_up`] so no fractional unit is ever stored.

/// Round toward positive infinity to the next whole currency unit.
pub fn round_up(amount: f64) -> i64 {
    amount.ceil() as i64
}

/// `percent` percent of `base`, rounded up.
pub fn percentage_of(base: i64, percent: f64) -> i64 {
    round_up(base as f64 * percent / 100.0)
}

/// Cap `amount` to `max`.
pub fn cap_to(amount: i64, max: i64) -> i64 {
    amount.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up_whole_values_unchanged() {
        assert_eq!(round_up(0.0), 0);
        assert_eq!(round_up(1.0), 1);
        assert_eq!(round_up(-3.0), -3);
    }

    #[test]
    fn test_round_up_fractions_go_up() {
        assert_eq!(round_up(1.01), 2);
        assert_eq!(round_up(1.1), 2);
        assert_eq!(round_up(0.0001), 1);
    }

    #[test]
    fn test_round_up_negative_fraction_moves_toward_zero() {
        assert_eq!(round_up(-0.5), 0);
        assert_eq!(round_up(-1.5), -1);
    }

    #[test]
    fn test_round_up_invariant() {
        // round_up(x) >= x and round_up(x) - x < 1
        for x in [-7.3, -0.5, 0.0, 0.49, 1.0, 2.999, 100.01] {
            let rounded = round_up(x);
            assert!(rounded as f64 >= x, "round_up({}) = {} dropped below input", x, rounded);
            assert!((rounded as f64 - x) < 1.0, "round_up({}) = {} jumped a full unit", x, rounded);
        }
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(100, 5.0), 5);
        assert_eq!(percentage_of(100, 0.0), 0);
        assert_eq!(percentage_of(1, 5.0), 1); // 0.05 rounds up to a whole unit
        assert_eq!(percentage_of(0, 50.0), 0);
        assert_eq!(percentage_of(333, 10.0), 34);
    }

    #[test]
    fn test_cap_to() {
        assert_eq!(cap_to(150, 100), 100);
        assert_eq!(cap_to(50, 100), 50);
        assert_eq!(cap_to(100, 0), 0);
    }
}
