/// Kelly fraction `f* = p - (1 - p) / r`.
///
/// `win_probability` is clamped to [0, 1]. A non-positive payoff ratio or any
/// non-finite input sizes to zero, and the result never goes negative (no
/// short sizing from a losing edge).
pub fn kelly_criterion(win_probability: f64, payoff_ratio: f64) -> f64 {
    if !win_probability.is_finite() || !payoff_ratio.is_finite() || payoff_ratio <= 0.0 {
        return 0.0;
    }
    let p = win_probability.clamp(0.0, 1.0);
    (p - (1.0 - p) / payoff_ratio).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_money_coin_flip_has_no_edge() {
        assert_eq!(kelly_criterion(0.5, 1.0), 0.0);
    }

    #[test]
    fn zero_or_negative_payoff_sizes_to_zero() {
        for p in [0.0, 0.3, 0.5, 0.9, 1.0] {
            assert_eq!(kelly_criterion(p, 0.0), 0.0);
            assert_eq!(kelly_criterion(p, -2.0), 0.0);
        }
    }

    #[test]
    fn positive_edge() {
        // p = 0.6, r = 2 -> 0.6 - 0.4 / 2 = 0.4
        assert!((kelly_criterion(0.6, 2.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn never_negative() {
        for p in [0.0, 0.1, 0.25, 0.49] {
            for r in [0.1, 0.5, 1.0, 3.0] {
                assert!(kelly_criterion(p, r) >= 0.0);
            }
        }
        assert_eq!(kelly_criterion(f64::NAN, 2.0), 0.0);
        assert_eq!(kelly_criterion(1.5, 2.0), 1.0);
    }
}
