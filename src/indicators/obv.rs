//! On-Balance Volume and its exponential moving average.

/// Cumulative signed volume. `obv[0]` is 0; each later entry adds the bar's
/// volume when the close rose, subtracts it when the close fell, and carries
/// the previous value on an unchanged close.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    debug_assert_eq!(closes.len(), volumes.len());
    if closes.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(closes.len());
    out.push(0.0);
    for i in 1..closes.len() {
        let prev = out[i - 1];
        let next = if closes[i] > closes[i - 1] {
            prev + volumes[i]
        } else if closes[i] < closes[i - 1] {
            prev - volumes[i]
        } else {
            prev
        };
        out.push(next);
    }
    out
}

/// Exponential moving average parameterized by span: `alpha = 2 / (span + 1)`.
///
/// Seeded at `values[0]` with no warm-up window skipped, so
/// `ma[i] = alpha * values[i] + (1 - alpha) * ma[i-1]` holds for every i > 0.
pub fn ema_span(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    out.push(values[0]);
    for &value in &values[1..] {
        let prev = *out.last().expect("seeded above");
        out.push(alpha * value + (1.0 - alpha) * prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_follows_close_direction_exactly() {
        let closes = [10.0, 11.0, 11.0, 10.5, 12.0];
        let volumes = [100.0, 200.0, 300.0, 400.0, 500.0];
        let result = obv(&closes, &volumes);
        // up: +200, flat: carry, down: -400, up: +500
        assert_eq!(result, vec![0.0, 200.0, 200.0, -200.0, 300.0]);
    }

    #[test]
    fn obv_of_single_bar_is_zero() {
        assert_eq!(obv(&[42.0], &[1000.0]), vec![0.0]);
        assert!(obv(&[], &[]).is_empty());
    }

    #[test]
    fn ema_recursion_holds_exactly() {
        let values = [0.0, 10.0, -5.0, 20.0, 3.0];
        let span = 4;
        let alpha = 2.0 / (span as f64 + 1.0);
        let ma = ema_span(&values, span);

        assert_eq!(ma.len(), values.len());
        assert!((ma[0] - values[0]).abs() < f64::EPSILON);
        for i in 1..values.len() {
            let expected = alpha * values[i] + (1.0 - alpha) * ma[i - 1];
            assert!(
                (ma[i] - expected).abs() < 1e-12,
                "recursion violated at {i}: {} vs {}",
                ma[i],
                expected
            );
        }
    }
}
