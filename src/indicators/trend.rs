//! True range, directional movement and the Wilder-smoothed trend family
//! (ATR, +DI/-DI, DX, ADX).
//!
//! All columns are full-length and causal: index 0 is a warm-up slot holding
//! 0.0 (true range and directional movement need a prior bar), index 1 seeds
//! each Wilder recursion with the first defined raw value.

/// Denominators at or below this are treated as zero rather than divided by.
const DENOM_EPSILON: f64 = 1e-12;

/// True range: `max(high-low, |high-prev_close|, |low-prev_close|)`.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    debug_assert_eq!(highs.len(), lows.len());
    debug_assert_eq!(highs.len(), closes.len());
    if highs.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(highs.len());
    out.push(0.0);
    for i in 1..highs.len() {
        let prev_close = closes[i - 1];
        let tr = (highs[i] - lows[i])
            .max((highs[i] - prev_close).abs())
            .max((lows[i] - prev_close).abs());
        out.push(tr);
    }
    out
}

/// Raw +DM / -DM columns. At most one of the two is non-zero per bar: the
/// larger of up-move and down-move wins, and only when it is positive.
pub fn directional_movement(highs: &[f64], lows: &[f64]) -> (Vec<f64>, Vec<f64>) {
    debug_assert_eq!(highs.len(), lows.len());
    if highs.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut plus_dm = Vec::with_capacity(highs.len());
    let mut minus_dm = Vec::with_capacity(highs.len());
    plus_dm.push(0.0);
    minus_dm.push(0.0);

    for i in 1..highs.len() {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        if up_move > down_move && up_move > 0.0 {
            plus_dm.push(up_move);
            minus_dm.push(0.0);
        } else if down_move > up_move && down_move > 0.0 {
            plus_dm.push(0.0);
            minus_dm.push(down_move);
        } else {
            plus_dm.push(0.0);
            minus_dm.push(0.0);
        }
    }

    (plus_dm, minus_dm)
}

/// Wilder smoothing: exponential recursion with `alpha = 1 / period`, seeded
/// at `values[1]` (index 0 is the warm-up slot of the raw column).
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if values.len() < 2 || period == 0 {
        return vec![0.0; values.len()];
    }

    let alpha = 1.0 / period as f64;
    let mut out = Vec::with_capacity(values.len());
    out.push(0.0);
    out.push(values[1]);
    for &value in &values[2..] {
        let prev = *out.last().expect("seeded above");
        out.push(prev + alpha * (value - prev));
    }
    out
}

/// Directional index column: `100 * smoothed_dm / atr`, 0 where ATR is ~0.
pub fn directional_index(smoothed_dm: &[f64], atr: &[f64]) -> Vec<f64> {
    debug_assert_eq!(smoothed_dm.len(), atr.len());
    smoothed_dm
        .iter()
        .zip(atr)
        .map(|(dm, tr)| {
            if *tr > DENOM_EPSILON {
                100.0 * dm / tr
            } else {
                0.0
            }
        })
        .collect()
}

/// DX column: `100 * |+DI - -DI| / (+DI + -DI)`.
///
/// When the DI sum is ~0 (no directional movement at all) the value is
/// defined as 0, so ADX decays instead of absorbing a NaN.
pub fn dx(plus_di: &[f64], minus_di: &[f64]) -> Vec<f64> {
    debug_assert_eq!(plus_di.len(), minus_di.len());
    plus_di
        .iter()
        .zip(minus_di)
        .map(|(p, m)| {
            let sum = p + m;
            if sum > DENOM_EPSILON {
                100.0 * (p - m).abs() / sum
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_range_takes_largest_of_three() {
        let highs = [10.0, 12.0, 11.0];
        let lows = [9.0, 10.5, 8.0];
        let closes = [9.5, 11.0, 9.0];
        let tr = true_range(&highs, &lows, &closes);

        assert_eq!(tr[0], 0.0);
        // bar 1: max(1.5, |12-9.5|=2.5, |10.5-9.5|=1.0) = 2.5
        assert!((tr[1] - 2.5).abs() < 1e-12);
        // bar 2: max(3.0, |11-11|=0, |8-11|=3.0) = 3.0
        assert!((tr[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn at_most_one_dm_column_is_nonzero_per_bar() {
        let highs = [10.0, 12.0, 11.5, 11.6];
        let lows = [9.0, 9.5, 8.0, 8.2];
        let (plus, minus) = directional_movement(&highs, &lows);

        for i in 0..highs.len() {
            assert!(
                plus[i] == 0.0 || minus[i] == 0.0,
                "both DMs non-zero at {i}"
            );
        }
        // bar 1: up_move 2.0 > down_move -0.5 -> +DM
        assert!((plus[1] - 2.0).abs() < 1e-12);
        // bar 2: down_move 1.5 > up_move -0.5 -> -DM
        assert!((minus[2] - 1.5).abs() < 1e-12);
        // bar 3: up_move 0.1 vs down_move -0.2 -> +DM 0.1
        assert!((plus[3] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn equal_up_and_down_moves_produce_no_dm() {
        // Both moves equal and positive: neither column fires
        let highs = [10.0, 11.0];
        let lows = [9.0, 8.0];
        let (plus, minus) = directional_movement(&highs, &lows);
        assert_eq!(plus[1], 0.0);
        assert_eq!(minus[1], 0.0);
    }

    #[test]
    fn wilder_recursion_holds() {
        let values = [0.0, 4.0, 8.0, 2.0];
        let period = 4;
        let smoothed = wilder_smooth(&values, period);

        assert_eq!(smoothed[0], 0.0);
        assert!((smoothed[1] - 4.0).abs() < 1e-12);
        let alpha = 0.25;
        let expect_2 = 4.0 + alpha * (8.0 - 4.0);
        assert!((smoothed[2] - expect_2).abs() < 1e-12);
        let expect_3 = expect_2 + alpha * (2.0 - expect_2);
        assert!((smoothed[3] - expect_3).abs() < 1e-12);
    }

    #[test]
    fn dx_is_zero_when_di_sum_is_zero() {
        assert_eq!(dx(&[0.0], &[0.0]), vec![0.0]);
        // 100 * |30 - 10| / 40 = 50
        let result = dx(&[30.0], &[10.0]);
        assert!((result[0] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn directional_index_guards_zero_atr() {
        assert_eq!(directional_index(&[5.0], &[0.0]), vec![0.0]);
        let result = directional_index(&[5.0], &[10.0]);
        assert!((result[0] - 50.0).abs() < 1e-12);
    }
}
