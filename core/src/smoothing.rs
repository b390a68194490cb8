// core/src/smoothing.rs

/// Bakoverskuende medianfilter (vindu `window`, min. 1 verdi).
/// Punkt i bruker verdiene [i-window+1, i]; starten bruker det som finnes.
pub fn rolling_median(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }
    let mut out = Vec::with_capacity(values.len());
    let mut win: Vec<f64> = Vec::with_capacity(window);

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        win.clear();
        win.extend_from_slice(&values[start..=i]);
        win.sort_by(|a, b| a.total_cmp(b));
        let n = win.len();
        let median = if n % 2 == 1 {
            win[n / 2]
        } else {
            (win[n / 2 - 1] + win[n / 2]) / 2.0
        };
        out.push(median);
    }

    out
}

/// Snitt av `values` over et distansevindu sentrert på hvert punkt:
/// punkt j teller for i når |pos_j - pos_i| < window_m / 2.
/// `positions` må være sortert stigende (kumulativ distanse).
pub fn distance_window_mean(positions: &[f64], values: &[f64], window_m: f64) -> Vec<f64> {
    let n = positions.len().min(values.len());
    let half = window_m / 2.0;
    let mut out = Vec::with_capacity(n);

    // [lo, hi) er vinduet for punkt i
    let mut lo = 0usize;
    let mut hi = 0usize;
    let mut sum = 0.0;

    for i in 0..n {
        let centre = positions[i];
        while hi < n && positions[hi] < centre + half {
            sum += values[hi];
            hi += 1;
        }
        while lo < hi && positions[lo] <= centre - half {
            sum -= values[lo];
            lo += 1;
        }
        let count = hi - lo;
        out.push(if count > 0 { sum / count as f64 } else { f64::NAN });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_removes_single_spike() {
        let alt = [100.0, 100.0, 100.0, 400.0, 100.0, 100.0];
        let out = rolling_median(&alt, 5);
        assert!(out.iter().all(|&a| (a - 100.0).abs() < 1e-9), "{out:?}");
    }

    #[test]
    fn median_uses_partial_window_at_start() {
        let out = rolling_median(&[1.0, 3.0, 2.0], 5);
        assert_eq!(out, vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn distance_window_is_open_on_both_sides() {
        let pos = [0.0, 50.0, 100.0, 150.0];
        let vals = [1.0, 2.0, 3.0, 4.0];
        // vindu 100 m → ±50 m, åpent: kun punktet selv
        assert_eq!(distance_window_mean(&pos, &vals, 100.0), vec![1.0, 2.0, 3.0, 4.0]);
        // vindu 200 m → ±100 m, åpent: naboene på 50 m
        assert_eq!(distance_window_mean(&pos, &vals, 200.0), vec![1.5, 2.0, 3.0, 3.5]);
    }
}
