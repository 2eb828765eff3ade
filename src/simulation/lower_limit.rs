/// Suffix minimum of `save_balance`: entry `i` is the lowest value the
/// savings-adjusted balance reaches on day `i` or later.
pub fn compute_lower_limit(save_balance: &[f64]) -> Vec<f64> {
    let mut lower_limit = vec![0.0; save_balance.len()];
    let mut current_min = f64::INFINITY;
    for (idx, value) in save_balance.iter().enumerate().rev() {
        current_min = current_min.min(*value);
        lower_limit[idx] = current_min;
    }
    lower_limit
}

/// Day index and value of the overall minimum, if any.
pub fn lowest_point(save_balance: &[f64]) -> Option<(usize, f64)> {
    save_balance
        .iter()
        .copied()
        .enumerate()
        .fold(None, |lowest, (idx, value)| match lowest {
            Some((_, min)) if min <= value => lowest,
            _ => Some((idx, value)),
        })
}
