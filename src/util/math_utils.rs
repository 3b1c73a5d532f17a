use ndarray::ArrayView1;

/**
Divides `numerator` by `denominator`, treating a zero denominator as a
degenerate ratio with value `0.0`.

## Arguments
- `numerator`: The dividend.
- `denominator`: The divisor.

## Returns
`numerator / denominator`, or `0.0` when `denominator` is exactly zero.
 */
pub fn quotient(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean of a view, `0.0` when it is empty.
pub fn mean(values: ArrayView1<'_, f64>) -> f64 {
    values.mean().unwrap_or(0.0)
}

/// Rounds `value` to `digits` decimal places, ties going to the even digit.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

/// Harmonic-mean combination of two rates, with the zero-denominator rule applied.
pub fn harmonic(a: f64, b: f64) -> f64 {
    2.0 * quotient(a * b, a + b)
}
