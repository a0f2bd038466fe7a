// src/normalize.rs
//! Numeric side of field cleaning.
//!
//! Min-max scaling is relative to the rows present when it runs: values from
//! two runs over different row sets are not comparable, and a changed row set
//! means normalizing again. Non-values (`?`, empty, unparseable) are `None`
//! and take no part in min/max/mean.

use crate::config::consts::SENTINEL;
use crate::table::Table;

/// `"72.4 in./year"` → `72.4`, `"$1,234"` → `1234`, `"?"` → `None`.
/// Keeps digits, the first `.`, and a `-` that comes before any digit.
pub fn extract_number(raw: &str) -> Option<f64> {
    let t = raw.trim();
    if t.is_empty() || t.starts_with(SENTINEL) || t.ends_with(SENTINEL) {
        return None;
    }
    let mut out = String::with_capacity(t.len());
    let mut seen_dot = false;
    let mut seen_digit = false;
    for ch in t.chars() {
        match ch {
            '0'..='9' => { out.push(ch); seen_digit = true; }
            '.' if !seen_dot => { out.push('.'); seen_dot = true; }
            '-' if !seen_digit && out.is_empty() => out.push('-'),
            _ => {}
        }
    }
    if !seen_digit {
        return None;
    }
    out.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// One `Option<f64>` per row: `Some` only for value cells holding a number.
pub fn numeric_column(table: &Table, col: usize) -> Vec<Option<f64>> {
    table.rows().iter().map(|r| r[col].as_value().and_then(extract_number)).collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

pub fn summarize(values: &[Option<f64>]) -> Option<Summary> {
    let mut it = values.iter().flatten().copied();
    let first = it.next()?;
    let (mut min, mut max, mut sum, mut count) = (first, first, first, 1usize);
    for x in it {
        min = min.min(x);
        max = max.max(x);
        sum += x;
        count += 1;
    }
    Some(Summary { min, max, mean: sum / count as f64, count })
}

/// `(x - min) / (max - min)` over present values. A constant column maps to `0.0`.
pub fn min_max(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some(Summary { min, max, .. }) = summarize(values) else {
        return vec![None; values.len()];
    };
    let span = max - min;
    values
        .iter()
        .map(|v| v.map(|x| if span > 0.0 { (x - min) / span } else { 0.0 }))
        .collect()
}

/// Lower-is-better features: `1 - normalize(x)`.
pub fn reverse_min_max(values: &[Option<f64>]) -> Vec<Option<f64>> {
    min_max(values).into_iter().map(|v| v.map(|x| 1.0 - x)).collect()
}

pub fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_out_of_unit_text() {
        assert_eq!(extract_number("72.4 in./year"), Some(72.4));
        assert_eq!(extract_number("$1,234"), Some(1234.0));
        assert_eq!(extract_number("-3.5°F"), Some(-3.5));
        assert_eq!(extract_number("62%"), Some(62.0));
        assert_eq!(extract_number("?"), None);
        assert_eq!(extract_number("? in."), None);
        assert_eq!(extract_number("12?"), None);
        assert_eq!(extract_number("n/a"), None);
        assert_eq!(extract_number(""), None);
    }

    #[test]
    fn sentinel_is_not_zero() {
        let vals = vec![Some(10.0), Some(20.0), Some(30.0), None, Some(40.0)];
        let s = summarize(&vals).unwrap();
        assert_eq!((s.min, s.max, s.count), (10.0, 40.0, 4));
        assert_eq!(s.mean, 25.0);

        let scaled: Vec<Option<f64>> = min_max(&vals).into_iter().map(|v| v.map(|x| round_to(x, 3))).collect();
        assert_eq!(scaled, vec![Some(0.0), Some(0.333), Some(0.667), None, Some(1.0)]);

        let quarters = vec![Some(10.0), Some(20.0), Some(30.0), None, Some(50.0)];
        assert_eq!(min_max(&quarters), vec![Some(0.0), Some(0.25), Some(0.5), None, Some(1.0)]);
        assert_eq!(reverse_min_max(&quarters), vec![Some(1.0), Some(0.75), Some(0.5), None, Some(0.0)]);
    }

    #[test]
    fn constant_and_empty_columns() {
        assert_eq!(min_max(&[Some(3.0), None, Some(3.0)]), vec![Some(0.0), None, Some(0.0)]);
        assert_eq!(min_max(&[None, None]), vec![None, None]);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.0 / 3.0, 3), 0.333);
        assert_eq!(round_to(0.6666, 3), 0.667);
    }
}
