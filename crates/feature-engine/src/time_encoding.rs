//! Cyclical Time Encoding

use std::f64::consts::PI;

/// Map a periodic value onto the unit circle as `(sin, cos)`.
///
/// Hour 23 and hour 0 end up adjacent instead of 23 units apart.
pub fn cyclical(value: u32, period: u32) -> (f64, f64) {
    let angle = 2.0 * PI * value as f64 / period as f64;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn test_midnight_wraps() {
        let (sin, cos) = cyclical(0, 24);
        assert_eq!(sin, 0.0);
        assert_eq!(cos, 1.0);
        assert!(distance(cyclical(23, 24), cyclical(0, 24)) < distance(cyclical(12, 24), cyclical(0, 24)));
    }

    #[test]
    fn test_quarter_period() {
        let (sin, cos) = cyclical(6, 24);
        assert!((sin - 1.0).abs() < 1e-12);
        assert!(cos.abs() < 1e-12);

        let (sin, cos) = cyclical(3, 12);
        assert!((sin - 1.0).abs() < 1e-12);
        assert!(cos.abs() < 1e-12);
    }
}
