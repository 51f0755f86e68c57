use serde::Serialize;

/// Classic floor-trader pivot levels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    /// Levels for the next period from one period's high, low and close.
    pub fn classic(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        let range = high - low;
        Self {
            pivot,
            r1: 2.0 * pivot - low,
            r2: pivot + range,
            r3: high + 2.0 * (pivot - low),
            s1: 2.0 * pivot - high,
            s2: pivot - range,
            s3: low - 2.0 * (high - pivot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_levels() {
        let p = PivotPoints::classic(110.0, 90.0, 100.0);
        assert_eq!(p.pivot, 100.0);
        assert_eq!(p.r1, 110.0);
        assert_eq!(p.s1, 90.0);
        assert_eq!(p.r2, 120.0);
        assert_eq!(p.s2, 80.0);
        assert_eq!(p.r3, 130.0);
        assert_eq!(p.s3, 70.0);
    }

    #[test]
    fn test_levels_are_ordered() {
        let p = PivotPoints::classic(64_500.0, 62_100.0, 63_900.0);
        assert!(p.s3 < p.s2 && p.s2 < p.s1 && p.s1 < p.pivot);
        assert!(p.pivot < p.r1 && p.r1 < p.r2 && p.r2 < p.r3);
    }
}
