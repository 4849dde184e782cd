//! Fixed range policy per sensor kind.

/// Inclusive numeric bounds for one sensor kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePolicy {
    pub kind: &'static str,
    pub lo: f64,
    pub hi: f64,
}

impl RangePolicy {
    /// `NaN` is never contained.
    pub fn contains(&self, value: f64) -> bool {
        (self.lo..=self.hi).contains(&value)
    }
}

/// Sensor kinds with a known range.
pub const RANGE_TABLE: &[RangePolicy] = &[
    RangePolicy {
        kind: "temperature",
        lo: -10.0,
        hi: 60.0,
    },
    RangePolicy {
        kind: "air_humidity",
        lo: 0.0,
        hi: 100.0,
    },
    RangePolicy {
        kind: "soil_humidity",
        lo: 0.0,
        hi: 100.0,
    },
    RangePolicy {
        kind: "co2",
        lo: 0.0,
        hi: 10_000.0,
    },
    RangePolicy {
        kind: "luminosity",
        lo: 0.0,
        hi: 200_000.0,
    },
];

/// Look up the policy for a kind (exact, case-sensitive match).
pub fn range_for(kind: &str) -> Option<&'static RangePolicy> {
    RANGE_TABLE.iter().find(|policy| policy.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_bounds_are_inclusive() {
        let policy = range_for("temperature").expect("temperature policy");
        assert!(policy.contains(-10.0));
        assert!(policy.contains(60.0));
        assert!(!policy.contains(-10.0001));
        assert!(!policy.contains(60.0001));
    }

    #[test]
    fn unknown_kind_has_no_policy() {
        assert!(range_for("ph").is_none());
        assert!(range_for("Temperature").is_none());
    }

    #[test]
    fn nan_is_outside_every_range() {
        assert!(RANGE_TABLE.iter().all(|p| !p.contains(f64::NAN)));
    }
}
