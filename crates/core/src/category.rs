//! Productivity category thresholds.

use serde::{Serialize, Serializer};

/// Upper bound (inclusive) of the below-average bucket.
pub const BELOW_AVERAGE_MAX: f64 = 0.3;

/// Upper bound (inclusive) of the medium bucket.
pub const MEDIUM_MAX: f64 = 0.8;

/// Ordinal productivity bucket. Serializes as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProductivityCategory {
    BelowAverage,
    Medium,
    High,
}

impl ProductivityCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::BelowAverage => "Below Average Productivity",
            Self::Medium => "Medium Productivity",
            Self::High => "High Productivity",
        }
    }
}

impl Serialize for ProductivityCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Bucket a predicted productivity score.
pub fn classify(score: f64) -> ProductivityCategory {
    if score <= BELOW_AVERAGE_MAX {
        ProductivityCategory::BelowAverage
    } else if score <= MEDIUM_MAX {
        ProductivityCategory::Medium
    } else {
        ProductivityCategory::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_lower_bucket() {
        assert_eq!(classify(0.3), ProductivityCategory::BelowAverage);
        assert_eq!(classify(0.30001), ProductivityCategory::Medium);
        assert_eq!(classify(0.8), ProductivityCategory::Medium);
        assert_eq!(classify(0.80001), ProductivityCategory::High);
    }

    #[test]
    fn extremes() {
        assert_eq!(classify(-1.0), ProductivityCategory::BelowAverage);
        assert_eq!(classify(1.2), ProductivityCategory::High);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&ProductivityCategory::Medium).unwrap();
        assert_eq!(json, "\"Medium Productivity\"");
    }
}
