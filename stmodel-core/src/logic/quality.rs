//! Quality Categories
//!
//! Maps a real-scale score onto the three water quality levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category boundaries (lower bounds, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Score at or above which quality is `BONNE`
    pub good: f64,

    /// Score at or above which quality is `MOYENNE`
    pub medium: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self { good: 7.0, medium: 4.0 }
    }
}

impl QualityThresholds {
    pub fn categorize(&self, score: f64) -> QualityLevel {
        if score >= self.good {
            QualityLevel::Bonne
        } else if score >= self.medium {
            QualityLevel::Moyenne
        } else {
            QualityLevel::Mauvaise
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityLevel {
    Bonne,
    Moyenne,
    Mauvaise,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Bonne => "BONNE",
            QualityLevel::Moyenne => "MOYENNE",
            QualityLevel::Mauvaise => "MAUVAISE",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorize with the default boundaries (7.0 / 4.0).
/// NaN falls through to `MAUVAISE`.
pub fn categorize(score: f64) -> QualityLevel {
    QualityThresholds::default().categorize(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(categorize(7.0), QualityLevel::Bonne);
        assert_eq!(categorize(6.999), QualityLevel::Moyenne);
        assert_eq!(categorize(4.0), QualityLevel::Moyenne);
        assert_eq!(categorize(3.999), QualityLevel::Mauvaise);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(categorize(10.0), QualityLevel::Bonne);
        assert_eq!(categorize(0.0), QualityLevel::Mauvaise);
        assert_eq!(categorize(-1.0), QualityLevel::Mauvaise);
        assert_eq!(categorize(f64::NAN), QualityLevel::Mauvaise);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = QualityThresholds { good: 8.5, medium: 6.0 };
        assert_eq!(strict.categorize(8.0), QualityLevel::Moyenne);
        assert_eq!(strict.categorize(5.9), QualityLevel::Mauvaise);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&QualityLevel::Bonne).unwrap(), "\"BONNE\"");
        assert_eq!(serde_json::to_string(&QualityLevel::Mauvaise).unwrap(), "\"MAUVAISE\"");
        let parsed: QualityLevel = serde_json::from_str("\"MOYENNE\"").unwrap();
        assert_eq!(parsed, QualityLevel::Moyenne);
        assert_eq!(QualityLevel::Moyenne.to_string(), "MOYENNE");
    }
}
