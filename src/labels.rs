//! Sentiment and topic label mappings.
//!
//! The `prediction` table stores classifications as small integer codes.
//! These enums are the fixed, total mappings between codes and the
//! human-readable labels the API returns. An out-of-range stored code is
//! reported as a `Mapping` error rather than a panic.

use crate::error::{AnalyticsError, Result};
use serde::Serialize;
use std::fmt;

/// Sentiment classification of a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// All sentiments in ascending code order.
    pub const ALL: [Sentiment; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Parses a stored sentiment code. Returns `None` for codes outside {0, 1, 2}.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Negative),
            1 => Some(Self::Neutral),
            2 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Parses a stored sentiment code, reporting unknown codes as a mapping error.
    pub fn try_from_code(code: i32) -> Result<Self> {
        Self::from_code(code)
            .ok_or_else(|| AnalyticsError::mapping(format!("unknown sentiment code {code}")))
    }

    /// Returns the integer code as stored in the database.
    pub fn code(self) -> i32 {
        match self {
            Self::Negative => 0,
            Self::Neutral => 1,
            Self::Positive => 2,
        }
    }

    /// Returns the label used in API responses.
    pub fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Topic classification of a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topic {
    Lecturer,
    #[serde(rename = "Training Program")]
    TrainingProgram,
    Facility,
    Others,
}

impl Topic {
    /// All topics in ascending code order.
    pub const ALL: [Topic; 4] = [
        Self::Lecturer,
        Self::TrainingProgram,
        Self::Facility,
        Self::Others,
    ];

    /// Parses a stored topic code. Returns `None` for codes outside {0, 1, 2, 3}.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Lecturer),
            1 => Some(Self::TrainingProgram),
            2 => Some(Self::Facility),
            3 => Some(Self::Others),
            _ => None,
        }
    }

    /// Parses a stored topic code, reporting unknown codes as a mapping error.
    pub fn try_from_code(code: i32) -> Result<Self> {
        Self::from_code(code)
            .ok_or_else(|| AnalyticsError::mapping(format!("unknown topic code {code}")))
    }

    /// Returns the integer code as stored in the database.
    pub fn code(self) -> i32 {
        match self {
            Self::Lecturer => 0,
            Self::TrainingProgram => 1,
            Self::Facility => 2,
            Self::Others => 3,
        }
    }

    /// Returns the label used in API responses.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lecturer => "Lecturer",
            Self::TrainingProgram => "Training Program",
            Self::Facility => "Facility",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sentiment_code_roundtrip() {
        for sentiment in Sentiment::ALL {
            assert_eq!(Sentiment::from_code(sentiment.code()), Some(sentiment));
        }
    }

    #[test]
    fn test_topic_code_roundtrip() {
        for topic in Topic::ALL {
            assert_eq!(Topic::from_code(topic.code()), Some(topic));
        }
    }

    #[test]
    fn test_sentiment_labels() {
        assert_eq!(Sentiment::from_code(0).unwrap().label(), "Negative");
        assert_eq!(Sentiment::from_code(1).unwrap().label(), "Neutral");
        assert_eq!(Sentiment::from_code(2).unwrap().label(), "Positive");
    }

    #[test]
    fn test_topic_labels() {
        assert_eq!(Topic::from_code(0).unwrap().label(), "Lecturer");
        assert_eq!(Topic::from_code(1).unwrap().label(), "Training Program");
        assert_eq!(Topic::from_code(2).unwrap().label(), "Facility");
        assert_eq!(Topic::from_code(3).unwrap().label(), "Others");
    }

    #[test]
    fn test_labels_are_bijections() {
        let sentiment_labels: HashSet<_> = Sentiment::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(sentiment_labels.len(), Sentiment::ALL.len());

        let topic_labels: HashSet<_> = Topic::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(topic_labels.len(), Topic::ALL.len());
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert_eq!(Sentiment::from_code(-1), None);
        assert_eq!(Sentiment::from_code(3), None);
        assert_eq!(Topic::from_code(4), None);

        let err = Sentiment::try_from_code(7).unwrap_err();
        assert!(err.to_string().contains("unknown sentiment code 7"));

        let err = Topic::try_from_code(-2).unwrap_err();
        assert!(err.to_string().contains("unknown topic code -2"));
    }

    #[test]
    fn test_all_arrays_in_code_order() {
        for (i, sentiment) in Sentiment::ALL.iter().enumerate() {
            assert_eq!(sentiment.code(), i as i32);
        }
        for (i, topic) in Topic::ALL.iter().enumerate() {
            assert_eq!(topic.code(), i as i32);
        }
    }

    #[test]
    fn test_serialize_uses_labels() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Positive).unwrap(),
            "\"Positive\""
        );
        assert_eq!(
            serde_json::to_string(&Topic::TrainingProgram).unwrap(),
            "\"Training Program\""
        );
    }
}
