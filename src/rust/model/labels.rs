use std::fmt;

use serde::{Deserialize, Serialize};

/// Human-readable sentiment for a prediction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
    /// Any code the label map does not cover
    Unknown,
}

impl Sentiment {
    /// Maps a numeric class code to its label. Total: unmapped codes give
    /// [`Sentiment::Unknown`].
    pub fn from_code(code: i64) -> Self {
        match code {
            -1 => Sentiment::Negative,
            0 => Sentiment::Neutral,
            1 => Sentiment::Positive,
            _ => Sentiment::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
            Sentiment::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
