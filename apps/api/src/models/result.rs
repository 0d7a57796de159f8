use serde::{Deserialize, Serialize};

/// Structured output of the generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Complete standalone HTML document.
    pub html_content: String,
    /// 0 – 100
    pub match_score: f64,
    pub explanation: String,
}

impl GenerationResult {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::classify(self.match_score)
    }
}

/// Display band for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// >= 80
    Good,
    /// 60 – 79
    Fair,
    /// < 60
    Poor,
}

impl ScoreBand {
    pub fn classify(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Good
        } else if score >= 60.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}
