use serde::{Deserialize, Serialize};

pub const PASS_PERCENT: u32 = 70;

/// Outcome of one submitted answer, kept until the player advances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub selected: usize,
    pub correct_index: usize,
    pub explanation: String,
    /// Set on a gauntlet miss: the next advance finishes the run.
    pub ends_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsStudy,
}

impl Grade {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            Grade::Excellent
        } else if percentage >= PASS_PERCENT {
            Grade::Good
        } else if percentage >= 50 {
            Grade::Fair
        } else {
            Grade::NeedsStudy
        }
    }

    pub fn passed(self) -> bool {
        matches!(self, Grade::Excellent | Grade::Good)
    }

    pub fn message(self) -> &'static str {
        match self {
            Grade::Excellent => "Outstanding! A true history scholar.",
            Grade::Good => "Well done!",
            Grade::Fair => "Not bad at all.",
            Grade::NeedsStudy => "A little more study might help...",
        }
    }
}

/// `round(100 * score / total)`, halves rounding up.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * score + total) / (2 * total)) as u32
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSummary {
    Normal {
        genre_id: String,
        score: usize,
        total: usize,
        percentage: u32,
        grade: Grade,
        /// True only on the run that first cleared the genre.
        newly_cleared: bool,
    },
    Gauntlet {
        survived: usize,
        total: usize,
    },
}

impl SessionSummary {
    pub fn normal(genre_id: &str, score: usize, total: usize, newly_cleared: bool) -> Self {
        let percentage = percentage(score, total);
        SessionSummary::Normal {
            genre_id: genre_id.to_string(),
            score,
            total,
            percentage,
            grade: Grade::from_percentage(percentage),
            newly_cleared,
        }
    }

    pub fn passed(&self) -> bool {
        match self {
            SessionSummary::Normal { grade, .. } => grade.passed(),
            SessionSummary::Gauntlet { .. } => false,
        }
    }
}
