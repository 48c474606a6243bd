use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bank::Question;

pub const CLEARED_GENRES_KEY: &str = "clearedGenres";
pub const WRONG_ANSWERS_KEY: &str = "wrongAnswers";
pub const PLAYBACK_KEY: &str = "playback";

pub type ClearedGenres = BTreeMap<String, bool>;
pub type WrongAnswers = BTreeMap<String, Vec<Question>>;

/// Preferences for the audio layer. Only persisted here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackPrefs {
    #[serde(default)]
    pub music: bool,
    #[serde(default = "default_true")]
    pub effects: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlaybackPrefs {
    fn default() -> Self {
        Self {
            music: false,
            effects: true,
        }
    }
}

/// Both ledger maps, for dumping from the command line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub cleared_genres: ClearedGenres,
    pub wrong_answers: WrongAnswers,
    pub playback: PlaybackPrefs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_defaults_from_partial_document() {
        let prefs: PlaybackPrefs = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, PlaybackPrefs::default());

        let prefs: PlaybackPrefs = serde_json::from_str(r#"{"music":true}"#).unwrap();
        assert!(prefs.music);
        assert!(prefs.effects);
    }
}
