use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::bank::{Question, QuestionBank};
use crate::store::StoreError;
use crate::store::kv::KvStore;
use crate::store::schema::{
    CLEARED_GENRES_KEY, ClearedGenres, LedgerSnapshot, PLAYBACK_KEY, PlaybackPrefs,
    WRONG_ANSWERS_KEY, WrongAnswers,
};

/// Cleared-genre flags, missed questions and playback preferences.
///
/// Each map lives under its own key and is written on its own. There is no
/// transaction across keys, and persistence errors never reach the caller: the
/// in-memory copy stays authoritative for the rest of the run.
pub struct Ledger {
    store: Box<dyn KvStore>,
    cleared: ClearedGenres,
    wrong: WrongAnswers,
    playback: PlaybackPrefs,
}

impl Ledger {
    /// Read all keys once at startup. A missing or unreadable key falls back to
    /// its default without affecting the others.
    pub fn load(store: Box<dyn KvStore>) -> Self {
        let cleared = read_or_default::<ClearedGenres>(store.as_ref(), CLEARED_GENRES_KEY);
        let mut wrong = read_or_default::<WrongAnswers>(store.as_ref(), WRONG_ANSWERS_KEY);
        drop_malformed_misses(&mut wrong);
        let playback = read_or_default::<PlaybackPrefs>(store.as_ref(), PLAYBACK_KEY);
        info!(
            cleared = cleared.len(),
            wrong = wrong.values().map(Vec::len).sum::<usize>(),
            "ledger loaded"
        );
        Self {
            store,
            cleared,
            wrong,
            playback,
        }
    }

    pub fn cleared(&self) -> &ClearedGenres {
        &self.cleared
    }

    pub fn wrong_answers(&self) -> &WrongAnswers {
        &self.wrong
    }

    pub fn playback(&self) -> PlaybackPrefs {
        self.playback
    }

    pub fn is_cleared(&self, genre_id: &str) -> bool {
        self.cleared.get(genre_id).copied().unwrap_or(false)
    }

    /// True when the bank has genres and every one of them is cleared.
    pub fn all_cleared(&self, bank: &QuestionBank) -> bool {
        !bank.genres.is_empty() && bank.genres.iter().all(|g| self.is_cleared(&g.id))
    }

    pub fn total_wrong(&self) -> usize {
        self.wrong.values().map(Vec::len).sum()
    }

    /// Returns true only when the flag flips, which is also the only time it is
    /// written.
    pub fn mark_cleared(&mut self, genre_id: &str) -> bool {
        if self.is_cleared(genre_id) {
            return false;
        }
        self.cleared.insert(genre_id.to_string(), true);
        info!(genre = genre_id, "genre cleared");
        self.save_cleared();
        true
    }

    /// Marks a genre cleared without playing it.
    pub fn force_clear(&mut self, genre_id: &str) {
        self.cleared.insert(genre_id.to_string(), true);
        self.save_cleared();
    }

    /// Appends a missed question unless the genre already holds a duplicate.
    /// Returns whether it was inserted; duplicates cause no write.
    pub fn record_wrong(&mut self, genre_id: &str, question: &Question) -> bool {
        let list = self.wrong.entry(genre_id.to_string()).or_default();
        if list.iter().any(|q| q.same_as(question)) {
            debug!(genre = genre_id, "duplicate miss suppressed");
            return false;
        }
        list.push(question.clone());
        self.save_wrong();
        true
    }

    pub fn set_playback(&mut self, prefs: PlaybackPrefs) {
        self.playback = prefs;
        self.save_playback();
    }

    /// Empties both maps and writes both. Playback preferences survive.
    pub fn reset_all(&mut self) {
        self.cleared.clear();
        self.wrong.clear();
        self.save_cleared();
        self.save_wrong();
        info!("ledger reset");
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cleared_genres: self.cleared.clone(),
            wrong_answers: self.wrong.clone(),
            playback: self.playback,
        }
    }

    pub fn save_cleared(&self) {
        write_logged(self.store.as_ref(), CLEARED_GENRES_KEY, &self.cleared);
    }

    pub fn save_wrong(&self) {
        write_logged(self.store.as_ref(), WRONG_ANSWERS_KEY, &self.wrong);
    }

    pub fn save_playback(&self) {
        write_logged(self.store.as_ref(), PLAYBACK_KEY, &self.playback);
    }
}

fn read_or_default<T: DeserializeOwned + Default>(store: &dyn KvStore, key: &str) -> T {
    match read(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            warn!("{err}; starting with an empty value");
            T::default()
        }
    }
}

/// Stored misses that could never be answered would strand a gauntlet run.
fn drop_malformed_misses(wrong: &mut WrongAnswers) {
    for (genre, questions) in wrong.iter_mut() {
        let before = questions.len();
        questions.retain(Question::is_well_formed);
        let dropped = before - questions.len();
        if dropped > 0 {
            warn!(genre = %genre, dropped, "skipped malformed stored misses");
        }
    }
    wrong.retain(|_, questions| !questions.is_empty());
}

fn read<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })
}

fn write_logged<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            warn!(key, "could not serialize ledger entry: {err}");
            return;
        }
    };
    if let Err(err) = store.set(key, &json) {
        warn!("{err}; keeping in-memory state");
    }
}
