use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::bank::{Question, QuestionBank};
use crate::session::QuizError;
use crate::session::gauntlet::build_gauntlet_set;
use crate::session::result::{AnswerFeedback, SessionSummary};
use crate::store::ledger::Ledger;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMode {
    Normal { genre_id: String },
    Gauntlet,
}

impl SessionMode {
    pub fn is_gauntlet(&self) -> bool {
        matches!(self, SessionMode::Gauntlet)
    }
}

#[derive(Clone, Debug)]
enum Phase {
    Question,
    Feedback(AnswerFeedback),
    Complete(SessionSummary),
}

/// One quiz run. The question list is a snapshot, independent of the bank and
/// the ledger.
#[derive(Clone, Debug)]
struct Session {
    mode: SessionMode,
    questions: Vec<Question>,
    index: usize,
    score: usize,
    phase: Phase,
}

/// Externally observable state of the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InProgress {
        position: usize,
        score: usize,
        total: usize,
    },
    AwaitingAdvance(AnswerFeedback),
    Complete(SessionSummary),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::InProgress { .. } => "in progress",
            SessionState::AwaitingAdvance(_) => "awaiting advance",
            SessionState::Complete(_) => "complete",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Next { position: usize },
    Complete(SessionSummary),
}

/// Owns the question bank, the ledger and at most one active session.
pub struct SessionController {
    bank: QuestionBank,
    ledger: Ledger,
    session: Option<Session>,
    rng: SmallRng,
}

impl SessionController {
    pub fn new(bank: QuestionBank, ledger: Ledger) -> Self {
        Self {
            bank,
            ledger,
            session: None,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Starts a run over one genre, questions in bank order. Any previous
    /// session is discarded, even when the start fails.
    pub fn start_normal(&mut self, genre_id: &str) -> Result<(), QuizError> {
        self.session = None;
        let genre = self
            .bank
            .genre(genre_id)
            .ok_or_else(|| QuizError::GenreNotFound(genre_id.to_string()))?;
        if genre.questions.is_empty() {
            return Err(QuizError::EmptyGenre(genre_id.to_string()));
        }

        info!(genre = genre_id, questions = genre.questions.len(), "session started");
        self.session = Some(Session {
            mode: SessionMode::Normal {
                genre_id: genre_id.to_string(),
            },
            questions: genre.questions.clone(),
            index: 0,
            score: 0,
            phase: Phase::Question,
        });
        Ok(())
    }

    /// Starts a run over every recorded miss, shuffled.
    pub fn start_gauntlet(&mut self) -> Result<(), QuizError> {
        self.session = None;
        if self.ledger.total_wrong() == 0 {
            return Err(QuizError::NoGauntletMaterial);
        }
        let questions = build_gauntlet_set(self.ledger.wrong_answers(), &mut self.rng);

        info!(questions = questions.len(), "gauntlet started");
        self.session = Some(Session {
            mode: SessionMode::Gauntlet,
            questions,
            index: 0,
            score: 0,
            phase: Phase::Question,
        });
        Ok(())
    }

    /// Restarts the current mode from scratch.
    pub fn retry(&mut self) -> Result<(), QuizError> {
        let mode = self
            .session
            .as_ref()
            .map(|s| s.mode.clone())
            .ok_or(QuizError::InvalidTransition {
                op: "retry",
                state: SessionState::Idle.name(),
            })?;
        match mode {
            SessionMode::Normal { genre_id } => self.start_normal(&genre_id),
            SessionMode::Gauntlet => self.start_gauntlet(),
        }
    }

    pub fn submit_answer(&mut self, selected: usize) -> Result<AnswerFeedback, QuizError> {
        let state_name = self.state().name();
        let session = self
            .session
            .as_mut()
            .filter(|s| matches!(s.phase, Phase::Question))
            .ok_or(QuizError::InvalidTransition {
                op: "submit_answer",
                state: state_name,
            })?;

        let question = &session.questions[session.index];
        if selected >= question.choices.len() {
            return Err(QuizError::ChoiceOutOfRange {
                selected,
                available: question.choices.len(),
            });
        }

        let correct = question.is_correct(selected);
        let feedback = AnswerFeedback {
            correct,
            selected,
            correct_index: question.correct_index,
            explanation: question.explanation.clone(),
            ends_run: !correct && session.mode.is_gauntlet(),
        };
        debug!(position = session.index, selected, correct, "answer submitted");

        if correct {
            session.score += 1;
        } else if let SessionMode::Normal { genre_id } = &session.mode {
            self.ledger.record_wrong(genre_id, question);
        }

        session.phase = Phase::Feedback(feedback.clone());
        Ok(feedback)
    }

    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        let state_name = self.state().name();
        let session = self
            .session
            .as_mut()
            .ok_or(QuizError::InvalidTransition {
                op: "advance",
                state: state_name,
            })?;
        let ends_run = match &session.phase {
            Phase::Feedback(feedback) => feedback.ends_run,
            _ => {
                return Err(QuizError::InvalidTransition {
                    op: "advance",
                    state: state_name,
                });
            }
        };

        session.index += 1;
        if ends_run || session.index >= session.questions.len() {
            return Ok(Advance::Complete(finish(session, &mut self.ledger)));
        }
        session.phase = Phase::Question;
        Ok(Advance::Next {
            position: session.index,
        })
    }

    /// Drops the session from any state. The ledger is left alone.
    pub fn reset(&mut self) {
        self.session = None;
    }

    pub fn state(&self) -> SessionState {
        match &self.session {
            None => SessionState::Idle,
            Some(s) => match &s.phase {
                Phase::Question => SessionState::InProgress {
                    position: s.index,
                    score: s.score,
                    total: s.questions.len(),
                },
                Phase::Feedback(feedback) => SessionState::AwaitingAdvance(feedback.clone()),
                Phase::Complete(summary) => SessionState::Complete(summary.clone()),
            },
        }
    }

    /// The question being asked or just answered.
    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref()?;
        match session.phase {
            Phase::Complete(_) => None,
            _ => session.questions.get(session.index),
        }
    }

    pub fn mode(&self) -> Option<&SessionMode> {
        self.session.as_ref().map(|s| &s.mode)
    }

    pub fn position(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.index)
    }

    pub fn score(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.score)
    }

    pub fn total(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.questions.len())
    }
}

fn finish(session: &mut Session, ledger: &mut Ledger) -> SessionSummary {
    let total = session.questions.len();
    let summary = match &session.mode {
        SessionMode::Normal { genre_id } => {
            let provisional = SessionSummary::normal(genre_id, session.score, total, false);
            let newly_cleared = provisional.passed() && ledger.mark_cleared(genre_id);
            SessionSummary::normal(genre_id, session.score, total, newly_cleared)
        }
        SessionMode::Gauntlet => SessionSummary::Gauntlet {
            survived: session.score,
            total,
        },
    };
    info!(?summary, "session complete");
    session.phase = Phase::Complete(summary.clone());
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Genre;
    use crate::session::result::Grade;
    use crate::store::kv::MemoryKvStore;

    fn q(text: &str, correct: usize) -> Question {
        Question {
            id: 0,
            text: text.to_string(),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: correct,
            explanation: format!("about {text}"),
        }
    }

    fn bank() -> QuestionBank {
        QuestionBank {
            genres: vec![
                Genre {
                    id: "meiji".into(),
                    name: "Meiji".into(),
                    description: String::new(),
                    questions: vec![q("m1", 0), q("m2", 1), q("m3", 2)],
                },
                Genre {
                    id: "empty".into(),
                    name: "Empty".into(),
                    description: String::new(),
                    questions: Vec::new(),
                },
            ],
        }
    }

    fn controller() -> (MemoryKvStore, SessionController) {
        let store = MemoryKvStore::new();
        let ledger = Ledger::load(Box::new(store.clone()));
        (store, SessionController::new(bank(), ledger).with_rng_seed(3))
    }

    #[test]
    fn start_normal_snapshots_in_order() {
        let (_, mut c) = controller();
        c.start_normal("meiji").unwrap();
        assert_eq!(
            c.state(),
            SessionState::InProgress {
                position: 0,
                score: 0,
                total: 3
            }
        );
        assert_eq!(c.current_question().unwrap().text, "m1");
    }

    #[test]
    fn unknown_and_empty_genres_leave_idle() {
        let (_, mut c) = controller();
        c.start_normal("meiji").unwrap();
        assert_eq!(
            c.start_normal("nope"),
            Err(QuizError::GenreNotFound("nope".into()))
        );
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(
            c.start_normal("empty"),
            Err(QuizError::EmptyGenre("empty".into()))
        );
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn submit_outside_question_phase_is_rejected() {
        let (_, mut c) = controller();
        assert!(matches!(
            c.submit_answer(0),
            Err(QuizError::InvalidTransition { .. })
        ));
        c.start_normal("meiji").unwrap();
        c.submit_answer(0).unwrap();
        assert!(matches!(
            c.submit_answer(0),
            Err(QuizError::InvalidTransition { .. })
        ));
        assert_eq!(c.score(), 1);
    }

    #[test]
    fn out_of_range_choice_changes_nothing() {
        let (store, mut c) = controller();
        c.start_normal("meiji").unwrap();
        assert_eq!(
            c.submit_answer(9),
            Err(QuizError::ChoiceOutOfRange {
                selected: 9,
                available: 4
            })
        );
        assert!(matches!(c.state(), SessionState::InProgress { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn advance_requires_feedback() {
        let (_, mut c) = controller();
        c.start_normal("meiji").unwrap();
        assert!(matches!(
            c.advance(),
            Err(QuizError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn full_run_scores_correct_answers() {
        let (_, mut c) = controller();
        c.start_normal("meiji").unwrap();

        assert!(c.submit_answer(0).unwrap().correct);
        assert_eq!(c.advance().unwrap(), Advance::Next { position: 1 });
        assert!(!c.submit_answer(0).unwrap().correct);
        assert_eq!(c.advance().unwrap(), Advance::Next { position: 2 });
        assert!(c.submit_answer(2).unwrap().correct);

        match c.advance().unwrap() {
            Advance::Complete(SessionSummary::Normal {
                score,
                total,
                percentage,
                grade,
                newly_cleared,
                ..
            }) => {
                assert_eq!((score, total, percentage), (2, 3, 67));
                assert_eq!(grade, Grade::Fair);
                assert!(!newly_cleared);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!c.ledger().is_cleared("meiji"));
        assert_eq!(c.ledger().wrong_answers()["meiji"].len(), 1);
        assert!(c.current_question().is_none());
    }

    #[test]
    fn second_pass_does_not_reclear() {
        let (store, mut c) = controller();
        for round in 0..2 {
            c.start_normal("meiji").unwrap();
            for answer in [0, 1, 2] {
                c.submit_answer(answer).unwrap();
                c.advance().unwrap();
            }
            match c.state() {
                SessionState::Complete(SessionSummary::Normal { newly_cleared, .. }) => {
                    assert_eq!(newly_cleared, round == 0);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(c.ledger().is_cleared("meiji"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn gauntlet_without_material_fails() {
        let (_, mut c) = controller();
        assert_eq!(c.start_gauntlet(), Err(QuizError::NoGauntletMaterial));
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn gauntlet_ends_on_first_miss_without_recording() {
        let (_, mut c) = controller();
        c.start_normal("meiji").unwrap();
        for _ in 0..3 {
            c.submit_answer(3).unwrap();
            c.advance().unwrap();
        }
        let before = c.ledger().wrong_answers().clone();
        assert_eq!(c.ledger().total_wrong(), 3);

        c.start_gauntlet().unwrap();
        assert_eq!(c.mode(), Some(&SessionMode::Gauntlet));
        assert_eq!(c.total(), 3);

        let first = c.current_question().unwrap().clone();
        let fb = c.submit_answer(first.correct_index).unwrap();
        assert!(!fb.ends_run);
        c.advance().unwrap();

        let second = c.current_question().unwrap().clone();
        let wrong = (second.correct_index + 1) % second.choices.len();
        let fb = c.submit_answer(wrong).unwrap();
        assert!(fb.ends_run);
        assert_eq!(fb.explanation, second.explanation);
        assert!(matches!(c.state(), SessionState::AwaitingAdvance(_)));

        assert_eq!(
            c.advance().unwrap(),
            Advance::Complete(SessionSummary::Gauntlet {
                survived: 1,
                total: 3
            })
        );
        assert_eq!(c.ledger().wrong_answers(), &before);
        assert!(!c.ledger().cleared().contains_key("meiji"));
    }

    #[test]
    fn retry_restarts_same_genre() {
        let (_, mut c) = controller();
        assert!(c.retry().is_err());
        c.start_normal("meiji").unwrap();
        c.submit_answer(0).unwrap();
        c.retry().unwrap();
        assert_eq!(c.position(), 0);
        assert_eq!(c.score(), 0);
        assert_eq!(
            c.mode(),
            Some(&SessionMode::Normal {
                genre_id: "meiji".into()
            })
        );
    }

    #[test]
    fn reset_returns_to_idle_and_keeps_ledger() {
        let (_, mut c) = controller();
        c.start_normal("meiji").unwrap();
        c.submit_answer(3).unwrap();
        c.reset();
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.ledger().total_wrong(), 1);
        assert_eq!(c.total(), 0);
    }
}
