pub mod controller;
pub mod gauntlet;
pub mod result;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("genre {0} was not found")]
    GenreNotFound(String),
    #[error("genre {0} has no questions")]
    EmptyGenre(String),
    #[error("no missed questions to build a gauntlet from")]
    NoGauntletMaterial,
    #[error("{op} is not allowed while {state}")]
    InvalidTransition { op: &'static str, state: &'static str },
    #[error("choice {selected} is out of range for {available} choices")]
    ChoiceOutOfRange { selected: usize, available: usize },
}
