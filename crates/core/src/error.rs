use thiserror::Error;

use crate::game::RevealError;
use crate::model::{ContentError, TourError};
use crate::progression::ProgressionError;

/// Any error raised by the domain layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Tour(#[from] TourError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Reveal(#[from] RevealError),
    #[error(transparent)]
    Content(#[from] ContentError),
}
