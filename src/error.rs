//! Contest errors. Every variant is reported as one `[Error]` line and leaves the
//! contest untouched.

use std::fmt;

/// Command an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Start,
    Flush,
    Freeze,
    Scroll,
    QueryRanking,
    QuerySubmission,
    End,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "Add",
            Self::Start => "Start",
            Self::Flush => "Flush",
            Self::Freeze => "Freeze",
            Self::Scroll => "Scroll",
            Self::QueryRanking => "Query ranking",
            Self::QuerySubmission => "Query submission",
            Self::End => "End",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseConflict {
    AlreadyStarted,
    NotStarted,
    AlreadyEnded,
}

impl fmt::Display for PhaseConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AlreadyStarted => "competition has started",
            Self::NotStarted => "competition has not started",
            Self::AlreadyEnded => "competition has ended",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContestError {
    #[error("{action} failed: {conflict}.")]
    PrematureOperation {
        action: Action,
        conflict: PhaseConflict,
    },

    #[error("Add failed: duplicated team name.")]
    DuplicateRegistration { name: String },

    #[error("{action} failed: cannot find the team.")]
    UnknownTeam { action: Action, name: String },

    #[error("Freeze failed: scoreboard has been frozen.")]
    AlreadyFrozen,

    #[error("Scroll failed: scoreboard has not been frozen.")]
    NotFrozen,

    #[error("Start failed: problem count must be between 1 and {max}.")]
    InvalidProblemCount { requested: usize, max: usize },
}

pub type ContestResult<T> = Result<T, ContestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ContestError::PrematureOperation {
            action: Action::Add,
            conflict: PhaseConflict::AlreadyStarted,
        };
        assert_eq!(err.to_string(), "Add failed: competition has started.");

        let err = ContestError::UnknownTeam {
            action: Action::QuerySubmission,
            name: "ghost".to_string(),
        };
        assert_eq!(err.to_string(), "Query submission failed: cannot find the team.");

        assert_eq!(
            ContestError::NotFrozen.to_string(),
            "Scroll failed: scoreboard has not been frozen."
        );
        assert_eq!(
            ContestError::InvalidProblemCount {
                requested: 30,
                max: 26
            }
            .to_string(),
            "Start failed: problem count must be between 1 and 26."
        );
    }
}
