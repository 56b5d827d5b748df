use std::fmt;

use crate::error::{Action, ContestError, ContestResult};
use crate::models::{ContestState, ProblemState, SubmissionEvent, TeamId};

/// What one scoreboard cell shows for a team and problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemCell {
    Masked { wrong_before: u32, after_freeze: u32 },
    Solved { wrong_before: u32 },
    Unsolved { wrong_before: u32 },
}

impl From<&ProblemState> for ProblemCell {
    fn from(state: &ProblemState) -> Self {
        if state.masked {
            Self::Masked {
                wrong_before: state.wrong_before,
                after_freeze: state.submissions_after_freeze,
            }
        } else if state.is_solved() {
            Self::Solved {
                wrong_before: state.wrong_before,
            }
        } else {
            Self::Unsolved {
                wrong_before: state.wrong_before,
            }
        }
    }
}

impl fmt::Display for ProblemCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Masked {
                wrong_before,
                after_freeze,
            } => write!(f, "{wrong_before}/{after_freeze}"),
            Self::Solved { wrong_before: 0 } => f.write_str("+"),
            Self::Solved { wrong_before } => write!(f, "+{wrong_before}"),
            Self::Unsolved { wrong_before: 0 } => f.write_str("."),
            Self::Unsolved { wrong_before } => write!(f, "-{wrong_before}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardRow {
    pub team: String,
    pub rank: usize,
    pub solved_count: u32,
    pub penalty_time: i64,
    pub cells: Vec<ProblemCell>,
}

impl fmt::Display for ScoreboardRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.team, self.rank, self.solved_count, self.penalty_time
        )?;
        for cell in &self.cells {
            write!(f, " {cell}")?;
        }
        Ok(())
    }
}

/// Rows of the live ranking. Standings must have been refreshed since the last mutation.
pub fn project(state: &ContestState) -> Vec<ScoreboardRow> {
    state
        .live_ranking
        .as_slice()
        .iter()
        .enumerate()
        .map(|(position, team_id)| {
            let team = state.team(*team_id);
            let standing = team.standing();
            ScoreboardRow {
                team: team.name.clone(),
                rank: position + 1,
                solved_count: standing.solved_count,
                penalty_time: standing.penalty_time,
                cells: team.problems.iter().map(ProblemCell::from).collect(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAnswer {
    pub team: String,
    pub rank: usize,
    /// Hidden results may still move this rank.
    pub frozen: bool,
}

/// Rank from the last published ranking, or by name if nothing was published yet.
pub fn query_rank(state: &ContestState, name: &str) -> ContestResult<RankAnswer> {
    let team_id = state
        .find_team(name)
        .ok_or_else(|| ContestError::UnknownTeam {
            action: Action::QueryRanking,
            name: name.to_string(),
        })?;

    let rank = state
        .flushed_ranking
        .as_ref()
        .and_then(|snapshot| snapshot.rank_of(team_id))
        .unwrap_or_else(|| alphabetical_rank(state, team_id));

    Ok(RankAnswer {
        team: name.to_string(),
        rank,
        frozen: state.is_frozen(),
    })
}

fn alphabetical_rank(state: &ContestState, team_id: TeamId) -> usize {
    let name = &state.team(team_id).name;
    1 + state
        .teams
        .iter()
        .filter(|team| team.name.as_str() < name.as_str())
        .count()
}

/// `ALL` or one exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Any,
    Exact(String),
}

impl Selector {
    pub const WILDCARD: &'static str = "ALL";

    pub fn parse(raw: &str) -> Self {
        if raw == Self::WILDCARD {
            Self::Any
        } else {
            Self::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuery {
    pub problem: Selector,
    pub status: Selector,
}

impl SubmissionQuery {
    fn matches(&self, event: &SubmissionEvent) -> bool {
        self.problem.matches(&event.problem.to_string()) && self.status.matches(&event.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAnswer {
    pub team: String,
    pub submission: Option<SubmissionEvent>,
}

/// Most recent ledger event matching the query, masked or not.
pub fn query_submission(
    state: &ContestState,
    name: &str,
    query: &SubmissionQuery,
) -> ContestResult<SubmissionAnswer> {
    let team_id = state
        .find_team(name)
        .ok_or_else(|| ContestError::UnknownTeam {
            action: Action::QuerySubmission,
            name: name.to_string(),
        })?;

    let submission = state
        .team(team_id)
        .submissions
        .iter()
        .rev()
        .find(|event| query.matches(event))
        .cloned();

    Ok(SubmissionAnswer {
        team: name.to_string(),
        submission,
    })
}
