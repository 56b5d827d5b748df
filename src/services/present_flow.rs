use std::fmt;

use tracing::{debug, info};

use crate::error::ContestResult;
use crate::models::{ContestState, ProblemId, RankingSnapshot, TeamId};
use crate::services::scoreboard::{self, ScoreboardRow};
use crate::services::{contest_processor, freeze_controller};

/// A reveal that moved a team up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankChange {
    pub team: String,
    /// Team that held the new position right before the reveal.
    pub passed: String,
    pub solved_count: u32,
    pub penalty_time: i64,
}

impl fmt::Display for RankChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.team, self.passed, self.solved_count, self.penalty_time
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    pub before: Vec<ScoreboardRow>,
    pub changes: Vec<RankChange>,
    pub after: Vec<ScoreboardRow>,
    pub reveals: usize,
}

/// Reveals every masked problem, lowest ranked team first and smallest letter
/// first, re-ranking after each one. Ends with the scoreboard unfrozen and the
/// final ranking published.
pub fn scroll(state: &mut ContestState) -> ContestResult<ScrollReport> {
    freeze_controller::ensure_frozen(state)?;

    contest_processor::publish_ranking(state);
    let before = scoreboard::project(state);

    let mut changes = Vec::new();
    let mut reveals = 0;
    while let Some((team_id, problem_id)) = find_next_reveal(state) {
        let previous = state.live_ranking.clone();
        let solved = state.team_mut(team_id).unmask(problem_id);
        reveals += 1;
        contest_processor::refresh_live_ranking(state);
        debug!(
            "Revealed problem {} of {}: {}",
            problem_id,
            state.team(team_id).name,
            if solved { "solved" } else { "unsolved" }
        );

        if let Some(change) = detect_rank_change(state, &previous, team_id) {
            debug!(
                "{} passed {}, now {} solved {} penalty",
                change.team, change.passed, change.solved_count, change.penalty_time
            );
            changes.push(change);
        }
    }

    freeze_controller::thaw(state);
    contest_processor::publish_ranking(state);
    let after = scoreboard::project(state);

    info!(
        "Scroll finished: {} reveals, {} rank changes",
        reveals,
        changes.len()
    );

    Ok(ScrollReport {
        before,
        changes,
        after,
        reveals,
    })
}

fn find_last_pending_index(state: &ContestState) -> Option<usize> {
    state
        .live_ranking
        .as_slice()
        .iter()
        .rposition(|team_id| state.team(*team_id).has_masked_problem())
}

fn find_next_reveal(state: &ContestState) -> Option<(TeamId, ProblemId)> {
    let position = find_last_pending_index(state)?;
    let team_id = state.live_ranking.get(position)?;
    let problem_id = state.team(team_id).first_masked_problem()?;
    Some((team_id, problem_id))
}

fn detect_rank_change(
    state: &ContestState,
    previous: &RankingSnapshot,
    team_id: TeamId,
) -> Option<RankChange> {
    let old_position = previous.position(team_id)?;
    let new_position = state.live_ranking.position(team_id)?;
    if new_position >= old_position {
        return None;
    }

    let passed = previous.get(new_position)?;
    let team = state.team(team_id);
    let standing = team.standing();
    Some(RankChange {
        team: team.name.clone(),
        passed: state.team(passed).name.clone(),
        solved_count: standing.solved_count,
        penalty_time: standing.penalty_time,
    })
}
