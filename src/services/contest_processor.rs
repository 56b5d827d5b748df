use std::cmp::Ordering;

use tracing::{debug, info};

use crate::models::{ContestState, RankingSnapshot, Standing, Team, TeamId, WRONG_ATTEMPT_PENALTY};

/// Solved count and penalty from the problems the ranking may see. Masked
/// problems never contribute, whatever is queued behind them.
pub fn compute_standing(team: &Team) -> Standing {
    let mut solve_times_desc = Vec::new();
    let mut penalty_time: i64 = 0;
    for state in &team.problems {
        if let Some(solved_time) = state.visible_solve_time() {
            let wrong_penalty = WRONG_ATTEMPT_PENALTY.saturating_mul(i64::from(state.wrong_before));
            penalty_time = penalty_time
                .saturating_add(wrong_penalty)
                .saturating_add(solved_time);
            solve_times_desc.push(solved_time);
        }
    }
    solve_times_desc.sort_unstable_by(|a, b| b.cmp(a));

    Standing {
        solved_count: solve_times_desc.len() as u32,
        penalty_time,
        solve_times_desc,
    }
}

pub fn recompute_team(team: &mut Team) {
    let standing = compute_standing(team);
    team.set_standing(standing);
}

/// Contest order, best team first. Both standings must be fresh.
pub fn compare_teams(a: &Team, b: &Team) -> Ordering {
    let (sa, sb) = (a.standing(), b.standing());
    // More solved problems first
    sb.solved_count
        .cmp(&sa.solved_count)
        // Then less penalty
        .then_with(|| sa.penalty_time.cmp(&sb.penalty_time))
        // Then the faster slowest solve, element by element. Lengths are equal here.
        .then_with(|| sa.solve_times_desc.cmp(&sb.solve_times_desc))
        .then_with(|| a.name.cmp(&b.name))
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Team {}

impl PartialOrd for Team {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Team {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_teams(self, other)
    }
}

pub fn build_ranking(teams: &[Team]) -> RankingSnapshot {
    let mut order: Vec<TeamId> = (0..teams.len()).map(TeamId).collect();
    order.sort_by(|a, b| teams[a.0].cmp(&teams[b.0]));
    RankingSnapshot::from_order(order)
}

/// Recomputes every team and rebuilds the live ranking from scratch.
pub fn refresh_live_ranking(state: &mut ContestState) {
    for team in &mut state.teams {
        recompute_team(team);
    }
    state.live_ranking = build_ranking(&state.teams);

    for (position, team_id) in state.live_ranking.as_slice().iter().enumerate() {
        let standing = state.team(*team_id).standing();
        debug!(
            "Rank {:0>3} Solved {} Penalty {} TeamName: {}",
            position + 1,
            standing.solved_count,
            standing.penalty_time,
            state.team(*team_id).name
        );
    }
}

/// Refreshes the live ranking and makes it the one rank queries answer from.
pub fn publish_ranking(state: &mut ContestState) {
    refresh_live_ranking(state);
    state.flushed_ranking = Some(state.live_ranking.clone());
    info!("Published ranking of {} teams", state.teams.len());
}
