use tracing::{debug, info};

use crate::error::{ContestError, ContestResult};
use crate::models::{ContestState, FreezeState, Team};
use crate::services::contest_processor;

/// Publishes the ranking as it stands, then hides every unsolved problem of
/// every team from it. Returns the number of masked problem slots.
pub fn freeze(state: &mut ContestState) -> ContestResult<usize> {
    if state.freeze == FreezeState::Frozen {
        return Err(ContestError::AlreadyFrozen);
    }

    contest_processor::publish_ranking(state);
    let masked: usize = state.teams.iter_mut().map(Team::mask_unsolved).sum();
    state.freeze = FreezeState::Frozen;
    info!("Scoreboard frozen, {} problem slots masked", masked);
    Ok(masked)
}

pub fn ensure_frozen(state: &ContestState) -> ContestResult<()> {
    if state.freeze != FreezeState::Frozen {
        return Err(ContestError::NotFrozen);
    }
    Ok(())
}

/// Back to `Active`. Only the scroll calls this, once nothing is masked.
pub fn thaw(state: &mut ContestState) {
    debug_assert!(
        !state.teams.iter().any(Team::has_masked_problem),
        "thaw with masked problems left"
    );
    state.freeze = FreezeState::Active;
    debug!("Freeze state: Frozen -> Active");
}
