use std::collections::HashMap;
use std::fmt;

use tracing::error;

/// Minutes charged for every rejected attempt made before the first accepted one.
pub const WRONG_ATTEMPT_PENALTY: i64 = 20;

/// Problems are labelled `A`, `B`, ... so at most this many slots exist.
pub const PROBLEM_LETTER_LIMIT: usize = 26;

/// Key into [`ContestState::teams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(pub usize);

/// Problem slot, `A` is slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProblemId(u8);

impl ProblemId {
    pub fn from_index(index: usize) -> Option<Self> {
        (index < PROBLEM_LETTER_LIMIT).then_some(Self(index as u8))
    }

    /// Parses a single upper-case letter that falls inside the first `problem_count` slots.
    pub fn parse(label: &str, problem_count: usize) -> Option<Self> {
        let mut chars = label.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let index = usize::from(letter as u8 - b'A');
        if index >= problem_count {
            return None;
        }
        Self::from_index(index)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn letter(self) -> char {
        char::from(b'A' + self.0)
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEvent {
    pub problem: ProblemId,
    pub status: String,
    /// Whether `status` is the accepted label the engine was configured with.
    pub accepted: bool,
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemState {
    /// Rejected attempts before the first accepted one. Never touched while masked.
    pub wrong_before: u32,
    pub solved_time: Option<i64>,
    pub submissions_after_freeze: u32,
    /// The real result is hidden from the ranking until the scroll reveals it.
    pub masked: bool,
}

impl ProblemState {
    pub fn is_solved(&self) -> bool {
        self.solved_time.is_some()
    }

    /// Solve time of a result the ranking is allowed to see.
    pub fn visible_solve_time(&self) -> Option<i64> {
        if self.masked { None } else { self.solved_time }
    }
}

/// Derived ranking inputs, recomputed from unmasked problem states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standing {
    pub solved_count: u32,
    pub penalty_time: i64,
    /// Solve times of visible solved problems, slowest first.
    pub solve_times_desc: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub problems: Vec<ProblemState>,
    pub submissions: Vec<SubmissionEvent>,
    standing: Standing,
    standing_stale: bool,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            problems: Vec::new(),
            submissions: Vec::new(),
            standing: Standing::default(),
            standing_stale: false,
        }
    }

    pub fn open_problem_slots(&mut self, problem_count: usize) {
        self.problems = vec![ProblemState::default(); problem_count];
        self.standing_stale = true;
    }

    pub fn problem(&self, problem: ProblemId) -> Option<&ProblemState> {
        self.problems.get(problem.index())
    }

    /// Appends the event to the ledger and applies it to the problem state.
    ///
    /// While `frozen`, unsolved problems only count the submission; the verdict
    /// stays in the ledger until [`Team::unmask`] re-derives it.
    pub fn record_submission(&mut self, event: SubmissionEvent, frozen: bool) {
        let problem = event.problem;
        let accepted = event.accepted;
        let time = event.time;
        self.submissions.push(event);
        self.standing_stale = true;

        let Some(state) = self.problems.get_mut(problem.index()) else {
            error!(
                "Team {} has no slot for problem {}, submission kept in ledger only",
                self.name, problem
            );
            return;
        };

        if state.is_solved() {
            return;
        }

        if frozen {
            if state.masked {
                state.submissions_after_freeze += 1;
            } else {
                state.masked = true;
                state.submissions_after_freeze = 1;
            }
        } else if accepted {
            state.solved_time = Some(time);
        } else {
            state.wrong_before += 1;
        }
    }

    /// Masks every problem that is not solved yet. Returns how many were masked.
    pub fn mask_unsolved(&mut self) -> usize {
        let mut masked = 0;
        for state in self.problems.iter_mut().filter(|state| !state.is_solved()) {
            state.masked = true;
            // Counts this freeze only
            state.submissions_after_freeze = 0;
            masked += 1;
        }
        if masked > 0 {
            self.standing_stale = true;
        }
        masked
    }

    pub fn has_masked_problem(&self) -> bool {
        self.problems.iter().any(|state| state.masked)
    }

    pub fn first_masked_problem(&self) -> Option<ProblemId> {
        self.problems
            .iter()
            .position(|state| state.masked)
            .and_then(ProblemId::from_index)
    }

    /// Reveals a masked problem from the ledger: the earliest accepted event decides
    /// the solve time. Rejections received while masked are not charged.
    /// Returns whether the problem ends up solved.
    pub fn unmask(&mut self, problem: ProblemId) -> bool {
        let first_accepted = self
            .submissions
            .iter()
            .find(|event| event.problem == problem && event.accepted)
            .map(|event| event.time);

        let Some(state) = self.problems.get_mut(problem.index()) else {
            return false;
        };
        if !state.masked {
            return state.is_solved();
        }

        state.masked = false;
        if let Some(time) = first_accepted {
            state.solved_time = Some(time);
        }
        self.standing_stale = true;
        state.is_solved()
    }

    /// Last ranking inputs computed for this team.
    pub fn standing(&self) -> &Standing {
        debug_assert!(
            !self.standing_stale,
            "standing of team {} read before recomputation",
            self.name
        );
        &self.standing
    }

    pub fn set_standing(&mut self, standing: Standing) {
        self.standing = standing;
        self.standing_stale = false;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContestPhase {
    #[default]
    Registration,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FreezeState {
    #[default]
    Active,
    Frozen,
}

/// Total order of teams at one point in time, best team first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingSnapshot {
    order: Vec<TeamId>,
}

impl RankingSnapshot {
    pub fn from_order(order: Vec<TeamId>) -> Self {
        Self { order }
    }

    pub fn as_slice(&self) -> &[TeamId] {
        &self.order
    }

    pub fn position(&self, team_id: TeamId) -> Option<usize> {
        self.order.iter().position(|id| *id == team_id)
    }

    /// 1-based rank.
    pub fn rank_of(&self, team_id: TeamId) -> Option<usize> {
        self.position(team_id).map(|position| position + 1)
    }

    pub fn get(&self, position: usize) -> Option<TeamId> {
        self.order.get(position).copied()
    }
}

/// The whole mutable contest, owned by the engine.
#[derive(Debug, Default)]
pub struct ContestState {
    pub phase: ContestPhase,
    pub duration: i64,
    pub problem_count: usize,
    pub freeze: FreezeState,
    pub teams: Vec<Team>,
    pub team_ids: HashMap<String, TeamId>,
    pub live_ranking: RankingSnapshot,
    /// Last explicitly published ranking, `None` until the first publish.
    pub flushed_ranking: Option<RankingSnapshot>,
}

impl ContestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_team(&mut self, name: &str) -> TeamId {
        let team_id = TeamId(self.teams.len());
        self.teams.push(Team::new(name));
        self.team_ids.insert(name.to_string(), team_id);
        team_id
    }

    pub fn find_team(&self, name: &str) -> Option<TeamId> {
        self.team_ids.get(name).copied()
    }

    pub fn team(&self, team_id: TeamId) -> &Team {
        &self.teams[team_id.0]
    }

    pub fn team_mut(&mut self, team_id: TeamId) -> &mut Team {
        &mut self.teams[team_id.0]
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze == FreezeState::Frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(problem: usize, status: &str, time: i64) -> SubmissionEvent {
        SubmissionEvent {
            problem: ProblemId::from_index(problem).unwrap(),
            status: status.to_string(),
            accepted: status == "Accepted",
            time,
        }
    }

    fn team_with_slots(count: usize) -> Team {
        let mut team = Team::new("alpha");
        team.open_problem_slots(count);
        team
    }

    #[test]
    fn test_problem_id_parse() {
        assert_eq!(ProblemId::parse("A", 3).map(ProblemId::index), Some(0));
        assert_eq!(ProblemId::parse("C", 3).map(ProblemId::letter), Some('C'));
        assert!(ProblemId::parse("D", 3).is_none());
        assert!(ProblemId::parse("a", 3).is_none());
        assert!(ProblemId::parse("AB", 3).is_none());
        assert!(ProblemId::parse("", 3).is_none());
    }

    #[test]
    fn test_wrong_then_accepted() {
        let mut team = team_with_slots(2);
        team.record_submission(event(0, "Wrong_Answer", 10), false);
        team.record_submission(event(0, "Accepted", 30), false);

        let state = &team.problems[0];
        assert_eq!(state.solved_time, Some(30));
        assert_eq!(state.wrong_before, 1);
        assert!(!state.masked);
    }

    #[test]
    fn test_submissions_after_solve_are_logged_only() {
        let mut team = team_with_slots(1);
        team.record_submission(event(0, "Accepted", 30), false);
        team.record_submission(event(0, "Wrong_Answer", 40), false);
        team.record_submission(event(0, "Accepted", 50), true);

        let state = &team.problems[0];
        assert_eq!(state.solved_time, Some(30));
        assert_eq!(state.wrong_before, 0);
        assert_eq!(state.submissions_after_freeze, 0);
        assert!(!state.masked);
        assert_eq!(team.submissions.len(), 3);
    }

    #[test]
    fn test_frozen_submission_masks_problem() {
        let mut team = team_with_slots(2);
        team.record_submission(event(1, "Wrong_Answer", 100), false);
        team.record_submission(event(1, "Accepted", 150), true);
        team.record_submission(event(1, "Wrong_Answer", 160), true);

        let state = &team.problems[1];
        assert!(state.masked);
        assert_eq!(state.submissions_after_freeze, 2);
        assert_eq!(state.wrong_before, 1);
        assert_eq!(state.solved_time, None);
    }

    #[test]
    fn test_mask_unsolved_skips_solved() {
        let mut team = team_with_slots(3);
        team.record_submission(event(1, "Accepted", 20), false);

        assert_eq!(team.mask_unsolved(), 2);
        assert!(team.problems[0].masked);
        assert!(!team.problems[1].masked);
        assert!(team.problems[2].masked);
        assert_eq!(team.first_masked_problem(), ProblemId::from_index(0));
    }

    #[test]
    fn test_second_freeze_restarts_submission_count() {
        let mut team = team_with_slots(1);
        team.mask_unsolved();
        team.record_submission(event(0, "Wrong_Answer", 100), true);
        assert_eq!(team.problems[0].submissions_after_freeze, 1);
        assert!(!team.unmask(ProblemId::from_index(0).unwrap()));

        team.mask_unsolved();
        let state = &team.problems[0];
        assert!(state.masked);
        assert_eq!(state.submissions_after_freeze, 0);
    }

    #[test]
    fn test_unmask_uses_earliest_accepted() {
        let mut team = team_with_slots(1);
        team.record_submission(event(0, "Wrong_Answer", 5), false);
        team.mask_unsolved();
        team.record_submission(event(0, "Wrong_Answer", 100), true);
        team.record_submission(event(0, "Accepted", 120), true);
        team.record_submission(event(0, "Accepted", 140), true);

        let problem = ProblemId::from_index(0).unwrap();
        assert!(team.unmask(problem));
        let state = &team.problems[0];
        assert!(!state.masked);
        assert_eq!(state.solved_time, Some(120));
        assert_eq!(state.wrong_before, 1);
    }

    #[test]
    fn test_unmask_without_accept_stays_unsolved() {
        let mut team = team_with_slots(1);
        team.mask_unsolved();
        team.record_submission(event(0, "Time_Limit_Exceed", 100), true);

        assert!(!team.unmask(ProblemId::from_index(0).unwrap()));
        assert!(!team.has_masked_problem());
        assert_eq!(team.problems[0].wrong_before, 0);
    }

    #[test]
    fn test_ranking_snapshot_lookup() {
        let snapshot = RankingSnapshot::from_order(vec![TeamId(2), TeamId(0), TeamId(1)]);
        assert_eq!(snapshot.position(TeamId(0)), Some(1));
        assert_eq!(snapshot.rank_of(TeamId(1)), Some(3));
        assert_eq!(snapshot.get(0), Some(TeamId(2)));
        assert_eq!(snapshot.rank_of(TeamId(7)), None);
    }
}
