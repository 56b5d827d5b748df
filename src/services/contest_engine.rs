use tracing::{debug, info, warn};

use crate::error::{Action, ContestError, ContestResult, PhaseConflict};
use crate::models::{
    ContestPhase, ContestState, PROBLEM_LETTER_LIMIT, ProblemId, SubmissionEvent, TeamId,
};
use crate::services::command_parser::Command;
use crate::services::config_loader::FrostboardConfig;
use crate::services::present_flow::{self, ScrollReport};
use crate::services::scoreboard::{self, RankAnswer, SubmissionAnswer, SubmissionQuery};
use crate::services::{contest_processor, freeze_controller, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    ContestNotRunning,
    UnknownTeam,
    ProblemOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded { masked: bool },
    Ignored(IgnoreReason),
}

/// Output of one command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Response {
    pub lines: Vec<String>,
    /// No further commands are read.
    pub terminate: bool,
}

impl Response {
    fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            terminate: false,
        }
    }

    fn line(line: String) -> Self {
        Self::lines(vec![line])
    }
}

/// Owns the contest and applies commands to it in order.
#[derive(Debug)]
pub struct ContestEngine {
    state: ContestState,
    accepted_status: String,
    max_problems: usize,
}

impl ContestEngine {
    pub fn new(accepted_status: impl Into<String>, max_problems: usize) -> Self {
        Self {
            state: ContestState::new(),
            accepted_status: accepted_status.into(),
            max_problems: max_problems.min(PROBLEM_LETTER_LIMIT),
        }
    }

    pub fn from_config(config: &FrostboardConfig) -> Self {
        Self::new(config.accepted_status.clone(), config.max_problems)
    }

    pub fn state(&self) -> &ContestState {
        &self.state
    }

    fn ensure_running(&self, action: Action) -> ContestResult<()> {
        let conflict = match self.state.phase {
            ContestPhase::Running => return Ok(()),
            ContestPhase::Registration => PhaseConflict::NotStarted,
            ContestPhase::Ended => PhaseConflict::AlreadyEnded,
        };
        Err(ContestError::PrematureOperation { action, conflict })
    }

    fn ensure_registration_open(&self, action: Action) -> ContestResult<()> {
        if self.state.phase != ContestPhase::Registration {
            return Err(ContestError::PrematureOperation {
                action,
                conflict: PhaseConflict::AlreadyStarted,
            });
        }
        Ok(())
    }

    pub fn register_team(&mut self, name: &str) -> ContestResult<TeamId> {
        self.ensure_registration_open(Action::Add)?;
        if self.state.find_team(name).is_some() {
            return Err(ContestError::DuplicateRegistration {
                name: name.to_string(),
            });
        }

        let team_id = self.state.add_team(name);
        debug!("Registered team {} as {:?}", name, team_id);
        Ok(team_id)
    }

    pub fn start(&mut self, duration: i64, problem_count: usize) -> ContestResult<()> {
        self.ensure_registration_open(Action::Start)?;
        if problem_count == 0 || problem_count > self.max_problems {
            return Err(ContestError::InvalidProblemCount {
                requested: problem_count,
                max: self.max_problems,
            });
        }

        self.state.duration = duration;
        self.state.problem_count = problem_count;
        for team in &mut self.state.teams {
            team.open_problem_slots(problem_count);
        }
        self.state.phase = ContestPhase::Running;
        info!(
            "Contest started: {} teams, {} problems, duration {}",
            self.state.teams.len(),
            problem_count,
            duration
        );
        Ok(())
    }

    pub fn submit(&mut self, problem: &str, team: &str, status: &str, time: i64) -> SubmitOutcome {
        if self.state.phase != ContestPhase::Running {
            debug!("Ignoring submission of {} outside the running contest", team);
            return SubmitOutcome::Ignored(IgnoreReason::ContestNotRunning);
        }
        let Some(team_id) = self.state.find_team(team) else {
            warn!("Ignoring submission from unknown team {}", team);
            return SubmitOutcome::Ignored(IgnoreReason::UnknownTeam);
        };
        let Some(problem_id) = ProblemId::parse(problem, self.state.problem_count) else {
            warn!("Ignoring submission of {} for unknown problem {}", team, problem);
            return SubmitOutcome::Ignored(IgnoreReason::ProblemOutOfRange);
        };

        let frozen = self.state.is_frozen();
        let event = SubmissionEvent {
            problem: problem_id,
            status: status.to_string(),
            accepted: status == self.accepted_status,
            time,
        };
        let team = self.state.team_mut(team_id);
        team.record_submission(event, frozen);
        let masked = team.problem(problem_id).is_some_and(|state| state.masked);
        SubmitOutcome::Recorded { masked }
    }

    pub fn flush(&mut self) -> ContestResult<()> {
        self.ensure_running(Action::Flush)?;
        contest_processor::publish_ranking(&mut self.state);
        Ok(())
    }

    pub fn freeze(&mut self) -> ContestResult<usize> {
        self.ensure_running(Action::Freeze)?;
        freeze_controller::freeze(&mut self.state)
    }

    pub fn scroll(&mut self) -> ContestResult<ScrollReport> {
        self.ensure_running(Action::Scroll)?;
        present_flow::scroll(&mut self.state)
    }

    pub fn query_rank(&self, team: &str) -> ContestResult<RankAnswer> {
        scoreboard::query_rank(&self.state, team)
    }

    pub fn query_submission(
        &self,
        team: &str,
        query: &SubmissionQuery,
    ) -> ContestResult<SubmissionAnswer> {
        scoreboard::query_submission(&self.state, team, query)
    }

    pub fn end(&mut self) -> ContestResult<()> {
        self.ensure_running(Action::End)?;
        self.state.phase = ContestPhase::Ended;
        info!("Contest ended");
        Ok(())
    }

    /// Applies one command and renders its response lines.
    pub fn execute(&mut self, command: Command) -> Response {
        let result = match command {
            Command::AddTeam { name } => self
                .register_team(&name)
                .map(|_| Response::line(render::info("Add successfully."))),
            Command::Start {
                duration,
                problem_count,
            } => self
                .start(duration, problem_count)
                .map(|()| Response::line(render::info("Competition starts."))),
            Command::Submit {
                problem,
                team,
                status,
                time,
            } => {
                self.submit(&problem, &team, &status, time);
                Ok(Response::default())
            }
            Command::Flush => self
                .flush()
                .map(|()| Response::line(render::info("Flush scoreboard."))),
            Command::Freeze => self
                .freeze()
                .map(|_| Response::line(render::info("Freeze scoreboard."))),
            Command::Scroll => self
                .scroll()
                .map(|report| Response::lines(render::scroll_report(&report))),
            Command::QueryRanking { team } => self
                .query_rank(&team)
                .map(|answer| Response::lines(render::rank_answer(&answer))),
            Command::QuerySubmission { team, query } => self
                .query_submission(&team, &query)
                .map(|answer| Response::lines(render::submission_answer(&answer))),
            Command::End => {
                let mut response = match self.end() {
                    Ok(()) => Response::line(render::info("Competition ends.")),
                    Err(err) => {
                        warn!("{err}");
                        Response::line(render::error(&err))
                    }
                };
                response.terminate = true;
                Ok(response)
            }
        };

        result.unwrap_or_else(|err| {
            warn!("{err}");
            Response::line(render::error(&err))
        })
    }
}
