//! Text of the response lines.

use crate::error::ContestError;
use crate::services::present_flow::ScrollReport;
use crate::services::scoreboard::{RankAnswer, SubmissionAnswer};

pub const FROZEN_RANK_WARNING: &str =
    "Scoreboard is frozen. The ranking may be inaccurate until it were scrolled.";
pub const NO_SUBMISSION: &str = "Cannot find any submission.";

pub fn info(message: &str) -> String {
    format!("[Info]{message}")
}

pub fn warning(message: &str) -> String {
    format!("[Warning]{message}")
}

pub fn error(err: &ContestError) -> String {
    format!("[Error]{err}")
}

pub fn rank_answer(answer: &RankAnswer) -> Vec<String> {
    let mut lines = vec![info("Complete query ranking.")];
    if answer.frozen {
        lines.push(warning(FROZEN_RANK_WARNING));
    }
    lines.push(format!("[{}] NOW AT RANKING [{}]", answer.team, answer.rank));
    lines
}

pub fn submission_answer(answer: &SubmissionAnswer) -> Vec<String> {
    let result = match &answer.submission {
        Some(event) => format!(
            "[{}] [{}] [{}] [{}]",
            answer.team, event.problem, event.status, event.time
        ),
        None => NO_SUBMISSION.to_string(),
    };
    vec![info("Complete query submission."), result]
}

/// Before board, change records, after board.
pub fn scroll_report(report: &ScrollReport) -> Vec<String> {
    let mut lines =
        Vec::with_capacity(1 + report.before.len() + report.changes.len() + report.after.len());
    lines.push(info("Scroll scoreboard."));
    lines.extend(report.before.iter().map(ToString::to_string));
    lines.extend(report.changes.iter().map(ToString::to_string));
    lines.extend(report.after.iter().map(ToString::to_string));
    lines
}
