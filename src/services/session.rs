use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::services::command_parser::parse_command;
use crate::services::contest_engine::ContestEngine;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub lines_read: u64,
    pub commands_executed: u64,
    pub parse_errors: u64,
    /// `END` was read. Anything after it is left unread.
    pub ended: bool,
}

/// Feeds every line of `reader` to the engine in order and writes the responses.
pub fn run_session<R, W>(
    engine: &mut ContestEngine,
    reader: R,
    mut writer: W,
) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    for line_result in reader.lines() {
        let line = line_result
            .with_context(|| format!("Failed to read input line {}", summary.lines_read + 1))?;
        summary.lines_read += 1;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                warn!("Skipping line {}: {}", summary.lines_read, err);
                summary.parse_errors += 1;
                continue;
            }
        };

        let response = engine.execute(command);
        summary.commands_executed += 1;
        for output in &response.lines {
            writeln!(writer, "{output}").context("Failed to write response")?;
        }

        if summary.lines_read.is_multiple_of(10_000) {
            debug!("Processed {} lines", summary.lines_read);
        }

        if response.terminate {
            summary.ended = true;
            break;
        }
    }

    writer.flush().context("Failed to flush responses")?;
    info!(
        "Session finished: {} lines, {} commands, {} skipped",
        summary.lines_read, summary.commands_executed, summary.parse_errors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const TRANSCRIPT_INPUT: &str = "\
ADDTEAM alpha
ADDTEAM beta
ADDTEAM gamma
ADDTEAM alpha
QUERY_RANKING gamma
START DURATION 300 PROBLEM 3
ADDTEAM delta
SUBMIT A BY alpha WITH Wrong_Answer AT 10
SUBMIT A BY alpha WITH Accepted AT 30
SUBMIT B BY beta WITH Accepted AT 20

SUBMIT A BY gamma WITH Accepted AT 60
FLUSH
QUERY_RANKING alpha
FREEZE
SUBMIT B BY alpha WITH Wrong_Answer AT 100
SUBMIT B BY alpha WITH Accepted AT 150
SUBMIT C BY gamma WITH Accepted AT 200
SUBMIT A BY beta WITH Time_Limit_Exceed AT 210
FREEZE
HELLO world
QUERY_RANKING alpha
QUERY_SUBMISSION alpha WHERE PROBLEM=ALL AND STATUS=ALL
QUERY_SUBMISSION beta WHERE PROBLEM=C AND STATUS=Accepted
SCROLL
QUERY_RANKING beta
SCROLL
QUERY_RANKING nobody
SUBMIT A BY beta WITH Accepted AT 250
SUBMIT D BY beta WITH Accepted AT 260
SUBMIT A BY nobody WITH Accepted AT 260
QUERY_SUBMISSION beta WHERE PROBLEM=A AND STATUS=ALL
END
ADDTEAM late
";

    const TRANSCRIPT_OUTPUT: &str = "\
[Info]Add successfully.
[Info]Add successfully.
[Info]Add successfully.
[Error]Add failed: duplicated team name.
[Info]Complete query ranking.
[gamma] NOW AT RANKING [3]
[Info]Competition starts.
[Error]Add failed: competition has started.
[Info]Flush scoreboard.
[Info]Complete query ranking.
[alpha] NOW AT RANKING [2]
[Info]Freeze scoreboard.
[Error]Freeze failed: scoreboard has been frozen.
[Info]Complete query ranking.
[Warning]Scoreboard is frozen. The ranking may be inaccurate until it were scrolled.
[alpha] NOW AT RANKING [2]
[Info]Complete query submission.
[alpha] [B] [Accepted] [150]
[Info]Complete query submission.
Cannot find any submission.
[Info]Scroll scoreboard.
beta 1 1 20 0/1 + 0/0
alpha 2 1 50 +1 0/2 0/0
gamma 3 1 60 + 0/0 0/1
gamma beta 2 260
alpha gamma 2 200
alpha 1 2 200 +1 + .
gamma 2 2 260 + . +
beta 3 1 20 . + .
[Info]Complete query ranking.
[beta] NOW AT RANKING [3]
[Error]Scroll failed: scoreboard has not been frozen.
[Error]Query ranking failed: cannot find the team.
[Info]Complete query submission.
[beta] [A] [Accepted] [250]
[Info]Competition ends.
";

    fn run(input: &str) -> (SessionSummary, String, ContestEngine) {
        let mut engine = ContestEngine::new("Accepted", 26);
        let mut output = Vec::new();
        let summary = run_session(&mut engine, Cursor::new(input), &mut output).unwrap();
        (summary, String::from_utf8(output).unwrap(), engine)
    }

    #[test]
    fn test_full_transcript() {
        let (summary, output, engine) = run(TRANSCRIPT_INPUT);
        assert_eq!(output, TRANSCRIPT_OUTPUT);

        assert_eq!(summary.lines_read, 33);
        assert_eq!(summary.parse_errors, 1);
        assert_eq!(summary.commands_executed, 31);
        assert!(summary.ended);
        assert_eq!(engine.state().teams.len(), 3);
    }

    #[test]
    fn test_ledger_keeps_every_accepted_submission() {
        let (_, _, engine) = run(TRANSCRIPT_INPUT);
        let state = engine.state();
        let beta = state.team(state.find_team("beta").unwrap());
        let times: Vec<i64> = beta.submissions.iter().map(|event| event.time).collect();
        assert_eq!(times, vec![20, 210, 250]);
    }

    #[test]
    fn test_transcript_is_deterministic() {
        let (_, first, _) = run(TRANSCRIPT_INPUT);
        let (_, second, _) = run(TRANSCRIPT_INPUT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_alias_commands() {
        let input = "\
register-team red
register-team blue
start-contest 120 2
submit A blue Accepted 15
submit B red Accepted 5
submit A red Presentation_Error 8
publish-ranking
query-rank blue
freeze-ranking
submit A red Accepted 90
scroll-ranking
query-submission red problem=A status=ALL
end-contest
";
        let (summary, output, _) = run(input);
        let expected = "\
[Info]Add successfully.
[Info]Add successfully.
[Info]Competition starts.
[Info]Flush scoreboard.
[Info]Complete query ranking.
[blue] NOW AT RANKING [2]
[Info]Freeze scoreboard.
[Info]Scroll scoreboard.
red 1 1 5 1/1 +
blue 2 1 15 + 0/0
red 1 2 115 +1 +
blue 2 1 15 + .
[Info]Complete query submission.
[red] [A] [Accepted] [90]
[Info]Competition ends.
";
        assert_eq!(output, expected);
        assert!(summary.ended);
    }

    #[test]
    fn test_freeze_publishes_current_ranking() {
        let input = "\
ADDTEAM zed
ADDTEAM amy
START DURATION 100 PROBLEM 1
SUBMIT A BY zed WITH Accepted AT 5
FREEZE
QUERY_RANKING zed
";
        let (_, output, _) = run(input);
        let expected = "\
[Info]Add successfully.
[Info]Add successfully.
[Info]Competition starts.
[Info]Freeze scoreboard.
[Info]Complete query ranking.
[Warning]Scoreboard is frozen. The ranking may be inaccurate until it were scrolled.
[zed] NOW AT RANKING [1]
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_input_without_end() {
        let (summary, output, _) = run("ADDTEAM solo\n");
        assert_eq!(output, "[Info]Add successfully.\n");
        assert_eq!(summary.lines_read, 1);
        assert!(!summary.ended);
    }
}
