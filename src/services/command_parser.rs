//! Line protocol. Both the judge keyword form (`SUBMIT A BY team WITH Accepted AT 30`)
//! and the short alias form (`submit A team Accepted 30`) are accepted.

use std::str::{FromStr, SplitWhitespace};

use crate::services::scoreboard::{Selector, SubmissionQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTeam {
        name: String,
    },
    Start {
        duration: i64,
        problem_count: usize,
    },
    Submit {
        problem: String,
        team: String,
        status: String,
        time: i64,
    },
    Flush,
    Freeze,
    Scroll,
    QueryRanking {
        team: String,
    },
    QuerySubmission {
        team: String,
        query: SubmissionQuery,
    },
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` is missing its {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("`{command}` expected `{expected}` but found `{found}`")]
    UnexpectedToken {
        command: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("`{command}` {argument} is not a valid number: `{value}`")]
    InvalidNumber {
        command: &'static str,
        argument: &'static str,
        value: String,
    },
}

struct Tokens<'a> {
    command: &'static str,
    words: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(command: &'static str, words: SplitWhitespace<'a>) -> Self {
        Self { command, words }
    }

    fn next(&mut self, argument: &'static str) -> Result<&'a str, ParseError> {
        self.words.next().ok_or(ParseError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn keyword(&mut self, expected: &'static str) -> Result<(), ParseError> {
        let found = self.next(expected)?;
        if found != expected {
            return Err(ParseError::UnexpectedToken {
                command: self.command,
                expected,
                found: found.to_string(),
            });
        }
        Ok(())
    }

    fn number<T: FromStr>(&mut self, argument: &'static str) -> Result<T, ParseError> {
        let raw = self.next(argument)?;
        raw.parse().map_err(|_| ParseError::InvalidNumber {
            command: self.command,
            argument,
            value: raw.to_string(),
        })
    }

    /// `KEY=value`, key compared case-insensitively.
    fn assignment(&mut self, key: &'static str) -> Result<&'a str, ParseError> {
        let raw = self.next(key)?;
        match raw.split_once('=') {
            Some((found_key, value)) if found_key.eq_ignore_ascii_case(key) && !value.is_empty() => {
                Ok(value)
            }
            _ => Err(ParseError::UnexpectedToken {
                command: self.command,
                expected: key,
                found: raw.to_string(),
            }),
        }
    }
}

/// Parses one input line. Blank lines give `Ok(None)`; trailing words are ignored.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head {
        "ADDTEAM" | "register-team" => {
            let mut tokens = Tokens::new("ADDTEAM", words);
            Command::AddTeam {
                name: tokens.next("team name")?.to_string(),
            }
        }
        "START" => {
            let mut tokens = Tokens::new("START", words);
            tokens.keyword("DURATION")?;
            let duration = tokens.number("duration")?;
            tokens.keyword("PROBLEM")?;
            let problem_count = tokens.number("problem count")?;
            Command::Start {
                duration,
                problem_count,
            }
        }
        "start-contest" => {
            let mut tokens = Tokens::new("start-contest", words);
            Command::Start {
                duration: tokens.number("duration")?,
                problem_count: tokens.number("problem count")?,
            }
        }
        "SUBMIT" => {
            let mut tokens = Tokens::new("SUBMIT", words);
            let problem = tokens.next("problem")?.to_string();
            tokens.keyword("BY")?;
            let team = tokens.next("team name")?.to_string();
            tokens.keyword("WITH")?;
            let status = tokens.next("status")?.to_string();
            tokens.keyword("AT")?;
            let time = tokens.number("time")?;
            Command::Submit {
                problem,
                team,
                status,
                time,
            }
        }
        "submit" => {
            let mut tokens = Tokens::new("submit", words);
            Command::Submit {
                problem: tokens.next("problem")?.to_string(),
                team: tokens.next("team name")?.to_string(),
                status: tokens.next("status")?.to_string(),
                time: tokens.number("time")?,
            }
        }
        "FLUSH" | "publish-ranking" => Command::Flush,
        "FREEZE" | "freeze-ranking" => Command::Freeze,
        "SCROLL" | "scroll-ranking" => Command::Scroll,
        "QUERY_RANKING" | "query-rank" => {
            let mut tokens = Tokens::new("QUERY_RANKING", words);
            Command::QueryRanking {
                team: tokens.next("team name")?.to_string(),
            }
        }
        "QUERY_SUBMISSION" => {
            let mut tokens = Tokens::new("QUERY_SUBMISSION", words);
            let team = tokens.next("team name")?.to_string();
            tokens.keyword("WHERE")?;
            let problem = tokens.assignment("PROBLEM")?;
            tokens.keyword("AND")?;
            let status = tokens.assignment("STATUS")?;
            Command::QuerySubmission {
                team,
                query: SubmissionQuery {
                    problem: Selector::parse(problem),
                    status: Selector::parse(status),
                },
            }
        }
        "query-submission" => {
            let mut tokens = Tokens::new("query-submission", words);
            let team = tokens.next("team name")?.to_string();
            let problem = tokens.assignment("problem")?;
            let status = tokens.assignment("status")?;
            Command::QuerySubmission {
                team,
                query: SubmissionQuery {
                    problem: Selector::parse(problem),
                    status: Selector::parse(status),
                },
            }
        }
        "END" | "end-contest" => Command::End,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}
