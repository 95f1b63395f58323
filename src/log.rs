//! Append-only action log.
//!
//! Every applied crane action becomes one line:
//!
//! ```text
//! 0 START <strategy_name> <width>
//! <t> ADD <id> <position>
//! <t> MOVE <id> <position>
//! <t> REMOVE <id>
//! <t> CASH <amount>
//! ```
//!
//! `CASH` follows every `REMOVE` and carries the cumulative cash after it.
//! Timestamps never decrease. The format is consumed by
//! [`replay`](crate::replay).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Tick, UnitId};

/// One log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Header, emitted once at time 0.
    Start { strategy: String, width: usize },
    /// Unit placed at `position`.
    Add {
        time: Tick,
        id: UnitId,
        position: usize,
    },
    /// Unit moved to `position`.
    Move {
        time: Tick,
        id: UnitId,
        position: usize,
    },
    /// Unit left the yard (delivered or expired).
    Remove { time: Tick, id: UnitId },
    /// Cumulative cash after the preceding removal.
    Cash { time: Tick, amount: u64 },
}

impl Action {
    /// Timestamp of the line.
    pub fn time(&self) -> Tick {
        match *self {
            Action::Start { .. } => 0,
            Action::Add { time, .. }
            | Action::Move { time, .. }
            | Action::Remove { time, .. }
            | Action::Cash { time, .. } => time,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start { strategy, width } => write!(f, "0 START {strategy} {width}"),
            Action::Add { time, id, position } => write!(f, "{time} ADD {id} {position}"),
            Action::Move { time, id, position } => write!(f, "{time} MOVE {id} {position}"),
            Action::Remove { time, id } => write!(f, "{time} REMOVE {id}"),
            Action::Cash { time, amount } => write!(f, "{time} CASH {amount}"),
        }
    }
}

/// A line that is not a valid action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActionParseError(String);

fn field<T: FromStr>(tokens: &[&str], index: usize, name: &str) -> Result<T, ActionParseError> {
    let raw = tokens
        .get(index)
        .ok_or_else(|| ActionParseError(format!("missing {name}")))?;
    raw.parse()
        .map_err(|_| ActionParseError(format!("invalid {name} '{raw}'")))
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let time: Tick = field(&tokens, 0, "timestamp")?;
        let kind = tokens
            .get(1)
            .ok_or_else(|| ActionParseError("missing action".into()))?;

        let (action, arity) = match *kind {
            "START" => {
                if time != 0 {
                    return Err(ActionParseError(format!(
                        "START must be at time 0, found {time}"
                    )));
                }
                let strategy = field::<String>(&tokens, 2, "strategy name")?;
                let width = field(&tokens, 3, "width")?;
                (Action::Start { strategy, width }, 4)
            }
            "ADD" => (
                Action::Add {
                    time,
                    id: field(&tokens, 2, "unit id")?,
                    position: field(&tokens, 3, "position")?,
                },
                4,
            ),
            "MOVE" => (
                Action::Move {
                    time,
                    id: field(&tokens, 2, "unit id")?,
                    position: field(&tokens, 3, "position")?,
                },
                4,
            ),
            "REMOVE" => (
                Action::Remove {
                    time,
                    id: field(&tokens, 2, "unit id")?,
                },
                3,
            ),
            "CASH" => (
                Action::Cash {
                    time,
                    amount: field(&tokens, 2, "amount")?,
                },
                3,
            ),
            other => return Err(ActionParseError(format!("unknown action '{other}'"))),
        };

        if tokens.len() != arity {
            return Err(ActionParseError(format!(
                "expected {arity} fields, found {}",
                tokens.len()
            )));
        }
        Ok(action)
    }
}

/// Failure writing or reading a log.
#[derive(Debug, Error)]
pub enum LogError {
    /// Underlying I/O failure.
    #[error("action log I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A line could not be parsed (1-based line number).
    #[error("action log line {line}: {source}")]
    Parse {
        line: usize,
        source: ActionParseError,
    },
}

/// Destination of logged actions.
pub trait ActionSink {
    /// Appends one action.
    fn record(&mut self, action: Action) -> Result<(), LogError>;
}

impl ActionSink for Vec<Action> {
    fn record(&mut self, action: Action) -> Result<(), LogError> {
        self.push(action);
        Ok(())
    }
}

impl<S: ActionSink + ?Sized> ActionSink for &mut S {
    fn record(&mut self, action: Action) -> Result<(), LogError> {
        (**self).record(action)
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ActionSink for NullSink {
    fn record(&mut self, _action: Action) -> Result<(), LogError> {
        Ok(())
    }
}

/// Writes actions as newline-terminated text lines.
#[derive(Debug)]
pub struct LogWriter<W: Write> {
    inner: W,
}

impl<W: Write> LogWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flushes and returns the inner writer.
    pub fn finish(mut self) -> Result<W, LogError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl LogWriter<BufWriter<File>> {
    /// Creates (truncating) a log file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ActionSink for LogWriter<W> {
    fn record(&mut self, action: Action) -> Result<(), LogError> {
        writeln!(self.inner, "{action}")?;
        Ok(())
    }
}

/// Parses a whole log. Blank lines are skipped.
pub fn read_actions<R: BufRead>(reader: R) -> Result<Vec<Action>, LogError> {
    let mut actions = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let action = line.parse().map_err(|source| LogError::Parse {
            line: index + 1,
            source,
        })?;
        actions.push(action);
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let start = Action::Start {
            strategy: "expert".into(),
            width: 35,
        };
        assert_eq!(start.to_string(), "0 START expert 35");
        assert_eq!(
            Action::Add {
                time: 3,
                id: 17,
                position: 4
            }
            .to_string(),
            "3 ADD 17 4"
        );
        assert_eq!(Action::Remove { time: 9, id: 2 }.to_string(), "9 REMOVE 2");
        assert_eq!(
            Action::Cash {
                time: 9,
                amount: 120
            }
            .to_string(),
            "9 CASH 120"
        );
    }

    #[test]
    fn test_parse_lines() {
        let a: Action = "12 MOVE 5 30".parse().unwrap();
        assert_eq!(
            a,
            Action::Move {
                time: 12,
                id: 5,
                position: 30
            }
        );
        assert_eq!(a.time(), 12);
        let s: Action = "0   START simple_strategy 20".parse().unwrap();
        assert_eq!(s.time(), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Action>().is_err());
        assert!("x ADD 1 2".parse::<Action>().is_err());
        assert!("1 JUMP 1".parse::<Action>().is_err());
        assert!("1 ADD 1".parse::<Action>().is_err());
        assert!("1 REMOVE 1 2".parse::<Action>().is_err());
        assert!("-1 CASH 3".parse::<Action>().is_err());
        assert!("5 START expert 35".parse::<Action>().is_err());
    }

    #[test]
    fn test_writer_and_reader() {
        let mut writer = LogWriter::new(Vec::new());
        let actions = vec![
            Action::Start {
                strategy: "expert".into(),
                width: 30,
            },
            Action::Add {
                time: 0,
                id: 1,
                position: 2,
            },
            Action::Remove { time: 1, id: 1 },
            Action::Cash { time: 1, amount: 8 },
        ];
        for a in &actions {
            writer.record(a.clone()).unwrap();
        }
        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "0 START expert 30\n0 ADD 1 2\n1 REMOVE 1\n1 CASH 8\n");

        let back = read_actions(text.as_bytes()).unwrap();
        assert_eq!(back, actions);
    }

    #[test]
    fn test_reader_reports_line() {
        let text = "0 START expert 30\n\n2 ADD one 3\n";
        match read_actions(text.as_bytes()) {
            Err(LogError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn push_one<S: ActionSink>(mut sink: S) {
            sink.record(Action::Remove { time: 0, id: 1 }).unwrap();
        }

        let mut store: Vec<Action> = Vec::new();
        push_one(&mut store);
        push_one(&mut store);
        assert_eq!(store.len(), 2);
    }
}
