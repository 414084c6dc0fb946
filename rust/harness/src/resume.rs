//! Resumption coordinates: where a paused experiment picks up.

use std::io::{BufRead, Write};

use foldwise_config::Regime;
use serde::Serialize;

use crate::state::{Cell, ExperimentState, LedgerProbe, Suggestion};

/// The cell to continue at, and whether its short-budget regime still runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResumePoint {
    pub run: usize,
    pub fold: usize,
    pub run_short: bool,
}

impl ResumePoint {
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.run, self.fold)
    }

    pub fn validate(&self, runs: usize, folds: usize) -> Result<(), ResumeError> {
        if self.run >= runs {
            return Err(ResumeError::OutOfRange {
                field: "i",
                value: self.run,
                limit: runs,
            });
        }
        if self.fold >= folds {
            return Err(ResumeError::OutOfRange {
                field: "j",
                value: self.fold,
                limit: folds,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ResumePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "i = {}, j = {}, run_both = {}",
            self.run,
            self.fold,
            u8::from(self.run_short)
        )
    }
}

/// How resumption coordinates are obtained when the ledgers already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSource {
    /// Ask on the console.
    Prompt,
    /// Given up front (command line).
    Explicit(ResumePoint),
    /// Derived from the ledgers.
    Auto,
}

fn read_field<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: &'static str,
) -> Result<usize, ResumeError> {
    write!(output, "{field} = ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ResumeError::Missing(field));
    }
    let value = line.trim();
    value.parse().map_err(|_| ResumeError::Malformed {
        field,
        value: value.to_string(),
    })
}

/// Ask for `i`, `j` and `run_both` (0 or 1), one line each.
pub fn prompt_resume_point<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<ResumePoint, ResumeError> {
    writeln!(output, "Insert values to continue the experiments:")?;
    let run = read_field(input, output, "i")?;
    let fold = read_field(input, output, "j")?;
    let run_short = match read_field(input, output, "run_both")? {
        0 => false,
        1 => true,
        other => {
            return Err(ResumeError::Malformed {
                field: "run_both",
                value: other.to_string(),
            });
        }
    };
    Ok(ResumePoint {
        run,
        fold,
        run_short,
    })
}

/// Turn what the ledgers said into the starting state.
///
/// Returns `None` when the ledgers already cover every cell and the
/// coordinates came from them (`ResumeSource::Auto`).
pub fn resolve_state(
    probe: &LedgerProbe,
    source: ResumeSource,
    runs: usize,
    folds: usize,
    prompt: impl FnOnce() -> Result<ResumePoint, ResumeError>,
) -> Result<Option<ExperimentState>, ResumeError> {
    if *probe == LedgerProbe::Fresh {
        if let ResumeSource::Explicit(point) = source {
            tracing::warn!("Fresh start, ignoring resume coordinates ({point})");
        }
        return Ok(Some(ExperimentState::NotStarted));
    }

    let suggestion = probe.suggested_resume(runs, folds);
    let point = match source {
        ResumeSource::Explicit(point) => point,
        ResumeSource::Prompt => {
            match suggestion {
                Some(Suggestion::Resume(hint)) => tracing::info!("Ledgers suggest {hint}"),
                Some(Suggestion::Complete) => {
                    tracing::info!("Ledgers already hold every cell");
                }
                None => {}
            }
            prompt()?
        }
        ResumeSource::Auto => match suggestion {
            Some(Suggestion::Resume(point)) => point,
            Some(Suggestion::Complete) | None => return Ok(None),
        },
    };
    point.validate(runs, folds)?;
    check_against_ledgers(probe, suggestion, point, folds)?;
    tracing::info!("Resuming at {point}");
    Ok(Some(ExperimentState::Resuming(point)))
}

/// Refuse a point that would append a record for a cell already on disk.
fn check_against_ledgers(
    probe: &LedgerProbe,
    suggestion: Option<Suggestion>,
    point: ResumePoint,
    folds: usize,
) -> Result<(), ResumeError> {
    let next = match suggestion {
        Some(Suggestion::Resume(next)) => next.cell(),
        Some(Suggestion::Complete) => {
            return Err(ResumeError::AlreadyRecorded {
                requested: point.cell(),
                regime: Regime::Long,
            });
        }
        None => return Ok(()),
    };
    if point.cell().ordinal(folds) < next.ordinal(folds) {
        return Err(ResumeError::AlreadyRecorded {
            requested: point.cell(),
            regime: Regime::Long,
        });
    }
    if point.run_short
        && probe
            .records(Regime::Short)
            .iter()
            .any(|record| record.cell() == point.cell())
    {
        return Err(ResumeError::AlreadyRecorded {
            requested: point.cell(),
            regime: Regime::Short,
        });
    }
    Ok(())
}

/// Errors from reading or checking resumption coordinates.
#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    #[error("no value given for {0}")]
    Missing(&'static str),
    #[error("invalid value for {field}: '{value}'")]
    Malformed { field: &'static str, value: String },
    #[error("{field} = {value} is out of range (must be below {limit})")]
    OutOfRange {
        field: &'static str,
        value: usize,
        limit: usize,
    },
    #[error("cell {requested} already has a {regime} record; resuming there would duplicate it")]
    AlreadyRecorded { requested: Cell, regime: Regime },
    #[error("failed to read resume coordinates: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use test_case::test_case;

    use super::*;
    use crate::state::Record;

    fn prompt(text: &str) -> (Result<ResumePoint, ResumeError>, String) {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt_resume_point(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_prompt_reads_three_lines() {
        let (point, shown) = prompt("1\n4\n0\n");
        assert_eq!(
            point.unwrap(),
            ResumePoint {
                run: 1,
                fold: 4,
                run_short: false
            }
        );
        assert!(shown.ends_with("i = j = run_both = "));
    }

    #[test_case("1\n" => matches Err(ResumeError::Missing("j")) ; "eof")]
    #[test_case("x\n0\n1\n" => matches Err(ResumeError::Malformed { field: "i", .. }) ; "garbage")]
    #[test_case("-1\n0\n1\n" => matches Err(ResumeError::Malformed { field: "i", .. }) ; "negative")]
    #[test_case("0\n0\n2\n" => matches Err(ResumeError::Malformed { field: "run_both", .. }) ; "run_both not a flag")]
    fn test_prompt_rejects(text: &str) -> Result<ResumePoint, ResumeError> {
        prompt(text).0
    }

    #[test]
    fn test_validate_range() {
        let point = ResumePoint {
            run: 3,
            fold: 0,
            run_short: true,
        };
        assert!(matches!(
            point.validate(3, 10),
            Err(ResumeError::OutOfRange { field: "i", .. })
        ));
        assert!(point.validate(4, 10).is_ok());
    }

    #[test]
    fn test_fresh_ignores_coordinates() {
        let explicit = ResumeSource::Explicit(ResumePoint {
            run: 2,
            fold: 5,
            run_short: false,
        });
        let state = resolve_state(&LedgerProbe::Fresh, explicit, 3, 10, || {
            panic!("must not prompt on a fresh start")
        })
        .unwrap();
        assert_eq!(state, Some(ExperimentState::NotStarted));
    }

    #[test]
    fn test_auto_resume() {
        let probe = LedgerProbe::Existing {
            short: vec![record(0, 0), record(0, 1)],
            long: vec![record(0, 0)],
        };
        let state = resolve_state(&probe, ResumeSource::Auto, 3, 10, || unreachable!()).unwrap();
        assert_eq!(
            state,
            Some(ExperimentState::Resuming(ResumePoint {
                run: 0,
                fold: 1,
                run_short: false
            }))
        );

        let done = LedgerProbe::Existing {
            short: vec![record(0, 1)],
            long: vec![record(0, 1)],
        };
        assert_eq!(
            resolve_state(&done, ResumeSource::Auto, 1, 2, || unreachable!()).unwrap(),
            None
        );
    }

    fn record(run: usize, fold: usize) -> Record {
        Record {
            run,
            fold,
            accuracy: 0.9,
            mse: 0.1,
        }
    }

    fn explicit(run: usize, fold: usize, run_short: bool) -> ResumeSource {
        ResumeSource::Explicit(ResumePoint {
            run,
            fold,
            run_short,
        })
    }

    #[test]
    fn test_explicit_point_before_last_record_is_rejected() {
        // (0, 0) and (0, 1) done, short of (0, 2) recorded
        let probe = LedgerProbe::Existing {
            short: vec![record(0, 0), record(0, 1), record(0, 2)],
            long: vec![record(0, 0), record(0, 1)],
        };
        let resolve = |source| resolve_state(&probe, source, 2, 5, || unreachable!());

        assert!(matches!(
            resolve(explicit(0, 1, false)),
            Err(ResumeError::AlreadyRecorded {
                regime: Regime::Long,
                ..
            })
        ));
        assert!(matches!(
            resolve(explicit(0, 2, true)),
            Err(ResumeError::AlreadyRecorded {
                regime: Regime::Short,
                ..
            })
        ));
        assert!(resolve(explicit(0, 2, false)).is_ok());
        assert!(resolve(explicit(0, 3, true)).is_ok());
    }

    #[test]
    fn test_explicit_point_on_complete_ledgers_is_rejected() {
        let probe = LedgerProbe::Existing {
            short: vec![record(0, 0), record(0, 1)],
            long: vec![record(0, 0), record(0, 1)],
        };
        let result = resolve_state(&probe, explicit(0, 0, true), 1, 2, || unreachable!());
        assert!(matches!(
            result,
            Err(ResumeError::AlreadyRecorded {
                requested: Cell { run: 0, fold: 0 },
                regime: Regime::Long
            })
        ));
    }

    #[test]
    fn test_prompted_point_is_validated() {
        let probe = LedgerProbe::Existing {
            short: vec![],
            long: vec![],
        };
        let result = resolve_state(&probe, ResumeSource::Prompt, 3, 10, || {
            Ok(ResumePoint {
                run: 0,
                fold: 10,
                run_short: true,
            })
        });
        assert!(matches!(
            result,
            Err(ResumeError::OutOfRange { field: "j", .. })
        ));
    }
}
