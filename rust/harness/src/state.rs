//! Run-state ledgers and experiment state.
//!
//! Each regime appends one record per completed (run, fold) cell to its own
//! plain-text ledger. The ledgers are the only durable checkpoint: if either
//! is missing the experiment starts over, otherwise it is paused and needs
//! resumption coordinates.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use foldwise_config::Regime;
use fs2::FileExt;
use serde::Serialize;

use crate::{config::HarnessConfig, resume::ResumePoint};

/// Header line written once at the top of every ledger.
pub const HEADER: &str = "i,\tj,\tacc,\tmse\n";

/// A (run, fold) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell {
    pub run: usize,
    pub fold: usize,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { run: 0, fold: 0 };

    #[must_use]
    pub fn new(run: usize, fold: usize) -> Self {
        Self { run, fold }
    }

    /// The cell executed after this one.
    #[must_use]
    pub fn next(self, folds: usize) -> Self {
        if self.fold + 1 >= folds {
            Self::new(self.run + 1, 0)
        } else {
            Self::new(self.run, self.fold + 1)
        }
    }

    /// Position in execution order.
    #[must_use]
    pub fn ordinal(self, folds: usize) -> usize {
        self.run * folds + self.fold
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.run, self.fold)
    }
}

/// One ledger line as read back from disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    pub run: usize,
    pub fold: usize,
    /// Human-readable accuracy (the scorer's value negated).
    pub accuracy: f64,
    pub mse: f64,
}

impl Record {
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.run, self.fold)
    }
}

/// Format a record line; `score` is the scorer's (negated) accuracy.
#[must_use]
pub fn format_record(cell: Cell, score: f64, mse: f64) -> String {
    format!("{},\t{},\t{:.4},\t{:.4}\n", cell.run, cell.fold, -score, mse)
}

/// Parse ledger text into records. The header must be intact and every line,
/// including the last, must be complete.
pub fn parse_records(path: &Path, content: &str) -> Result<Vec<Record>, LedgerError> {
    let parse_err = |line: usize, msg: String| LedgerError::Parse {
        path: path.to_path_buf(),
        line,
        msg,
    };

    let Some(body) = content.strip_prefix(HEADER) else {
        return Err(parse_err(1, "missing or damaged header".into()));
    };
    if !body.is_empty() && !body.ends_with('\n') {
        return Err(parse_err(
            content.lines().count(),
            "final record is incomplete".into(),
        ));
    }

    body.lines()
        .enumerate()
        .map(|(i, line)| {
            let line_no = i + 2;
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let &[run, fold, accuracy, mse] = fields.as_slice() else {
                return Err(parse_err(
                    line_no,
                    format!("expected 4 fields, found {}", fields.len()),
                ));
            };
            let bad = |name: &str, value: &str| parse_err(line_no, format!("bad {name} '{value}'"));
            Ok(Record {
                run: run.parse().map_err(|_| bad("run", run))?,
                fold: fold.parse().map_err(|_| bad("fold", fold))?,
                accuracy: accuracy.parse().map_err(|_| bad("accuracy", accuracy))?,
                mse: mse.parse().map_err(|_| bad("mse", mse))?,
            })
        })
        .collect()
}

/// Read a ledger without locking it. An empty file has no records.
pub fn read_records(path: &Path) -> Result<Vec<Record>, LedgerError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| LedgerError::Io(path.to_path_buf(), e))?;
    if content.is_empty() {
        return Ok(Vec::new());
    }
    parse_records(path, &content)
}

/// An open, exclusively locked, append-only ledger file.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    file: File,
}

impl Ledger {
    fn lock(path: &Path, file: &File) -> Result<(), LedgerError> {
        file.try_lock_exclusive()
            .map_err(|e| LedgerError::Lock(path.to_path_buf(), e))
    }

    /// Create (or truncate) the ledger and write the header.
    fn create(path: &Path) -> Result<Self, LedgerError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LedgerError::Io(path.to_path_buf(), e))?;
        // Truncate only once the lock is held.
        Self::lock(path, &file)?;
        file.set_len(0)
            .map_err(|e| LedgerError::Io(path.to_path_buf(), e))?;

        let mut ledger = Self {
            path: path.to_path_buf(),
            file,
        };
        ledger.write_durable(HEADER)?;
        Ok(ledger)
    }

    /// Open an existing ledger for appending and read back its records.
    fn open_existing(path: &Path) -> Result<(Self, Vec<Record>), LedgerError> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| LedgerError::Io(path.to_path_buf(), e))?;
        Self::lock(path, &file)?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| LedgerError::Io(path.to_path_buf(), e))?;

        let mut ledger = Self {
            path: path.to_path_buf(),
            file,
        };
        if content.is_empty() {
            // Killed between creating the file and writing its header.
            tracing::warn!("{} is empty, writing header", path.display());
            ledger.write_durable(HEADER)?;
            return Ok((ledger, Vec::new()));
        }
        let records = parse_records(path, &content)?;
        Ok((ledger, records))
    }

    fn write_durable(&mut self, text: &str) -> Result<(), LedgerError> {
        let io = |e| LedgerError::Io(self.path.clone(), e);
        self.file.write_all(text.as_bytes()).map_err(io)?;
        self.file.flush().map_err(io)?;
        self.file.sync_data().map_err(io)
    }

    /// Append one record and force it to storage before returning.
    pub fn append(&mut self, cell: Cell, score: f64, mse: f64) -> Result<(), LedgerError> {
        self.write_durable(&format_record(cell, score, mse))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What the ledgers said when the harness started.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerProbe {
    /// At least one ledger was missing; both now hold only the header.
    Fresh,
    /// Both ledgers existed.
    Existing {
        short: Vec<Record>,
        long: Vec<Record>,
    },
}

/// Where the ledgers say the experiment left off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Suggestion {
    Resume(ResumePoint),
    Complete,
}

impl LedgerProbe {
    /// Read both ledgers without creating, locking or modifying anything.
    pub fn inspect(short: &Path, long: &Path) -> Result<Self, LedgerError> {
        if !short.exists() || !long.exists() {
            return Ok(Self::Fresh);
        }
        Ok(Self::Existing {
            short: read_records(short)?,
            long: read_records(long)?,
        })
    }

    #[must_use]
    pub fn records(&self, regime: Regime) -> &[Record] {
        match (self, regime) {
            (Self::Fresh, _) => &[],
            (Self::Existing { short, .. }, Regime::Short) => short,
            (Self::Existing { long, .. }, Regime::Long) => long,
        }
    }

    /// The cell after the last long-budget record, and whether the short
    /// regime still has to run on it. `None` for a fresh start.
    #[must_use]
    pub fn suggested_resume(&self, runs: usize, folds: usize) -> Option<Suggestion> {
        let Self::Existing { short, long } = self else {
            return None;
        };
        let next = long
            .last()
            .map_or(Cell::ORIGIN, |record| record.cell().next(folds));
        if next.run >= runs {
            return Some(Suggestion::Complete);
        }
        let run_short = !short.iter().any(|record| record.cell() == next);
        Some(Suggestion::Resume(ResumePoint {
            run: next.run,
            fold: next.fold,
            run_short,
        }))
    }
}

/// The two regime ledgers, owned by the orchestrator.
#[derive(Debug)]
pub struct LedgerPair {
    short: Ledger,
    long: Ledger,
}

impl LedgerPair {
    /// Open both ledgers. If either is absent, both are (re)created with just
    /// the header; otherwise both are opened for appending.
    pub fn open(short: &Path, long: &Path) -> Result<(Self, LedgerProbe), LedgerError> {
        for path in [short, long] {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .map_err(|e| LedgerError::Io(parent.to_path_buf(), e))?;
            }
        }

        let (short_exists, long_exists) = (short.exists(), long.exists());
        if short_exists && long_exists {
            let (short, short_records) = Ledger::open_existing(short)?;
            let (long, long_records) = Ledger::open_existing(long)?;
            tracing::info!(
                "Found ledgers with {} short / {} long records",
                short_records.len(),
                long_records.len()
            );
            return Ok((
                Self { short, long },
                LedgerProbe::Existing {
                    short: short_records,
                    long: long_records,
                },
            ));
        }

        for (path, exists) in [(short, short_exists), (long, long_exists)] {
            if exists {
                tracing::warn!(
                    "Discarding {}: its partner ledger is missing, starting fresh",
                    path.display()
                );
            }
        }
        let pair = Self {
            short: Ledger::create(short)?,
            long: Ledger::create(long)?,
        };
        tracing::info!(
            "Created ledgers {} and {}",
            pair.short.path().display(),
            pair.long.path().display()
        );
        Ok((pair, LedgerProbe::Fresh))
    }

    /// Open the ledgers named by `config`.
    pub fn open_for(config: &HarnessConfig) -> Result<(Self, LedgerProbe), LedgerError> {
        Self::open(
            &config.ledger_path(Regime::Short),
            &config.ledger_path(Regime::Long),
        )
    }

    pub fn get_mut(&mut self, regime: Regime) -> &mut Ledger {
        match regime {
            Regime::Short => &mut self.short,
            Regime::Long => &mut self.long,
        }
    }

    pub fn append(
        &mut self,
        regime: Regime,
        cell: Cell,
        score: f64,
        mse: f64,
    ) -> Result<(), LedgerError> {
        self.get_mut(regime).append(cell, score, mse)
    }
}

/// Where the experiment stands, computed once from the ledgers and then
/// threaded through the orchestrator as plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// Nothing recorded yet; start at the origin with both regimes.
    NotStarted,
    /// Paused; continue at the given point.
    Resuming(ResumePoint),
    /// At least one cell completed in this process.
    InProgress { last: Cell },
}

impl ExperimentState {
    /// The next cell to execute.
    #[must_use]
    pub fn start(&self, folds: usize) -> Cell {
        match self {
            Self::NotStarted => Cell::ORIGIN,
            Self::Resuming(point) => point.cell(),
            Self::InProgress { last } => last.next(folds),
        }
    }

    /// Whether the short-budget regime runs on the next cell.
    #[must_use]
    pub fn short_enabled(&self) -> bool {
        match self {
            Self::Resuming(point) => point.run_short,
            Self::NotStarted | Self::InProgress { .. } => true,
        }
    }

    /// Record that `completed` finished; from here on both regimes run.
    #[must_use]
    pub fn advance(self, completed: Cell) -> Self {
        Self::InProgress { last: completed }
    }
}

/// Errors that can occur with the ledgers.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to read/write ledger {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("ledger {0} is locked by another process: {1}")]
    Lock(PathBuf, std::io::Error),
    #[error("malformed ledger {}:{line}: {msg}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },
}
