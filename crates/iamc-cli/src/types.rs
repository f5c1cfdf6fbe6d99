use std::fmt;
use std::path::PathBuf;

use iamc_model::FailureKind;
use iamc_report::ControlUpdate;

/// Outcome of one `convert` run.
#[derive(Debug)]
pub struct ConvertResult {
    pub output_dir: PathBuf,
    pub log_path: PathBuf,
    pub groups: Vec<GroupSummary>,
    /// `None` when unit suggestions were disabled or nothing was observed.
    pub units: Option<ControlUpdate>,
    pub warnings: usize,
    pub errors: usize,
}

impl ConvertResult {
    pub fn written(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g.status, GroupStatus::Written))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g.status, GroupStatus::Skipped(_)))
            .count()
    }
}

#[derive(Debug)]
pub struct GroupSummary {
    pub file: String,
    pub model: String,
    pub rows: usize,
    pub unmapped: usize,
    pub output: Option<PathBuf>,
    pub status: GroupStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupStatus {
    Written,
    /// Nothing survived mapping; no output file.
    Empty,
    Skipped(FailureKind),
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupStatus::Written => f.write_str("written"),
            GroupStatus::Empty => f.write_str("empty"),
            GroupStatus::Skipped(kind) => write!(f, "skipped ({kind})"),
        }
    }
}
