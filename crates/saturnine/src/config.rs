//! Prover configuration types.

use crate::selection::LiteralSelection;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Term ordering choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OrderingKind {
    #[default]
    Kbo,
    Lpo,
}

/// How aggressively the splitter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SplitMode {
    /// No splitting
    Off,
    /// Split input clauses only
    Input,
    /// Split every new clause
    #[default]
    Full,
}

/// What to print after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutputMode {
    #[default]
    Proof,
    Statistics,
    Quiet,
}

/// Configuration for one prover run.
#[derive(Debug, Clone)]
pub struct ProverConfig {
    pub ordering: OrderingKind,
    pub selection: LiteralSelection,
    /// Pick the lightest clause `weight` times for every `age` oldest pick
    pub age_weight_ratio: (u32, u32),
    pub split_mode: SplitMode,
    /// Soft wall-clock budget; `None` means unbounded
    pub time_limit: Option<Duration>,
    /// Soft resident-memory budget in MB; `None` means unbounded
    pub memory_limit_mb: Option<usize>,
    pub seed: u64,
    pub max_clauses: usize,
    pub max_iterations: usize,
    pub max_clause_size: usize,
    pub output: OutputMode,
    pub include_dirs: Vec<PathBuf>,
    pub problem_name: String,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            ordering: OrderingKind::Kbo,
            selection: LiteralSelection::Sel21,
            age_weight_ratio: (1, 4),
            split_mode: SplitMode::Full,
            time_limit: Some(Duration::from_secs(60)),
            memory_limit_mb: None,
            seed: 0,
            max_clauses: 0,     // 0 means no limit
            max_iterations: 0,  // 0 means no limit
            max_clause_size: 100,
            output: OutputMode::Proof,
            include_dirs: Vec::new(),
            problem_name: String::new(),
        }
    }
}

impl ProverConfig {
    /// Time limit given in deciseconds, the TPTP convention.
    pub fn with_time_limit_ds(mut self, deciseconds: u64) -> Self {
        self.time_limit = Some(Duration::from_millis(deciseconds * 100));
        self
    }
}

/// Get current process RSS in MB. Returns None if unavailable.
pub fn process_memory_mb() -> Option<usize> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let rss_pages: usize = statm.split_whitespace().nth(1)?.parse().ok()?;
        let page_size = 4096usize; // standard on Linux
        Some(rss_pages * page_size / (1024 * 1024))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}
