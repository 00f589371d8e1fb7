use std::path::PathBuf;

use crate::grid::{
    BatchOutcome, FilterSet, Namespace, Progress, Prompt, SortSpec, ToolRunner, TransferOptions,
};
use crate::style::Palette;

#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    pub bare: bool,
    pub verbose: bool,
    pub permissions: bool,
    pub unique_runcards: bool,
}

/// Which transfer actions run on each non-empty directory batch.
#[derive(Debug, Clone, Default)]
pub struct Actions {
    pub copy: bool,
    pub move_files: bool,
    pub delete: bool,
    pub mkdir: bool,
    pub upload: Option<Vec<PathBuf>>,
}

/// Everything one invocation needs, assembled once from the command line
/// and the config file and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub namespace: Namespace,
    pub directories: Vec<String>,
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub recursive: bool,
    pub display: DisplayOptions,
    pub actions: Actions,
    /// Local download target for copies.
    pub local_output: PathBuf,
    /// Raw `-o` value; the grid target for uploads.
    pub output_directory: Option<String>,
    pub threads: usize,
    pub transfer: TransferOptions,
    pub reprint_threshold: usize,
    pub palette: Palette,
}

pub struct App {
    pub settings: Settings,
    pub runner: Box<dyn ToolRunner>,
    pub prompt: Box<dyn Prompt>,
    pub progress: Box<dyn Progress>,
}

/// Tally of a whole run, used for the exit status.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub directories_listed: usize,
    pub listing_errors: usize,
    pub malformed_lines: usize,
    pub transfers: BatchOutcome,
}

impl RunSummary {
    /// True when nothing failed anywhere.
    pub fn is_clean(&self) -> bool {
        self.listing_errors == 0 && self.malformed_lines == 0 && self.transfers.failed() == 0
    }
}
