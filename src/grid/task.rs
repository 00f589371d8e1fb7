use std::fmt;

use super::command::ToolRunner;
use crate::error::GridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Upload,
    Download,
    Delete,
    Rename,
    Mkdir,
}

impl TaskKind {
    pub fn program(&self) -> &'static str {
        match self {
            TaskKind::Upload | TaskKind::Download => "gfal-copy",
            TaskKind::Delete => "gfal-rm",
            TaskKind::Rename => "gfal-rename",
            TaskKind::Mkdir => "gfal-mkdir",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            TaskKind::Upload | TaskKind::Download => "Copying",
            TaskKind::Delete => "Deleting",
            TaskKind::Rename => "Moving",
            TaskKind::Mkdir => "Creating",
        }
    }
}

/// Flags shared by every toolchain call of a run.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Per-call timeout in seconds, enforced by the toolchain itself.
    pub timeout: Option<u64>,
    /// Overwrite existing copy destinations.
    pub force: bool,
    /// Create missing parent directories.
    pub parents: bool,
    pub verbose: bool,
}

impl TransferOptions {
    /// Option flags for one call. `recursive` and `parents` come from the
    /// task itself and are added on top of the run-wide settings.
    pub fn args_for(&self, kind: TaskKind, recursive: bool, parents: bool) -> Vec<String> {
        let copies = matches!(kind, TaskKind::Upload | TaskKind::Download);
        let mut args = Vec::new();
        if self.verbose {
            args.push("-v".to_string());
        }
        if let Some(secs) = self.timeout {
            args.push("-t".to_string());
            args.push(secs.to_string());
        }
        if self.force && copies {
            args.push("-f".to_string());
        }
        if (self.parents || parents) && (copies || kind == TaskKind::Mkdir) {
            args.push("-p".to_string());
        }
        if recursive && matches!(kind, TaskKind::Delete | TaskKind::Download) {
            args.push("-r".to_string());
        }
        args
    }
}

/// One pending toolchain invocation.
#[derive(Debug, Clone)]
pub struct TransferTask {
    kind: TaskKind,
    source: String,
    destination: Option<String>,
    sequence_index: usize,
    total_count: usize,
    extra_options: Vec<String>,
}

impl TransferTask {
    fn build(
        kind: TaskKind,
        source: String,
        destination: Option<String>,
        extra_options: Vec<String>,
    ) -> Self {
        Self {
            kind,
            source,
            destination,
            sequence_index: 0,
            total_count: 1,
            extra_options,
        }
    }

    pub fn download(
        source: String,
        destination: String,
        is_dir: bool,
        opts: &TransferOptions,
    ) -> Self {
        let extra = opts.args_for(TaskKind::Download, is_dir, false);
        Self::build(TaskKind::Download, source, Some(destination), extra)
    }

    pub fn upload(source: String, destination: String, opts: &TransferOptions) -> Self {
        let extra = opts.args_for(TaskKind::Upload, false, false);
        Self::build(TaskKind::Upload, source, Some(destination), extra)
    }

    pub fn delete(locator: String, is_dir: bool, opts: &TransferOptions) -> Self {
        let extra = opts.args_for(TaskKind::Delete, is_dir, false);
        Self::build(TaskKind::Delete, locator, None, extra)
    }

    pub fn rename(old: String, new: String, opts: &TransferOptions) -> Self {
        let extra = opts.args_for(TaskKind::Rename, false, false);
        Self::build(TaskKind::Rename, old, Some(new), extra)
    }

    pub fn mkdir(locator: String, parents: bool, opts: &TransferOptions) -> Self {
        let extra = opts.args_for(TaskKind::Mkdir, false, parents);
        Self::build(TaskKind::Mkdir, locator, None, extra)
    }

    /// Fix the task's position in its batch, used for progress display.
    pub fn numbered(mut self, index: usize, total: usize) -> Self {
        self.sequence_index = index;
        self.total_count = total;
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.kind.program().to_string()];
        argv.extend(self.extra_options.iter().cloned());
        argv.push(self.source.clone());
        if let Some(dest) = &self.destination {
            argv.push(dest.clone());
        }
        argv
    }

    /// Run the task once. Never retried.
    pub fn execute(self, runner: &dyn ToolRunner) -> TaskOutcome {
        let error = runner.invoke(&self.argv()).err();
        if let Some(err) = &error {
            tracing::error!(
                "Task {}/{} failed: {}",
                self.sequence_index + 1,
                self.total_count,
                err
            );
        }
        TaskOutcome { task: self, error }
    }
}

impl fmt::Display for TransferTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.verb(), self.source)?;
        if let Some(dest) = &self.destination {
            write!(f, " to {}", dest)?;
        }
        write!(f, " [{}/{}]", self.sequence_index + 1, self.total_count)
    }
}

/// What happened to one task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub task: TransferTask,
    pub error: Option<GridError>,
}

impl TaskOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}
