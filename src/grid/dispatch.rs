//! Turns a selection of entries into transfer tasks and runs them on a
//! bounded pool of worker threads.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::command::ToolRunner;
use super::filter::FilterSet;
use super::namespace::{join_remote, Namespace};
use super::task::{TaskKind, TaskOutcome, TransferOptions, TransferTask};
use crate::error::{GridError, Result};
use crate::models::RemoteEntry;

/// Workers for a batch: never more than there are tasks, never fewer than one.
pub fn pool_size(requested: usize, tasks: usize) -> usize {
    requested.min(tasks).max(1)
}

/// Interactive yes/no question asked before destructive batches.
pub trait Prompt {
    fn ask(&self, question: &str) -> String;
}

/// Only an answer whose very first character is `y` or `Y` confirms.
pub fn is_yes(answer: &str) -> bool {
    answer.starts_with(['y', 'Y'])
}

/// Receives progress from the workers.
pub trait Progress: Send + Sync {
    fn on_batch(&self, _kind: TaskKind, _count: usize) {}
    fn on_start(&self, task: &TransferTask);
    fn on_finish(&self, _outcome: &TaskOutcome) {}
}

/// Per-task results of one or more batches.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outcomes: Vec<TaskOutcome>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn merge(&mut self, other: BatchOutcome) {
        self.outcomes.extend(other.outcomes);
    }
}

pub struct Dispatcher<'a> {
    runner: &'a dyn ToolRunner,
    namespace: &'a Namespace,
    options: &'a TransferOptions,
    progress: &'a dyn Progress,
    threads: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        runner: &'a dyn ToolRunner,
        namespace: &'a Namespace,
        options: &'a TransferOptions,
        progress: &'a dyn Progress,
        threads: usize,
    ) -> Self {
        Self {
            runner,
            namespace,
            options,
            progress,
            threads,
        }
    }

    /// Download every matched entry not excluded by `filters` into `output_dir`.
    pub fn copy(
        &self,
        entries: &[RemoteEntry],
        filters: &FilterSet,
        output_dir: &Path,
    ) -> BatchOutcome {
        let scheme = &self.namespace.schemes().download;
        let tasks = entries
            .iter()
            .filter(|entry| !filters.is_excluded(entry))
            .map(|entry| {
                let local = output_dir.join(&entry.name);
                TransferTask::download(
                    entry.full_path(self.namespace, scheme),
                    local.display().to_string(),
                    entry.is_dir,
                    self.options,
                )
            })
            .collect();
        self.run_batch(TaskKind::Download, tasks)
    }

    /// Move the plain files among `entries` from `directories[0]` to
    /// `directories[1]`, creating the destination first.
    pub fn move_files(
        &self,
        entries: &[RemoteEntry],
        directories: &[String],
    ) -> Result<BatchOutcome> {
        let [from, to] = directories else {
            return Err(GridError::usage(format!(
                "Cannot perform move of files between directories. {} specified",
                directories.len()
            )));
        };

        let mkdir = TransferTask::mkdir(
            self.namespace.locator(to, &self.namespace.schemes().mkdir),
            true,
            self.options,
        );
        let mut outcome = self.run_batch(TaskKind::Mkdir, vec![mkdir]);
        if outcome.failed() > 0 {
            tracing::error!("Destination '{}' could not be created, nothing moved", to);
            return Ok(outcome);
        }

        let scheme = &self.namespace.schemes().move_;
        let tasks = entries
            .iter()
            .filter(|entry| {
                if entry.is_dir {
                    tracing::debug!("Skipping directory '{}' in move", entry.name);
                }
                !entry.is_dir
            })
            .map(|entry| {
                TransferTask::rename(
                    self.namespace.locator(&join_remote(from, &entry.name), scheme),
                    self.namespace.locator(&join_remote(to, &entry.name), scheme),
                    self.options,
                )
            })
            .collect();
        outcome.merge(self.run_batch(TaskKind::Rename, tasks));
        Ok(outcome)
    }

    /// Delete `entries` after the user confirms. Directories go recursively.
    pub fn delete(&self, entries: &[RemoteEntry], prompt: &dyn Prompt) -> BatchOutcome {
        if entries.is_empty() {
            return BatchOutcome::default();
        }
        let n = entries.len();
        let question = format!(
            "Do you really want to delete {} {} file{} [y/n]?",
            if n == 1 { "this" } else { "these" },
            n,
            if n == 1 { "" } else { "s" }
        );
        if !is_yes(&prompt.ask(&question)) {
            tracing::info!("Deletion of {} entries declined", n);
            return BatchOutcome::default();
        }

        let scheme = &self.namespace.schemes().delete;
        let tasks = entries
            .iter()
            .map(|entry| {
                TransferTask::delete(
                    entry.full_path(self.namespace, scheme),
                    entry.is_dir,
                    self.options,
                )
            })
            .collect();
        self.run_batch(TaskKind::Delete, tasks)
    }

    /// Create each namespace-relative directory.
    pub fn mkdir(&self, directories: &[String]) -> BatchOutcome {
        let scheme = &self.namespace.schemes().mkdir;
        let tasks = directories
            .iter()
            .map(|dir| {
                TransferTask::mkdir(self.namespace.locator(dir, scheme), false, self.options)
            })
            .collect();
        self.run_batch(TaskKind::Mkdir, tasks)
    }

    /// Copy local files into the grid directory `destination`.
    pub fn upload(&self, files: &[PathBuf], destination: Option<&str>) -> Result<BatchOutcome> {
        let destination = destination.ok_or_else(|| {
            GridError::usage("Please specify an output directory with -o.")
        })?;
        let cwd = std::env::current_dir()?;
        let scheme = &self.namespace.schemes().upload;

        let tasks = files
            .iter()
            .map(|file| {
                let name = file
                    .file_name()
                    .ok_or_else(|| {
                        GridError::usage(format!("'{}' does not name a file", file.display()))
                    })?
                    .to_string_lossy();
                let source = format!("file://{}", cwd.join(file).display());
                let target = self.namespace.locator(&join_remote(destination, &name), scheme);
                Ok(TransferTask::upload(source, target, self.options))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.run_batch(TaskKind::Upload, tasks))
    }

    /// Number the tasks and run them, one task per worker job.
    pub fn run_batch(&self, kind: TaskKind, tasks: Vec<TransferTask>) -> BatchOutcome {
        if tasks.is_empty() {
            return BatchOutcome::default();
        }
        let total = tasks.len();
        let tasks: Vec<TransferTask> = tasks
            .into_iter()
            .enumerate()
            .map(|(i, task)| task.numbered(i, total))
            .collect();

        let workers = pool_size(self.threads, total);
        tracing::info!("Dispatching {} {:?} tasks on {} workers", total, kind, workers);
        self.progress.on_batch(kind, total);

        let runner = self.runner;
        let progress = self.progress;
        let run = |task: TransferTask| {
            progress.on_start(&task);
            let outcome = task.execute(runner);
            progress.on_finish(&outcome);
            outcome
        };

        let outcomes = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| {
                tasks
                    .into_par_iter()
                    .with_max_len(1)
                    .map(run)
                    .collect::<Vec<_>>()
            }),
            Err(err) => {
                tracing::warn!("Worker pool unavailable ({}), running tasks inline", err);
                tasks.into_iter().map(run).collect()
            }
        };

        let outcome = BatchOutcome { outcomes };
        tracing::info!(
            "{:?} batch finished: {} succeeded, {} failed",
            kind,
            outcome.succeeded(),
            outcome.failed()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::filter::MatchOptions;
    use crate::grid::testing::{dir_line, file_line, namespace, FakeRunner, NoProgress};
    use std::cell::RefCell;
    use std::sync::Mutex;

    struct Answer(&'static str, RefCell<Vec<String>>);

    impl Answer {
        fn new(text: &'static str) -> Self {
            Self(text, RefCell::new(Vec::new()))
        }
    }

    impl Prompt for Answer {
        fn ask(&self, question: &str) -> String {
            self.1.borrow_mut().push(question.to_string());
            self.0.to_string()
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<usize>>);

    impl Progress for Recorder {
        fn on_start(&self, task: &TransferTask) {
            self.0.lock().unwrap().push(task.sequence_index());
        }
    }

    const DIR: &str = "gsiftp://se.example.org/dpm/home/pheno/tester/runs";

    fn entries() -> Vec<RemoteEntry> {
        vec![
            RemoteEntry::parse(&file_line("a.dat"), DIR).unwrap(),
            RemoteEntry::parse(&file_line("b.dat"), DIR).unwrap(),
            RemoteEntry::parse(&dir_line("sub"), DIR).unwrap(),
        ]
    }

    fn with_dispatcher<R>(
        runner: &FakeRunner,
        threads: usize,
        f: impl FnOnce(&Dispatcher) -> R,
    ) -> R {
        let ns = namespace();
        let options = TransferOptions::default();
        let dispatcher = Dispatcher::new(runner, &ns, &options, &NoProgress, threads);
        f(&dispatcher)
    }

    #[test]
    fn pool_size_is_clamped() {
        assert_eq!(pool_size(8, 3), 3);
        assert_eq!(pool_size(0, 5), 1);
        assert_eq!(pool_size(8, 0), 1);
        assert_eq!(pool_size(4, 10), 4);
    }

    #[test]
    fn yes_is_keyed_on_first_character() {
        assert!(is_yes("y"));
        assert!(is_yes("Yes please"));
        assert!(!is_yes("no"));
        assert!(!is_yes(""));
        assert!(!is_yes("sure, y"));
        assert!(!is_yes(" y"));
        assert!(!is_yes("\tyes"));
    }

    #[test]
    fn copy_downloads_through_download_scheme() {
        let runner = FakeRunner::new();
        let exclude = vec!["b.dat".to_string()];
        let filters =
            FilterSet::new(&[], &[], &exclude, MatchOptions::default(), false).unwrap();
        let outcome = with_dispatcher(&runner, 8, |d| {
            d.copy(&entries(), &filters, Path::new("/tmp/out"))
        });

        assert_eq!(outcome.succeeded(), 2);
        let calls = runner.calls_to("gfal-copy");
        assert_eq!(calls.len(), 2);
        let file_call = calls
            .iter()
            .find(|argv| argv.contains(&"/tmp/out/a.dat".to_string()))
            .unwrap();
        assert_eq!(
            file_call[1],
            "xroot://se.example.org/dpm/home/pheno/tester/runs/a.dat"
        );
        let dir_call = calls
            .iter()
            .find(|argv| argv.contains(&"/tmp/out/sub".to_string()))
            .unwrap();
        assert!(dir_call.contains(&"-r".to_string()));
    }

    #[test]
    fn failures_are_isolated_per_task() {
        let runner = FakeRunner::new().failing_on("a.dat");
        let filters = FilterSet::default();
        let outcome =
            with_dispatcher(&runner, 3, |d| d.copy(&entries(), &filters, Path::new("/tmp")));
        assert_eq!(outcome.outcomes.len(), 3);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.succeeded(), 2);
        let failure = outcome.failures().next().unwrap();
        assert!(failure.task.source().ends_with("a.dat"));
        assert!(matches!(failure.error, Some(GridError::ToolInvocation { .. })));
    }

    #[test]
    fn sequence_indices_are_stable() {
        let runner = FakeRunner::new();
        let ns = namespace();
        let options = TransferOptions::default();
        let recorder = Recorder::default();
        let dispatcher = Dispatcher::new(&runner, &ns, &options, &recorder, 4);
        let outcome = dispatcher.copy(&entries(), &FilterSet::default(), Path::new("/tmp"));

        let mut seen = recorder.0.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
        let indices: Vec<usize> = outcome
            .outcomes
            .iter()
            .map(|o| o.task.sequence_index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn move_needs_exactly_two_directories() {
        let runner = FakeRunner::new();
        for dirs in [vec![], vec!["a".to_string()], vec!["a".into(), "b".into(), "c".into()]] {
            let err = with_dispatcher(&runner, 2, |d| d.move_files(&entries(), &dirs)).unwrap_err();
            assert!(err.is_usage());
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn move_creates_destination_then_renames_files_only() {
        let runner = FakeRunner::new();
        let dirs = vec!["runs".to_string(), "archive".to_string()];
        let outcome = with_dispatcher(&runner, 2, |d| d.move_files(&entries(), &dirs)).unwrap();

        assert_eq!(outcome.succeeded(), 3);
        let calls = runner.calls();
        assert_eq!(
            calls[0],
            vec![
                "gfal-mkdir".to_string(),
                "-p".to_string(),
                "gsiftp://se.example.org/dpm/home/pheno/tester/archive".to_string(),
            ]
        );
        let renames = runner.calls_to("gfal-rename");
        assert_eq!(renames.len(), 2);
        assert!(renames.iter().any(|argv| argv[1..]
            == [
                "xroot://se.example.org/dpm/home/pheno/tester/runs/a.dat".to_string(),
                "xroot://se.example.org/dpm/home/pheno/tester/archive/a.dat".to_string(),
            ]));
        assert!(renames.iter().all(|argv| !argv[1].ends_with("/sub")));
    }

    #[test]
    fn move_stops_when_destination_cannot_be_created() {
        let runner = FakeRunner::new().failing_on("archive");
        let dirs = vec!["runs".to_string(), "archive".to_string()];
        let outcome = with_dispatcher(&runner, 2, |d| d.move_files(&entries(), &dirs)).unwrap();
        assert_eq!(outcome.failed(), 1);
        assert!(runner.calls_to("gfal-rename").is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let runner = FakeRunner::new();
        let answer = Answer::new("nope");
        let outcome = with_dispatcher(&runner, 2, |d| d.delete(&entries(), &answer));
        assert!(outcome.is_empty());
        assert!(runner.calls().is_empty());
        assert_eq!(
            answer.1.borrow()[0],
            "Do you really want to delete these 3 files [y/n]?"
        );
    }

    #[test]
    fn confirmed_delete_is_recursive_for_directories() {
        let runner = FakeRunner::new();
        let answer = Answer::new("Y");
        let outcome = with_dispatcher(&runner, 2, |d| d.delete(&entries(), &answer));
        assert_eq!(outcome.succeeded(), 3);
        let calls = runner.calls_to("gfal-rm");
        let dir_call = calls.iter().find(|argv| argv.last().unwrap().ends_with("/sub")).unwrap();
        assert_eq!(dir_call[1], "-r");
        assert!(dir_call[2].starts_with("xroot://"));
        let file_call = calls.iter().find(|argv| argv.last().unwrap().ends_with("/a.dat")).unwrap();
        assert_eq!(file_call.len(), 2);
    }

    #[test]
    fn delete_with_leading_blank_answer_dispatches_nothing() {
        let runner = FakeRunner::new();
        let answer = Answer::new("  yes");
        let outcome = with_dispatcher(&runner, 2, |d| d.delete(&entries(), &answer));
        assert!(outcome.is_empty());
        assert!(runner.calls_to("gfal-rm").is_empty());
    }

    #[test]
    fn single_delete_question_is_singular() {
        let runner = FakeRunner::new();
        let answer = Answer::new("n");
        with_dispatcher(&runner, 1, |d| d.delete(&entries()[..1], &answer));
        assert_eq!(answer.1.borrow()[0], "Do you really want to delete this 1 file [y/n]?");
    }

    #[test]
    fn mkdir_runs_one_task_per_directory() {
        let runner = FakeRunner::new();
        let dirs = vec!["x".to_string(), "y/z".to_string()];
        let outcome = with_dispatcher(&runner, 8, |d| d.mkdir(&dirs));
        assert_eq!(outcome.succeeded(), 2);
        let mut targets: Vec<String> = runner
            .calls_to("gfal-mkdir")
            .into_iter()
            .map(|argv| argv.last().cloned().unwrap())
            .collect();
        targets.sort();
        assert_eq!(
            targets,
            vec![
                "gsiftp://se.example.org/dpm/home/pheno/tester/x".to_string(),
                "gsiftp://se.example.org/dpm/home/pheno/tester/y/z".to_string(),
            ]
        );
    }

    #[test]
    fn upload_without_destination_is_aborted() {
        let runner = FakeRunner::new();
        let files = vec![PathBuf::from("a.txt")];
        let err = with_dispatcher(&runner, 2, |d| d.upload(&files, None)).unwrap_err();
        assert!(err.is_usage());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn upload_targets_destination_through_upload_scheme() {
        let runner = FakeRunner::new();
        let files = vec![PathBuf::from("/data/local/a.txt")];
        let outcome = with_dispatcher(&runner, 2, |d| d.upload(&files, Some("incoming"))).unwrap();
        assert_eq!(outcome.succeeded(), 1);
        let call = &runner.calls_to("gfal-copy")[0];
        assert_eq!(call[1], "file:///data/local/a.txt");
        assert_eq!(call[2], "xroot://se.example.org/dpm/home/pheno/tester/incoming/a.txt");
    }

    #[test]
    fn empty_batch_dispatches_nothing() {
        let runner = FakeRunner::new();
        let outcome = with_dispatcher(&runner, 8, |d| d.run_batch(TaskKind::Download, Vec::new()));
        assert!(outcome.is_empty());
        assert!(runner.calls().is_empty());
    }
}
