//! In-memory stand-in for the gfal toolchain.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::command::ToolRunner;
use super::dispatch::Progress;
use super::task::TransferTask;
use super::namespace::{Namespace, Schemes};
use crate::error::{GridError, Result};

pub const TEMPLATE: &str = "://se.example.org/dpm/home/pheno/{user}/";

pub fn namespace() -> Namespace {
    Namespace::new(TEMPLATE, "tester", Schemes::default())
}

#[derive(Default)]
pub struct FakeRunner {
    listings: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `lines` for a `gfal-ls` of the namespace-relative `path`.
    pub fn with_listing<I, S>(mut self, path: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let locator = namespace().locator(path, &Schemes::default().list);
        self.listings
            .insert(locator, lines.into_iter().map(Into::into).collect());
        self
    }

    /// Any call with an argument containing `needle` exits non-zero.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.failing.insert(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|argv| argv[0] == program)
            .collect()
    }
}

impl ToolRunner for FakeRunner {
    fn invoke(&self, argv: &[String]) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(argv.to_vec());

        let fails = argv[1..]
            .iter()
            .any(|arg| self.failing.iter().any(|needle| arg.contains(needle.as_str())));
        if fails {
            return Err(GridError::ToolInvocation {
                command: argv.join(" "),
                code: 1,
                stderr: "simulated failure".to_string(),
            });
        }

        if argv[0] == "gfal-ls" {
            let locator = argv.last().cloned().unwrap_or_default();
            return Ok(self.listings.get(&locator).cloned().unwrap_or_default());
        }
        Ok(Vec::new())
    }
}

pub fn file_line(name: &str) -> String {
    format!("-rw-r--r--   1 101  102  1024 Mar 14 09:12 {name}")
}

pub fn dir_line(name: &str) -> String {
    format!("drwxrwxr-x   1 101  102     0 Mar 14 09:12 {name}")
}

/// Progress sink that ignores everything.
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_start(&self, _task: &TransferTask) {}
}
