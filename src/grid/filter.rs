//! Name matching for search, reject and recursion exclusion.
//!
//! Patterns are compiled once, up front. A malformed pattern in regex or
//! glob mode is a usage error and stops the run before anything is listed.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::error::{GridError, Result};
use crate::models::RemoteEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Plain substring of the entry name.
    #[default]
    Substring,
    /// Regular expression searched anywhere in the name.
    Regex,
    /// Shell-style wildcard over the whole name.
    Glob,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    pub mode: MatchMode,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Substring { needle: String, case_insensitive: bool },
    Regex(Regex),
    Glob {
        pattern: glob::Pattern,
        case_insensitive: bool,
    },
}

impl Pattern {
    pub fn compile(raw: &str, options: MatchOptions) -> Result<Self> {
        let source = match options.mode {
            MatchMode::Substring => {
                let needle = if options.case_insensitive {
                    raw.to_uppercase()
                } else {
                    raw.to_string()
                };
                return Ok(Pattern::Substring {
                    needle,
                    case_insensitive: options.case_insensitive,
                });
            }
            MatchMode::Regex => raw,
            MatchMode::Glob => {
                let pattern = glob::Pattern::new(raw).map_err(|source| GridError::GlobPattern {
                    pattern: raw.to_string(),
                    source,
                })?;
                return Ok(Pattern::Glob {
                    pattern,
                    case_insensitive: options.case_insensitive,
                });
            }
        };

        RegexBuilder::new(source)
            .case_insensitive(options.case_insensitive)
            .build()
            .map(Pattern::Regex)
            .map_err(|source| GridError::Pattern {
                pattern: raw.to_string(),
                source,
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Substring {
                needle,
                case_insensitive: true,
            } => name.to_uppercase().contains(needle.as_str()),
            Pattern::Substring { needle, .. } => name.contains(needle.as_str()),
            Pattern::Regex(re) => re.is_match(name),
            Pattern::Glob {
                pattern,
                case_insensitive,
            } => pattern.matches_with(
                name,
                glob::MatchOptions {
                    case_sensitive: !case_insensitive,
                    ..glob::MatchOptions::new()
                },
            ),
        }
    }
}

pub fn search_match(pattern: &Pattern, entry: &RemoteEntry) -> bool {
    pattern.matches(&entry.name)
}

fn compile_all(raw: &[String], options: MatchOptions) -> Result<Vec<Pattern>> {
    raw.iter().map(|p| Pattern::compile(p, options)).collect()
}

/// The include, reject and exclusion pattern lists of one run.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    search: Vec<Pattern>,
    reject: Vec<Pattern>,
    exclude: Vec<Pattern>,
    dirs_only: bool,
}

impl FilterSet {
    pub fn new(
        search: &[String],
        reject: &[String],
        exclude: &[String],
        options: MatchOptions,
        dirs_only: bool,
    ) -> Result<Self> {
        Ok(Self {
            search: compile_all(search, options)?,
            reject: compile_all(reject, options)?,
            exclude: compile_all(exclude, options)?,
            dirs_only,
        })
    }

    /// Keep entries matching every search pattern.
    pub fn do_search(&self, entries: Vec<RemoteEntry>) -> Vec<RemoteEntry> {
        self.search.iter().fold(entries, |acc, pattern| {
            acc.into_iter()
                .filter(|entry| search_match(pattern, entry))
                .collect()
        })
    }

    /// Drop entries matching any reject pattern.
    pub fn do_reject(&self, entries: Vec<RemoteEntry>) -> Vec<RemoteEntry> {
        self.reject.iter().fold(entries, |acc, pattern| {
            acc.into_iter()
                .filter(|entry| !search_match(pattern, entry))
                .collect()
        })
    }

    /// Whether recursion must not descend into (or transfer) this entry.
    pub fn is_excluded(&self, entry: &RemoteEntry) -> bool {
        self.exclude.iter().any(|pattern| search_match(pattern, entry))
    }

    pub fn directories_only(&self, entries: Vec<RemoteEntry>) -> Vec<RemoteEntry> {
        if !self.dirs_only {
            return entries;
        }
        entries.into_iter().filter(|entry| entry.is_dir).collect()
    }

    /// Search, then reject, then the directory-only filter.
    pub fn apply(&self, entries: Vec<RemoteEntry>) -> Vec<RemoteEntry> {
        let entries = self.do_search(entries);
        let entries = self.do_reject(entries);
        self.directories_only(entries)
    }
}

/// Distinct file-name templates once run numbers are stripped.
///
/// `job-17.dat` and `job-3.dat` both become `job-SEED.dat`.
pub fn unique_runcards(entries: &[RemoteEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .map(|entry| {
            entry
                .name
                .chars()
                .filter(|c| !c.is_ascii_digit())
                .collect::<String>()
                .replace("-.", "-SEED.")
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
