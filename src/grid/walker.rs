use std::collections::VecDeque;

use super::filter::FilterSet;
use super::listing::ListingClient;
use super::namespace::join_remote;
use super::sort::{sort_entries, SortSpec};
use crate::error::GridError;
use crate::models::RemoteEntry;

/// The filtered result of listing one directory.
#[derive(Debug)]
pub struct DirectoryBatch {
    /// Namespace-relative path that was listed.
    pub path: String,
    pub matched: Vec<RemoteEntry>,
    /// Listing lines that failed to parse.
    pub malformed: Vec<GridError>,
    /// Set when the directory could not be listed at all.
    pub error: Option<GridError>,
}

impl DirectoryBatch {
    pub fn file_count(&self) -> usize {
        self.matched.iter().filter(|e| !e.is_dir).count()
    }

    pub fn dir_count(&self) -> usize {
        self.matched.iter().filter(|e| e.is_dir).count()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

struct Frame {
    path: String,
    entries: Vec<RemoteEntry>,
    malformed: Vec<GridError>,
    error: Option<GridError>,
    pending: VecDeque<String>,
}

/// Depth-first walk over a remote tree, one batch per directory.
///
/// Subdirectories are yielded before the directory that contains them.
/// Directories matching an exclude pattern are never listed, and a
/// directory that fails to list contributes no children.
pub struct TreeWalker<'a> {
    client: ListingClient<'a>,
    filters: &'a FilterSet,
    sort: SortSpec,
    recursive: bool,
    root: Option<String>,
    stack: Vec<Frame>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        client: ListingClient<'a>,
        filters: &'a FilterSet,
        sort: SortSpec,
        root: &str,
        recursive: bool,
    ) -> Self {
        Self {
            client,
            filters,
            sort,
            recursive,
            root: Some(root.to_string()),
            stack: Vec::new(),
        }
    }

    fn open(&self, path: String) -> Frame {
        match self.client.list(&path) {
            Ok(listing) => {
                let pending = if self.recursive {
                    listing
                        .entries
                        .iter()
                        .filter(|entry| entry.is_dir && !self.filters.is_excluded(entry))
                        .map(|entry| join_remote(&path, &entry.name))
                        .collect()
                } else {
                    VecDeque::new()
                };
                Frame {
                    path,
                    entries: listing.entries,
                    malformed: listing.malformed,
                    error: None,
                    pending,
                }
            }
            Err(err) => {
                tracing::error!("Cannot list '{}': {}", path, err);
                Frame {
                    path,
                    entries: Vec::new(),
                    malformed: Vec::new(),
                    error: Some(err),
                    pending: VecDeque::new(),
                }
            }
        }
    }

    fn finish(&self, frame: Frame) -> DirectoryBatch {
        let mut entries = frame.entries;
        sort_entries(&mut entries, self.sort);
        let matched = self.filters.apply(entries);
        tracing::info!("{} entries matched in '{}'", matched.len(), frame.path);
        DirectoryBatch {
            path: frame.path,
            matched,
            malformed: frame.malformed,
            error: frame.error,
        }
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = DirectoryBatch;

    fn next(&mut self) -> Option<DirectoryBatch> {
        if let Some(root) = self.root.take() {
            let frame = self.open(root);
            self.stack.push(frame);
        }

        loop {
            let child = self.stack.last_mut()?.pending.pop_front();
            match child {
                Some(path) => {
                    let frame = self.open(path);
                    self.stack.push(frame);
                }
                None => {
                    let frame = self.stack.pop()?;
                    return Some(self.finish(frame));
                }
            }
        }
    }
}
