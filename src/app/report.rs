use super::types::DisplayOptions;
use crate::grid::filter::unique_runcards;
use crate::grid::namespace::join_remote;
use crate::grid::DirectoryBatch;
use crate::models::RemoteEntry;
use crate::style::{Palette, Role};

/// One listing line for `entry`.
pub fn entry_line(entry: &RemoteEntry, display: &DisplayOptions, palette: &Palette) -> String {
    if !display.bare {
        if entry.is_dir {
            entry.set_display_name(palette.paint(&entry.name, Role::Directory));
        } else if entry.is_executable() {
            entry.set_display_name(palette.paint(&entry.name, Role::Executable));
        }
    }

    let mut line = String::new();
    if display.verbose {
        line.push_str(&format!("{} {} {:15}", entry.month, entry.day, entry.time));
    }
    if display.permissions {
        line.push_str(&format!(" {:10} ", entry.permissions));
    }
    line.push_str(&format!("{:50}", entry.display_name()));

    if display.bare {
        line = line.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    line
}

/// Bare mode prints plain files only, with their path in the namespace.
fn bare_line(
    entry: &RemoteEntry,
    dir: &str,
    display: &DisplayOptions,
    palette: &Palette,
) -> String {
    let line = entry_line(entry, display, palette);
    match line.rsplit_once(' ') {
        Some((prefix, _)) => format!("{} {}", prefix, join_remote(dir, &entry.name)),
        None => join_remote(dir, &entry.name),
    }
}

fn plural_summary(count: usize, what: &str, dir: &str, punctuation: char) -> String {
    format!("> {} matching {} found in {}{} ", count, what, dir, punctuation)
}

/// Everything printed for one directory level, in order.
///
/// Empty batches produce nothing at all.
pub fn render_batch(
    batch: &DirectoryBatch,
    display: &DisplayOptions,
    palette: &Palette,
    reprint_threshold: usize,
) -> Vec<String> {
    let mut out = Vec::new();
    if batch.is_empty() {
        return out;
    }

    let files = batch.file_count();
    let dirs = batch.dir_count();
    let punctuation = if files > 0 { ':' } else { '.' };

    if !display.bare {
        if files > 0 {
            out.push(palette.paint(
                &plural_summary(files, "files", &batch.path, punctuation),
                Role::Summary,
            ));
        }
        if dirs > 0 {
            out.push(palette.paint(
                &plural_summary(dirs, "directories", &batch.path, punctuation),
                Role::Summary,
            ));
        }
    }

    if display.bare {
        out.extend(
            batch
                .matched
                .iter()
                .filter(|entry| !entry.is_dir)
                .map(|entry| bare_line(entry, &batch.path, display, palette)),
        );
    } else if display.unique_runcards {
        let runcards = unique_runcards(&batch.matched);
        let count = runcards.len();
        out.extend(runcards);
        out.push(palette.paint(&format!("> {} unique runcards", count), Role::Runcards));
    } else {
        out.extend(
            batch
                .matched
                .iter()
                .map(|entry| entry_line(entry, display, palette)),
        );
    }

    if files + dirs > reprint_threshold && !display.bare {
        if files > 0 {
            out.push(palette.paint(&format!("> {} files matched", files), Role::Summary));
        }
        if dirs > 0 {
            out.push(palette.paint(&format!("> {} directories matched", dirs), Role::Summary));
        }
    }
    out
}
