use super::command::ToolRunner;
use super::namespace::{substitute_scheme, Namespace};
use crate::error::{GridError, Result};
use crate::models::RemoteEntry;

const LIST_PROGRAM: &str = "gfal-ls";
/// Long format, human readable sizes so no column is elided.
const LIST_FLAGS: [&str; 2] = ["-l", "-H"];

/// Entries of one remote directory.
///
/// Lines that could not be parsed are kept as errors so callers can report
/// them instead of silently undercounting matches.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<RemoteEntry>,
    pub malformed: Vec<GridError>,
}

pub struct ListingClient<'a> {
    runner: &'a dyn ToolRunner,
    namespace: &'a Namespace,
}

impl<'a> ListingClient<'a> {
    pub fn new(runner: &'a dyn ToolRunner, namespace: &'a Namespace) -> Self {
        Self { runner, namespace }
    }

    /// List one namespace-relative path with a single toolchain call.
    pub fn list(&self, path: &str) -> Result<Listing> {
        let schemes = self.namespace.schemes();
        let locator = self.namespace.locator(path, &schemes.list);
        let directory = self.namespace.default_locator(path);

        let mut argv = vec![LIST_PROGRAM.to_string()];
        argv.extend(LIST_FLAGS.iter().map(|flag| flag.to_string()));
        argv.push(locator);

        let lines = self.runner.invoke(&argv)?;
        let list_prefix = format!("{}://", schemes.list);
        let default_prefix = format!("{}://", schemes.default);

        let mut listing = Listing::default();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let line = substitute_scheme(&line, &list_prefix, &default_prefix);
            match RemoteEntry::parse(&line, &directory) {
                Ok(entry) => listing.entries.push(entry),
                Err(err) => {
                    tracing::warn!("Malformed listing line in {}: {}", directory, err);
                    listing.malformed.push(err);
                }
            }
        }

        tracing::debug!(
            "Listed {} entries in {} ({} malformed)",
            listing.entries.len(),
            directory,
            listing.malformed.len()
        );
        Ok(listing)
    }
}
