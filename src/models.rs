use std::cell::OnceCell;

use crate::error::{GridError, Result};
use crate::grid::namespace::{join_remote, Namespace};

/// One node of a remote directory listing.
///
/// Built from a single `gfal-ls -l` line plus the directory locator that
/// produced it. Only `display_name` may change afterwards, and only once.
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    pub name: String,
    /// Default-scheme locator of the directory this entry was listed in.
    pub parent_path: String,
    pub permissions: String,
    pub is_dir: bool,
    pub month: String,
    pub day: String,
    pub time: String,
    display_name: OnceCell<String>,
}

impl RemoteEntry {
    /// Parse a long-format listing line.
    ///
    /// The first column is the permission string and the last four are
    /// month, day, time and name. Whatever sits in between (links, owner,
    /// size) is ignored.
    pub fn parse(line: &str, directory: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(GridError::Parse {
                line: line.trim().to_string(),
                tokens: fields.len(),
            });
        }

        let n = fields.len();
        let mut name = fields[n - 1].to_string();
        let mut parent_path = directory.to_string();

        // Listing a single file echoes its full locator back as the name.
        if parent_path == name {
            let trimmed = name.trim_end_matches('/');
            match trimmed.rsplit_once('/') {
                Some((dir, base)) => {
                    parent_path = dir.to_string();
                    name = base.to_string();
                }
                None => parent_path.clear(),
            }
        }

        let permissions = fields[0].to_string();
        Ok(Self {
            is_dir: permissions.starts_with('d'),
            name,
            parent_path,
            permissions,
            month: fields[n - 4].to_string(),
            day: fields[n - 3].to_string(),
            time: fields[n - 2].to_string(),
            display_name: OnceCell::new(),
        })
    }

    /// Locator of this entry addressed through `scheme`.
    pub fn full_path(&self, namespace: &Namespace, scheme: &str) -> String {
        namespace.rescheme(&join_remote(&self.parent_path, &self.name), scheme)
    }

    pub fn is_executable(&self) -> bool {
        !self.is_dir && self.permissions.contains('x')
    }

    /// Set the decorated name used for printing. Later calls are ignored.
    pub fn set_display_name(&self, decorated: String) {
        let _ = self.display_name.set(decorated);
    }

    pub fn display_name(&self) -> &str {
        self.display_name.get().map(String::as_str).unwrap_or(&self.name)
    }
}
