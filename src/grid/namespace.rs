//! Protocol-qualified locators over one logical grid namespace.
//!
//! Every verb reaches the same tree through its own front-end. A locator is
//! always produced in the default scheme first and then rewritten with a
//! single substitution, so no caller ever hard-codes a scheme.

use serde::{Deserialize, Serialize};

/// Scheme used for each kind of toolchain call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schemes {
    pub default: String,
    pub list: String,
    pub delete: String,
    pub download: String,
    pub upload: String,
    #[serde(rename = "move")]
    pub move_: String,
    pub mkdir: String,
}

impl Default for Schemes {
    fn default() -> Self {
        Self {
            default: "gsiftp".to_string(),
            list: "dav".to_string(),
            delete: "xroot".to_string(),
            download: "xroot".to_string(),
            upload: "xroot".to_string(),
            move_: "xroot".to_string(),
            mkdir: "gsiftp".to_string(),
        }
    }
}

impl Schemes {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("default", self.default.as_str()),
            ("list", self.list.as_str()),
            ("delete", self.delete.as_str()),
            ("download", self.download.as_str()),
            ("upload", self.upload.as_str()),
            ("move", self.move_.as_str()),
            ("mkdir", self.mkdir.as_str()),
        ]
        .into_iter()
    }
}

/// The user's home in the remote namespace.
#[derive(Debug, Clone)]
pub struct Namespace {
    root: String,
    schemes: Schemes,
}

impl Namespace {
    /// `template` is the scheme-less root, e.g.
    /// `://se01.dur.scotgrid.ac.uk/dpm/dur.scotgrid.ac.uk/home/pheno/{user}/`.
    pub fn new(template: &str, user: &str, schemes: Schemes) -> Self {
        let root = format!("{}{}", schemes.default, template.replace("{user}", user));
        Self { root, schemes }
    }

    pub fn schemes(&self) -> &Schemes {
        &self.schemes
    }

    /// Default-scheme locator of a namespace-relative path.
    pub fn default_locator(&self, relative: &str) -> String {
        format!("{}{}", self.root, relative.trim_start_matches('/'))
    }

    /// Locator of a namespace-relative path addressed through `scheme`.
    pub fn locator(&self, relative: &str, scheme: &str) -> String {
        self.rescheme(&self.default_locator(relative), scheme)
    }

    /// Rewrite a default-scheme locator to `scheme`.
    pub fn rescheme(&self, locator: &str, scheme: &str) -> String {
        substitute_scheme(locator, &self.schemes.default, scheme)
    }
}

/// Replace the first occurrence of `from` with `to`.
pub fn substitute_scheme(locator: &str, from: &str, to: &str) -> String {
    locator.replacen(from, to, 1)
}

/// Join a remote directory and a child name without doubling separators.
pub fn join_remote(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
