use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridError>;

/// Everything that can go wrong between parsing arguments and the last
/// transfer task finishing.
#[derive(Debug, Error)]
pub enum GridError {
    /// Bad argument combination. Always fatal, raised before any dispatch.
    #[error("{0}")]
    Usage(String),

    /// A search/reject/exclude pattern failed to compile in pattern mode.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A shell-style wildcard failed to compile in glob mode.
    #[error("invalid pattern '{pattern}': {source}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The external toolchain ran but exited non-zero.
    #[error("call {command} failed with non-zero error code {code}: {stderr}")]
    ToolInvocation {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The external toolchain could not be started at all.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A listing line had fewer columns than an entry needs.
    #[error("cannot parse listing line '{line}': expected at least 4 fields, found {tokens}")]
    Parse { line: String, tokens: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    pub fn usage(message: impl Into<String>) -> Self {
        GridError::Usage(message.into())
    }

    /// Usage errors abort the whole invocation; everything else is local to
    /// a directory or a task.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            GridError::Usage(_) | GridError::Pattern { .. } | GridError::GlobPattern { .. }
        )
    }
}
