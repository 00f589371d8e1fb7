use std::path::PathBuf;

use clap::Parser;

use crate::grid::SortKey;

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Browse, filter and transfer files on grid storage.
#[derive(Parser, Debug)]
#[command(name = "gridls", version, about)]
pub struct Cli {
    /// Grid directories to look in, relative to the user's area
    pub directories: Vec<String>,

    /// Keep only names containing every one of these strings
    #[arg(short, long, num_args = 1..)]
    pub search: Vec<String>,

    /// Drop names containing any of these strings
    #[arg(short, long, num_args = 1..)]
    pub reject: Vec<String>,

    /// Do not recurse into (or copy) directories matching these strings
    #[arg(short, long, alias = "exclude-dirs", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Copy matched files to the output directory (default: current directory)
    #[arg(short, long)]
    pub copy: bool,

    /// Move matched files from the first directory to the second
    #[arg(short, long = "move")]
    pub move_files: bool,

    /// Delete matched files after confirmation
    #[arg(short, long, visible_alias = "rm")]
    pub delete: bool,

    /// Create the given directories
    #[arg(long)]
    pub mkdir: bool,

    /// Upload local files into the grid directory given with -o
    #[arg(short = 'g', long, num_args = 1..)]
    pub copy_to_grid: Option<Vec<PathBuf>>,

    /// Recurse into subdirectories
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Only report directories
    #[arg(short = 'D', long)]
    pub dirs_only: bool,

    /// Same as -v -p
    #[arg(short, long)]
    pub long: bool,

    /// Bare output with full paths, one file per line
    #[arg(short, long)]
    pub bare: bool,

    /// Show modification month, day and time
    #[arg(short, long)]
    pub verbose: bool,

    /// Show permissions
    #[arg(short, long)]
    pub permissions: bool,

    /// Case-insensitive matching
    #[arg(short = 'i', long)]
    pub case_insensitive: bool,

    /// Treat search/reject/exclude strings as patterns
    #[arg(short, long, alias = "regexp")]
    pub wildcards: bool,

    /// Sort the output (by name unless --sort-key is given)
    #[arg(long)]
    pub sort: bool,

    /// Attribute to sort by
    #[arg(long, value_enum)]
    pub sort_key: Option<SortKey>,

    /// Reverse the sort order
    #[arg(long)]
    pub reverse: bool,

    /// Worker threads for transfers and deletions
    #[arg(short = 'j', long, default_value_t = default_threads())]
    pub threads: usize,

    /// Local directory for --copy, grid directory for --copy-to-grid
    #[arg(short, long)]
    pub output_directory: Option<String>,

    /// Browse another user's area
    #[arg(long)]
    pub user: Option<String>,

    /// Timeout in seconds for each toolchain call
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Overwrite existing files when copying
    #[arg(short, long)]
    pub force: bool,

    /// Create missing parent directories
    #[arg(long)]
    pub parents: bool,

    /// Pass -v to the toolchain
    #[arg(long)]
    pub tool_verbose: bool,

    /// Only show distinct file-name templates with run numbers stripped
    #[arg(short, long)]
    pub unique_runcards: bool,

    /// Print the elapsed time when done
    #[arg(short, long)]
    pub time: bool,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    pub config: Option<PathBuf>,
}
