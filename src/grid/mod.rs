//! Listing, filtering and transfer dispatch against the grid namespace

pub mod command;
pub mod dispatch;
pub mod filter;
pub mod listing;
pub mod namespace;
pub mod sort;
pub mod task;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{GfalRunner, ToolRunner};
pub use dispatch::{BatchOutcome, Dispatcher, Progress, Prompt};
pub use filter::{FilterSet, MatchMode, MatchOptions};
pub use listing::ListingClient;
pub use namespace::{Namespace, Schemes};
pub use sort::{SortKey, SortSpec};
pub use task::{TaskKind, TaskOutcome, TransferOptions, TransferTask};
pub use walker::{DirectoryBatch, TreeWalker};
