use clap::ValueEnum;

use crate::models::RemoteEntry;

/// Attribute a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    Name,
    Month,
    Day,
    Time,
    Permissions,
}

impl SortKey {
    fn key<'a>(&self, entry: &'a RemoteEntry) -> &'a str {
        match self {
            SortKey::Name => &entry.name,
            SortKey::Month => &entry.month,
            SortKey::Day => &entry.day,
            SortKey::Time => &entry.time,
            SortKey::Permissions => &entry.permissions,
        }
    }
}

/// `None` leaves the listing in the order the toolchain returned it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortSpec {
    pub key: Option<SortKey>,
    pub descending: bool,
}

pub fn sort_entries(entries: &mut [RemoteEntry], spec: SortSpec) {
    let Some(key) = spec.key else {
        return;
    };
    entries.sort_by(|a, b| {
        let ordering = key.key(a).cmp(key.key(b));
        if spec.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}
