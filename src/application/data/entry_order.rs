use std::fs::DirEntry;

/// Order in which the entries of a directory are turned into project nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryOrder {
    /// Whatever order the filesystem enumerates entries in.
    #[default]
    Filesystem,
    /// Sorted by file name, giving reproducible output across platforms.
    Name,
}

impl EntryOrder {
    pub fn from_sort_flag(sort: bool) -> Self {
        if sort {
            EntryOrder::Name
        } else {
            EntryOrder::Filesystem
        }
    }

    pub fn apply(&self, entries: &mut [DirEntry]) {
        match self {
            EntryOrder::Filesystem => {}
            EntryOrder::Name => entries.sort_by_key(|entry| entry.file_name()),
        }
    }
}
