//! Directory walking for the project file list.
//!
//! A walked directory becomes a tree of filters (directories that contain at
//! least one file) and files, mirroring the layout on disk.

mod tree;

pub use tree::{FilterNode, ProjectNode, WalkError, WalkedFilter};
