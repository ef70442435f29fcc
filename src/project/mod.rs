//! The project file and the `Files` section rebuilt inside it.

mod document;
mod files_section;

pub use document::{DocumentError, ProjectDocument};
pub use files_section::FilesSection;
