use std::fmt;
use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{RuntimeConfig, ValidationError};
use crate::filesystem::{FilterNode, WalkError};
use crate::project::{DocumentError, FilesSection, ProjectDocument};

pub struct Application;

/// What a successful run did, printed as the confirmation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub file_count: usize,
    pub vcproj: PathBuf,
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} source files in project file {}",
            self.file_count,
            self.vcproj.display()
        )
    }
}

impl Application {
    pub fn run(
        app_config: impl TryInto<RuntimeConfig, Error = ValidationError>,
    ) -> Result<RefreshSummary, ApplicationError> {
        let app_config: RuntimeConfig = app_config.try_into()?;
        Self::refresh(&app_config)
    }

    /// Rebuilds the `Files` section of the configured project from its input
    /// directories and overwrites the project file.
    ///
    /// Nothing is written unless every directory was walked and the document
    /// was patched successfully.
    pub fn refresh(app_config: &RuntimeConfig) -> Result<RefreshSummary, ApplicationError> {
        let mut document = ProjectDocument::read(&app_config.vcproj).context(DocumentSnafu)?;

        let section = Self::build_files_section(app_config)?;
        info!(
            "Collected {} files from {} directories",
            section.file_count(),
            app_config.dirs.len()
        );

        document
            .replace_files_section(&section)
            .context(DocumentSnafu)?;
        document.save().context(DocumentSnafu)?;

        Ok(RefreshSummary {
            file_count: section.file_count(),
            vcproj: document.path().to_path_buf(),
        })
    }

    fn build_files_section(app_config: &RuntimeConfig) -> Result<FilesSection, ApplicationError> {
        let mut section = FilesSection::new();
        for dir in &app_config.dirs {
            let walked = FilterNode::from_directory(dir, app_config.order).context(WalkSnafu)?;
            debug!("Found {} files in {}", walked.file_count, dir.display());
            section.push(walked);
        }
        Ok(section)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(transparent)]
    InvalidOptions { source: ValidationError },
    #[snafu(display("Critical failure encountered while walking the input directories"))]
    WalkError { source: WalkError },
    #[snafu(display("Critical failure encountered while refreshing the project file"))]
    DocumentError { source: DocumentError },
}
