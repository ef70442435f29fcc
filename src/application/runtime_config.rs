use std::path::PathBuf;

use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;

use crate::application::data::EntryOrder;
use crate::cli::Cli;
use crate::ext::PathExt;

/// Validated inputs of a run. Every path is absolute and existed when the
/// configuration was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub vcproj: PathBuf,
    pub dirs: Vec<PathBuf>,
    pub order: EntryOrder,
}

impl TryFrom<Cli> for RuntimeConfig {
    type Error = ValidationError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let vcproj = cli.vcproj.context(MissingVcprojSnafu)?;
        ensure!(!cli.dirs.is_empty(), MissingDirsSnafu);

        let vcproj = vcproj.to_absolute().context(CurrentDirSnafu)?;
        ensure!(vcproj.is_file(), VcprojNotFoundSnafu { path: vcproj });

        let dirs = cli
            .dirs
            .iter()
            .map(|dir| -> Result<PathBuf, ValidationError> {
                let dir = dir.to_absolute().context(CurrentDirSnafu)?;
                ensure!(dir.is_dir(), DirNotFoundSnafu { path: dir });
                Ok(dir)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = RuntimeConfig {
            vcproj,
            dirs,
            order: EntryOrder::from_sort_flag(cli.sort),
        };
        debug!("Validated runtime config: {:?}", config);
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ValidationError {
    #[snafu(display("--vcproj option is required."))]
    MissingVcproj,
    #[snafu(display("Must specify at least one --dir option."))]
    MissingDirs,
    #[snafu(display("Cannot find vcproj file {}", path.display()))]
    VcprojNotFound { path: PathBuf },
    #[snafu(display("Cannot find directory {}", path.display()))]
    DirNotFound { path: PathBuf },
    #[snafu(display("Failed to obtain current dir"))]
    CurrentDirError { source: std::io::Error },
}
