use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::application::data::LogLevel;

/// Replaces the "Files" section of a Visual C++ project file with filters
/// mirroring the given directories and their sub-directories.
#[derive(Parser, Debug, Clone, Default)]
#[command(version)]
pub struct Cli {
    /// The project file to refresh
    #[clap(long)]
    pub vcproj: Option<PathBuf>,

    /// A directory to include in the project, may be repeated
    #[clap(long = "dir")]
    pub dirs: Vec<PathBuf>,

    /// Sort directory entries by name instead of filesystem order
    #[clap(long)]
    pub sort: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Parses the process arguments, see [`Cli::parse_or_help_from`].
    pub fn parse_or_help() -> Option<Self> {
        Self::parse_or_help_from(std::env::args_os())
    }

    /// Parses `args`, whose first item is the binary name.
    ///
    /// Returns `None` after printing the help text when no argument was given
    /// at all. Other argument errors are reported by clap, which exits.
    pub fn parse_or_help_from(
        args: impl IntoIterator<Item = impl Into<OsString> + Clone>,
    ) -> Option<Self> {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.len() <= 1 {
            // printing help can only fail on a closed stdout
            let _ = Self::command().print_help();
            return None;
        }
        Some(Self::parse_from(args))
    }
}
