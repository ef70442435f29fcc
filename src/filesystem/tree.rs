use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use crate::application::data::EntryOrder;
use crate::ext::PathExt;

/// A node of the generated file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectNode {
    Filter(FilterNode),
    File { path: PathBuf },
}

/// A directory, rendered as a `Filter` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    pub name: String,
    pub children: Vec<ProjectNode>,
}

/// Result of walking one directory: its filter and the number of regular
/// files found anywhere beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFilter {
    pub filter: FilterNode,
    pub file_count: usize,
}

impl FilterNode {
    pub fn new(name: impl Into<String>) -> Self {
        FilterNode {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Walks `dir` recursively and builds the filter named after its base name.
    ///
    /// Sub-directories without any file beneath them are left out. The
    /// returned filter itself is kept even when empty, it is up to the caller
    /// to decide what to do with it. Symbolic links are followed; links whose
    /// target is missing are skipped, and links pointing back to a directory
    /// currently being walked are skipped with a warning.
    pub fn from_directory(dir: &Path, order: EntryOrder) -> Result<WalkedFilter, WalkError> {
        let canonical = fs::canonicalize(dir).context(ResolveSnafu { path: dir })?;
        let mut ancestors = Vec::new();
        Self::walk(dir, canonical, dir.base_name(), order, &mut ancestors)
    }

    fn walk(
        dir: &Path,
        canonical: PathBuf,
        name: String,
        order: EntryOrder,
        ancestors: &mut Vec<PathBuf>,
    ) -> Result<WalkedFilter, WalkError> {
        debug!("Walking directory {}", dir.display());
        ancestors.push(canonical);
        let result = Self::walk_entries(dir, name, order, ancestors);
        ancestors.pop();
        result
    }

    fn walk_entries(
        dir: &Path,
        name: String,
        order: EntryOrder,
        ancestors: &mut Vec<PathBuf>,
    ) -> Result<WalkedFilter, WalkError> {
        let mut entries = fs::read_dir(dir)
            .and_then(|read_dir| read_dir.collect::<Result<Vec<_>, _>>())
            .context(ReadDirSnafu { path: dir })?;
        order.apply(&mut entries);

        let mut filter = FilterNode::new(name);
        let mut file_count = 0;

        for entry in entries {
            let path = entry.path();

            // follows symlinks, a missing target means a dangling link
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    debug!("Skipping {}: target does not exist", path.display());
                    continue;
                }
                Err(err) => return Err(err).context(MetadataSnafu { path }),
            };

            if metadata.is_dir() {
                let canonical = fs::canonicalize(&path).context(ResolveSnafu { path: &path })?;
                if ancestors.contains(&canonical) {
                    warn!(
                        "Skipping {}: it links back to {}",
                        path.display(),
                        canonical.display()
                    );
                    continue;
                }

                let child_name = entry.file_name().to_string_lossy().into_owned();
                let child = Self::walk(&path, canonical, child_name, order, ancestors)?;
                if child.file_count == 0 {
                    debug!("Omitting {}: no files beneath it", path.display());
                    continue;
                }

                file_count += child.file_count;
                filter.children.push(ProjectNode::Filter(child.filter));
            } else if metadata.is_file() {
                filter.children.push(ProjectNode::File { path });
                file_count += 1;
            } else {
                debug!("Skipping {}: not a file or directory", path.display());
            }
        }

        Ok(WalkedFilter { filter, file_count })
    }
}

#[derive(Debug, Snafu)]
pub enum WalkError {
    #[snafu(display("Failed to list directory {}", path.display()))]
    ReadDirError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to read metadata of {}", path.display()))]
    MetadataError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to resolve directory {}", path.display()))]
    ResolveError { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, "content").expect("Failed to write file");
    }

    fn filter_names(filter: &FilterNode) -> Vec<&str> {
        filter
            .children
            .iter()
            .filter_map(|child| match child {
                ProjectNode::Filter(f) => Some(f.name.as_str()),
                ProjectNode::File { .. } => None,
            })
            .collect()
    }

    fn file_paths(filter: &FilterNode) -> Vec<PathBuf> {
        filter
            .children
            .iter()
            .filter_map(|child| match child {
                ProjectNode::File { path } => Some(path.clone()),
                ProjectNode::Filter(_) => None,
            })
            .collect()
    }

    fn walk(dir: &Path) -> WalkedFilter {
        FilterNode::from_directory(dir, EntryOrder::Name).expect("Failed to walk directory")
    }

    #[test]
    fn keeps_empty_top_level_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(temp_dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(temp_dir.path().join("d")).unwrap();

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, 0);
        assert!(walked.filter.children.is_empty());
        assert_eq!(walked.filter.name, temp_dir.path().base_name());
    }

    #[test]
    fn omits_directories_without_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(&temp_dir.path().join("a.txt"));
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, 1);
        assert!(filter_names(&walked.filter).is_empty());
        assert_eq!(
            file_paths(&walked.filter),
            vec![temp_dir.path().join("a.txt")]
        );
    }

    #[rstest]
    #[case(vec!["one.c"], 1)]
    #[case(vec!["one.c", "two.c", "three.h"], 3)]
    #[case(vec!["src/main.c", "src/util/str.c", "include/a/b/c/deep.h"], 3)]
    #[case(vec!["x/1", "x/2", "x/y/3", "x/y/z/4", "5"], 5)]
    fn counts_files_at_any_depth(#[case] files: Vec<&str>, #[case] expected: usize) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for file in files {
            touch(&temp_dir.path().join(file));
        }

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, expected);
    }

    #[test]
    fn nests_filters_like_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(&temp_dir.path().join("src/util/str.c"));
        touch(&temp_dir.path().join("src/main.c"));
        fs::create_dir_all(temp_dir.path().join("src/empty/deeper")).unwrap();
        fs::create_dir_all(temp_dir.path().join("docs")).unwrap();

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, 2);
        assert_eq!(filter_names(&walked.filter), vec!["src"]);

        let ProjectNode::Filter(src) = &walked.filter.children[0] else {
            panic!("Expected a filter for src");
        };
        assert_eq!(filter_names(src), vec!["util"]);
        assert_eq!(file_paths(src), vec![temp_dir.path().join("src/main.c")]);
    }

    #[test]
    fn sorts_entries_by_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["zeta.c", "alpha.c", "Mid.c", "beta.c"] {
            touch(&temp_dir.path().join(name));
        }

        let walked = walk(temp_dir.path());

        let names: Vec<String> = file_paths(&walked.filter)
            .iter()
            .map(|path| path.base_name())
            .collect();
        assert_eq!(names, vec!["Mid.c", "alpha.c", "beta.c", "zeta.c"]);
    }

    #[test]
    fn records_absolute_paths_of_real_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(&temp_dir.path().join("a/b.txt"));
        touch(&temp_dir.path().join("c.txt"));

        fn collect(filter: &FilterNode, out: &mut Vec<PathBuf>) {
            for child in &filter.children {
                match child {
                    ProjectNode::Filter(f) => collect(f, out),
                    ProjectNode::File { path } => out.push(path.clone()),
                }
            }
        }
        let mut paths = Vec::new();
        collect(&walk(temp_dir.path()).filter, &mut paths);

        assert_eq!(paths.len(), 2);
        for path in paths {
            assert!(path.is_absolute());
            assert!(path.is_file());
        }
    }

    #[test]
    fn fails_on_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");

        let result = FilterNode::from_directory(&missing, EntryOrder::Filesystem);

        assert!(matches!(result, Err(WalkError::ResolveError { path, .. }) if path == missing));
    }

    #[cfg(unix)]
    #[test]
    fn skips_dangling_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(&temp_dir.path().join("real.c"));
        symlink(
            temp_dir.path().join("nowhere.c"),
            temp_dir.path().join("dangling.c"),
        )
        .unwrap();

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, 1);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_to_files_and_directories() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let outside = TempDir::new().expect("Failed to create temp directory");
        touch(&outside.path().join("lib/shared.c"));
        symlink(outside.path().join("lib"), temp_dir.path().join("linked")).unwrap();
        symlink(
            outside.path().join("lib/shared.c"),
            temp_dir.path().join("alias.c"),
        )
        .unwrap();

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, 2);
        assert_eq!(filter_names(&walked.filter), vec!["linked"]);
    }

    #[cfg(unix)]
    #[test]
    fn skips_symlink_cycles() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(&temp_dir.path().join("sub/file.c"));
        symlink(temp_dir.path(), temp_dir.path().join("sub/back")).unwrap();

        let walked = walk(temp_dir.path());

        assert_eq!(walked.file_count, 1);
        let ProjectNode::Filter(sub) = &walked.filter.children[0] else {
            panic!("Expected a filter for sub");
        };
        assert!(filter_names(sub).is_empty());
    }
}
