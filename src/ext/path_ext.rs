use std::path::{Component, Path, PathBuf};

/// Turns `path` into an absolute path rooted at `base` when it is relative,
/// then removes `.` and `..` components without touching the filesystem.
pub fn absolutize_from(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    normalize_path(&joined)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` never climbs above the root
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait PathExt {
    /// Absolute, lexically normalized form of the path relative to the
    /// current working directory.
    fn to_absolute(&self) -> std::io::Result<PathBuf>;

    /// Last component of the path, or the whole path when there is none (`/`).
    fn base_name(&self) -> String;
}

impl PathExt for Path {
    fn to_absolute(&self) -> std::io::Result<PathBuf> {
        if self.is_absolute() {
            return Ok(normalize_path(self));
        }
        let current_dir = std::env::current_dir()?;
        Ok(absolutize_from(self, &current_dir))
    }

    fn base_name(&self) -> String {
        match self.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/base", "src", "/base/src")]
    #[case("/base", "./src/./lib", "/base/src/lib")]
    #[case("/base/nested", "../src", "/base/src")]
    #[case("/base", "../../..", "/")]
    #[case("/base", "/elsewhere/../abs", "/abs")]
    #[case("/base", "src/", "/base/src")]
    fn absolutize_from_normalizes(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let result = absolutize_from(Path::new(path), Path::new(base));
        assert_eq!(result, PathBuf::from(expected));
    }

    #[test]
    fn to_absolute_uses_current_dir() {
        let current_dir = std::env::current_dir().expect("Failed to get current dir");
        let result = Path::new("some/dir").to_absolute().unwrap();
        assert_eq!(result, current_dir.join("some").join("dir"));
        assert!(result.is_absolute());
    }

    #[rstest]
    #[case("/projects/mail", "mail")]
    #[case("/projects/mail/", "mail")]
    #[case("/", "/")]
    fn base_name_of_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(Path::new(path).base_name(), expected);
    }
}
