use std::{
    env, io,
    path::{Path, PathBuf},
};

use mapforge_shared::log::debug;

use crate::{Error, Result};

/// Resolves the roots in which the source assets are found and the build artifacts are written.
///
/// The working directory is the directory of the generator. Sources are located below it while the
/// artifacts are written next to it, into the directories the game loads them from:
///
/// ```text
/// <parent>/
/// ├─ <working directory>/
/// │  ├─ assets/
/// │  │  ├─ maps/         production sources
/// │  │  ├─ test_maps/    test sources
/// ├─ resources/
/// │  ├─ maps/            production artifacts
/// ├─ tests/
/// │  ├─ testdata/
/// │  │  ├─ maps/         test artifacts
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocator {
    working_dir: PathBuf,
    parent_dir: PathBuf,
}

impl AssetLocator {
    /// Creates an [`AssetLocator`] for the working directory of the process.
    pub fn from_current_dir() -> Result<Self> {
        let working_dir = env::current_dir().map_err(Error::PathResolution)?;
        Self::new(working_dir)
    }

    /// Creates an [`AssetLocator`] for the given working directory. Relative paths are interpreted
    /// relative to the working directory of the process. The directory doesn't have to exist.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::path::Path;
    /// use mapforge_content::AssetLocator;
    /// let locator = AssetLocator::new("/work/map-generator").unwrap();
    /// assert_eq!(locator.input_dir(false), Path::new("/work/map-generator/assets/maps"));
    /// assert_eq!(locator.output_dir(true), Path::new("/work/tests/testdata/maps"));
    /// ```
    pub fn new(working_dir: impl AsRef<Path>) -> Result<Self> {
        let working_dir = working_dir.as_ref();
        let working_dir = if working_dir.is_absolute() {
            working_dir.to_owned()
        } else {
            env::current_dir().map_err(Error::PathResolution)?.join(working_dir)
        };
        let working_dir = normalize(&working_dir);
        let parent_dir = working_dir
            .parent()
            .ok_or_else(|| {
                Error::PathResolution(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("working directory {working_dir:?} has no parent directory"),
                ))
            })?
            .to_owned();
        debug!("Resolving map directories relative to {working_dir:?}");
        Ok(Self { working_dir, parent_dir })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Directory that contains one subdirectory with `image.png` and `info.json` per map.
    pub fn input_dir(&self, is_test: bool) -> PathBuf {
        if is_test {
            self.working_dir.join("assets").join("test_maps")
        } else {
            self.working_dir.join("assets").join("maps")
        }
    }

    /// Directory that receives one subdirectory with the build artifacts per map.
    pub fn output_dir(&self, is_test: bool) -> PathBuf {
        if is_test {
            self.parent_dir.join("tests").join("testdata").join("maps")
        } else {
            self.parent_dir.join("resources").join("maps")
        }
    }

    pub fn map_input_dir(&self, name: &str, is_test: bool) -> PathBuf {
        self.input_dir(is_test).join(name)
    }

    pub fn map_output_dir(&self, name: &str, is_test: bool) -> PathBuf {
        self.output_dir(is_test).join(name)
    }
}

/// Removes `.` and `..` components without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
