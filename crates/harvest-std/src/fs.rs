use std::fs::{self, OpenOptions};
use std::io::Write;

use anyhow::{anyhow, Context};
use camino::Utf8Path;
use tap::TapFallible;

use crate::HarvestStdError;

/// Interact with a file system
#[derive(Default, Copy, Clone)]
pub struct Fs {}

impl Fs {
    /// reads a file from disk
    pub fn read_file<P>(path: P) -> Result<String, HarvestStdError>
    where
        P: AsRef<Utf8Path>,
    {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(metadata) => {
                if metadata.is_file() {
                    tracing::debug!("reading {} from disk", &path);
                    let contents = fs::read_to_string(path)
                        .with_context(|| format!("could not read {}", &path))?;
                    if contents.is_empty() {
                        Err(HarvestStdError::EmptyFile {
                            empty_file: path.to_string(),
                        })
                    } else {
                        Ok(contents)
                    }
                } else {
                    Err(anyhow!("'{}' is not a file", path).into())
                }
            }
            Err(e) => Err(anyhow!("could not find '{}'", path).context(e).into()),
        }
    }

    /// writes a file to disk, creating missing parent directories and
    /// replacing any previous contents
    pub fn write_file<P, C>(path: P, contents: C) -> Result<(), HarvestStdError>
    where
        P: AsRef<Utf8Path>,
        C: AsRef<[u8]>,
    {
        let path = path.as_ref();
        if path.file_name().is_none() {
            return Err(anyhow!("cannot write to a path without a final element {path}").into());
        }
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            if !Self::path_is_dir(parent) {
                Self::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("tried to open {} but was unable to do so", &path))?;
        tracing::debug!("writing {} to disk", &path);
        file.write_all(contents.as_ref())
            .with_context(|| format!("could not write {}", &path))
            .tap_err(|err| tracing::debug!(?err, "write failed"))?;
        Ok(())
    }

    /// creates a directory and every missing parent; succeeds if it already exists
    pub fn create_dir_all<P>(path: P) -> Result<(), HarvestStdError>
    where
        P: AsRef<Utf8Path>,
    {
        let path = path.as_ref();
        tracing::debug!("creating {} directory", &path);
        fs::create_dir_all(path)
            .with_context(|| format!("could not create {} directory", &path))?;
        Ok(())
    }

    /// whether a regular file exists at `path`
    pub fn path_is_file<P>(path: P) -> bool
    where
        P: AsRef<Utf8Path>,
    {
        path.as_ref().is_file()
    }

    /// whether a directory exists at `path`
    pub fn path_is_dir<P>(path: P) -> bool
    where
        P: AsRef<Utf8Path>,
    {
        path.as_ref().is_dir()
    }
}
