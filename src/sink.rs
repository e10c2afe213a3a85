use camino::{Utf8Path, Utf8PathBuf};
use harvest_std::{Fs, HarvestStdError};
use serde_json::Value;

/// Durable storage for harvested payloads, one entry per query name.
///
/// The presence of an entry is what marks a query as already harvested, so a
/// run interrupted at any point resumes from what is on disk.
#[cfg_attr(test, mockall::automock)]
pub trait Sink {
    /// Whether output for `name` is already stored
    fn exists(&self, name: &str) -> bool;

    /// Stores `data` for `name`, replacing anything stored before
    fn write(&self, name: &str, data: &Value) -> Result<Utf8PathBuf, HarvestStdError>;
}

/// A [`Sink`] writing `<dir>/<name>.json`
#[derive(Clone, Debug)]
pub struct FsSink {
    dir: Utf8PathBuf,
}

impl FsSink {
    /// Creates `dir` if it is missing. Safe to call on an existing directory.
    pub fn create(dir: impl Into<Utf8PathBuf>) -> Result<FsSink, HarvestStdError> {
        let dir = dir.into();
        Fs::create_dir_all(&dir)?;
        Ok(FsSink { dir })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> Utf8PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl Sink for FsSink {
    fn exists(&self, name: &str) -> bool {
        Fs::path_is_file(self.path_for(name))
    }

    fn write(&self, name: &str, data: &Value) -> Result<Utf8PathBuf, HarvestStdError> {
        let path = self.path_for(name);
        let contents = serde_json::to_string_pretty(data)
            .map_err(|err| HarvestStdError::AdhocError(err.into()))?;
        Fs::write_file(&path, contents)?;
        Ok(path)
    }
}
