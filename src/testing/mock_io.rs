//! Temporary CSV files for tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// A temporary file that is deleted when dropped.
pub struct TempFilePath {
    _temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create an empty temporary file ending in `.{extension}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self {
            _temp_file: temp_file,
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory that is deleted, with its contents, when dropped.
pub struct TempDirPath {
    temp_dir: TempDir,
}

impl TempDirPath {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of `filename` inside this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join(filename)
    }

    /// Write `contents` to `filename` inside this directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_file(&self, filename: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.file_path(filename);
        File::create(&path)?.write_all(contents)?;
        Ok(path)
    }
}

/// Create a temporary `.csv` file holding `contents` verbatim.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
///
/// # Example
///
/// ```
/// use ironsheet::testing::write_temp_csv;
///
/// let file = write_temp_csv("name,age\nAlice,30\n")?;
/// assert!(file.path().exists());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_temp_csv(contents: &str) -> std::io::Result<TempFilePath> {
    let file = TempFilePath::with_extension("csv")?;
    File::create(file.path())?.write_all(contents.as_bytes())?;
    Ok(file)
}

/// Create a temporary gzip-compressed `.csv.gz` file holding `contents`.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
#[cfg(feature = "compression-gzip")]
pub fn write_temp_csv_gz(contents: &str) -> std::io::Result<TempFilePath> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let file = TempFilePath::with_extension("csv.gz")?;
    let mut encoder = GzEncoder::new(File::create(file.path())?, Compression::default());
    encoder.write_all(contents.as_bytes())?;
    encoder.finish()?;
    Ok(file)
}
