//! Log file writer that creates its file on the first write
//!
//! Nothing touches the filesystem until something is actually logged, so a
//! quiet run leaves no file behind.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

type SharedFile = Arc<Mutex<Option<File>>>;

/// `MakeWriter` handing out writers that share one lazily opened file
#[derive(Clone)]
pub struct LazyLogFile {
    path: PathBuf,
    file: SharedFile,
}

impl LazyLogFile {
    /// Writer factory for the file at `path`; the file is not created yet
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Arc::new(Mutex::new(None)),
        }
    }
}

/// One writer handed to the fmt layer per event
pub struct LazyLogWriter {
    path: PathBuf,
    file: SharedFile,
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl LazyLogWriter {
    fn lock(&self) -> io::Result<MutexGuard<'_, Option<File>>> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("log file mutex poisoned"))
    }
}

impl Write for LazyLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.lock()?;

        // (Re)open when first used or when the file was removed underneath us
        if guard.is_none() || !self.path.exists() {
            *guard = Some(open_append(&self.path)?);
        }

        if let Some(file) = guard.as_mut()
            && let Ok(written) = file.write(buf)
        {
            return Ok(written);
        }

        let mut fresh = open_append(&self.path)?;
        let written = fresh.write(buf)?;
        *guard = Some(fresh);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.lock()?;
        if !self.path.exists() {
            *guard = None;
            return Ok(());
        }
        guard.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl<'a> MakeWriter<'a> for LazyLogFile {
    type Writer = LazyLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LazyLogWriter {
            path: self.path.clone(),
            file: Arc::clone(&self.file),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{name}_{}.log", std::process::id()))
    }

    #[test]
    fn test_file_created_only_on_write() {
        let path = scratch_path("assignment_editor_lazy_writer");
        let _ = std::fs::remove_file(&path);

        let log_file = LazyLogFile::new(path.clone());
        let mut writer = log_file.make_writer();
        assert!(!path.exists());

        writer.write_all(b"first line\n").unwrap();
        writer.flush().unwrap();
        assert!(path.exists());

        std::fs::remove_file(&path).unwrap();
        writer.write_all(b"second line\n").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "second line\n");

        let _ = std::fs::remove_file(&path);
    }
}
