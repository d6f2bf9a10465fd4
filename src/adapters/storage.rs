use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the fixture line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutStorage;

impl Storage for StdoutStorage {
    fn write_line(&self, text: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", text)?;
        handle.flush()?;
        Ok(())
    }

    fn location(&self) -> String {
        "<stdout>".to_string()
    }
}

/// Writes the fixture line to a file, creating parent directories.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Storage for LocalStorage {
    fn write_line(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, format!("{}\n", text))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
