use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::task::{Task, TaskList};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize task #{id}: {source}")]
    Serialize {
        id: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Task file on disk: one JSON record per line, no header.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

/// Exclusive advisory lock held until dropped.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %err, "failed to release store lock");
        }
    }
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".lock")
    }

    /// A missing store file is an empty list. Lines that do not decode into a
    /// task (a half-written tail, hand edits, invalid UTF-8) are skipped.
    pub fn load(&self) -> Result<TaskList, StorageError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task file yet");
                return Ok(TaskList::new());
            }
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };

        let mut tasks = Vec::new();
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|err| StorageError::io(&self.path, err))?;
            if read == 0 {
                break;
            }
            line_no += 1;
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            // Bytes that are not valid UTF-8 fail here and the record is skipped.
            match serde_json::from_slice::<Task>(&buf) {
                Ok(task) => tasks.push(task),
                Err(err) => {
                    debug!(line = line_no, error = %err, "skipping unreadable task record");
                }
            }
        }
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(TaskList::from_tasks(tasks))
    }

    /// Rewrite the whole file. Records go to a sibling temp file first and
    /// replace the store only once fully written.
    pub fn save(&self, list: &TaskList) -> Result<(), StorageError> {
        let mut body = String::new();
        for task in list {
            let line = serde_json::to_string(task).map_err(|source| StorageError::Serialize {
                id: task.id,
                source,
            })?;
            body.push_str(&line);
            body.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
        }

        let tmp = sibling_with_suffix(&self.path, ".tmp");
        let mut file = File::create(&tmp).map_err(|err| StorageError::io(&tmp, err))?;
        let written = file
            .write_all(body.as_bytes())
            .and_then(|_| file.sync_all());
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(&tmp, err));
        }
        drop(file);
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(&self.path, err));
        }
        debug!(path = %self.path.display(), count = list.len(), "saved tasks");
        Ok(())
    }

    /// Block until this process owns the store.
    pub fn lock(&self) -> Result<StoreLock, StorageError> {
        let path = self.lock_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| StorageError::Lock {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| StorageError::Lock {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "acquired store lock");
        Ok(StoreLock { file, path })
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
