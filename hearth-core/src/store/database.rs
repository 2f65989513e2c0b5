use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};

use super::{StoreError, StoreResult};
use crate::sqlite::configure_connection;

const SCHEMA: &str = include_str!("../../../sql/hearth.sql");

#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    path: Option<PathBuf>,
    read_only: bool,
    create_if_missing: bool,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self {
            path: None,
            read_only: false,
            create_if_missing: true,
        }
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    pub fn build(self) -> StoreResult<Database> {
        let path = self.path.ok_or(StoreError::MissingStore)?;
        let mut flags = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };

        if !self.read_only && self.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        Ok(Database { path, flags })
    }
}

/// Handle to the household database. Cheap to clone; every operation opens
/// its own connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    flags: OpenFlags,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        DatabaseBuilder::new().path(path).build()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn open(&self) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(&self.path, self.flags).map_err(|source| {
            StoreError::OpenDatabase {
                path: self.path.clone(),
                source,
            }
        })?;
        let read_only = self.flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY);
        configure_connection(&conn, read_only).map_err(|source| StoreError::OpenDatabase {
            path: self.path.clone(),
            source,
        })?;
        Ok(conn)
    }

    pub fn initialize(&self) -> StoreResult<()> {
        let conn = self.open()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn integrity_check(&self) -> StoreResult<String> {
        let conn = self.open()?;
        let result: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
        Ok(result)
    }

    pub fn backup_to(&self, destination: impl AsRef<Path>) -> StoreResult<()> {
        let destination_path = destination.as_ref();
        if let Some(parent) = destination_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let source = self.open()?;
        let mut dest = Connection::open(destination_path)?;
        let backup = Backup::new(&source, &mut dest)?;
        backup.run_to_completion(10, Duration::from_millis(50), None)?;
        Ok(())
    }
}
