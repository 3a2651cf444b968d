//! # Store Module
//!
//! The persistence collaborator: a relational store reached through the
//! [`Repository`] trait, with a SQLite implementation.
//!
//! ## Transactions
//!
//! [`Store::run_in_transaction`] hands a transaction-scoped repository to a
//! closure. `Ok` commits, `Err` rolls back, so a multi-step write either
//! lands completely or not at all.
//!
//! ```rust,no_run
//! use nexafs::store::{Repository, Store, StoreError, Table};
//!
//! let mut store = Store::open("nexafs.db")?;
//! let molecules = store.run_in_transaction(|repo| repo.count(Table::Molecules))?;
//! println!("{molecules} molecules");
//! # Ok::<(), StoreError>(())
//! ```

mod error;
mod repository;
mod schema;
mod sqlite;


use std::path::Path;

use log::{debug, warn};
use rusqlite::{Connection, TransactionBehavior};

pub use error::StoreError;
pub use repository::{CandidateQuery, MoleculeCandidate, Repository};
pub use schema::{Table, SCHEMA_SQL, SCHEMA_VERSION};
pub use sqlite::SqliteRepository;

/// A SQLite-backed store owning one connection
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a database file and apply the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(StoreError::MissingDirectory(parent.to_path_buf()));
            }
        }

        debug!("opening store at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        sqlite::register_functions(&conn)?;
        conn.execute_batch(SCHEMA_SQL)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let version = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// A repository outside any explicit transaction, for reads
    pub fn repository(&self) -> SqliteRepository<'_> {
        SqliteRepository::new(&self.conn)
    }

    /// Run `f` inside one transaction; commit on `Ok`, roll back on `Err`
    pub fn run_in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&SqliteRepository<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let result = f(&SqliteRepository::new(&tx));

        match result {
            Ok(value) => {
                tx.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(error) => {
                debug!("rolling back transaction");
                if let Err(rollback) = tx.rollback() {
                    warn!("rollback failed: {rollback}");
                }
                Err(error)
            }
        }
    }
}
