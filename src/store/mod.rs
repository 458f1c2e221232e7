//! CSV record store and typed collection repositories.
//!
//! This module plays the role a database layer normally would: [`csv_file`]
//! holds the raw delimited-file primitives, [`StoreRecord`] maps entities to and
//! from rows, [`Repository`] provides the typed load/find/update operations, and
//! [`Store`] hands out one repository per collection rooted at a data directory.

pub mod csv_file;
pub mod repository;

pub use repository::Repository;

use crate::entities::{Category, Pledge, Project, RewardTier, User};
use crate::errors::Result;
use csv::StringRecord;
use std::path::{Path, PathBuf};

/// Persistence mapping between an entity and one row of its collection file.
///
/// `HEADERS` fixes the field order; the first entry is the primary-key column
/// name, which is also how an optional header row is recognized on load.
pub trait StoreRecord: Clone {
    /// File name of the backing collection, relative to the data directory.
    const FILE_NAME: &'static str;
    /// Column names in field order; the first names the primary key.
    const HEADERS: &'static [&'static str];

    /// Primary key of this entity.
    fn key(&self) -> &str;
    /// Decodes one CSV row into an entity.
    fn from_record(record: &StringRecord) -> Result<Self>;
    /// Encodes this entity as one CSV row, in `HEADERS` order.
    fn to_record(&self) -> Vec<String>;
}

/// Handle on a data directory holding the five collection files.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    /// Collection files themselves are created lazily on first save.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Directory this store reads and writes.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Repository over `users.csv`.
    #[must_use]
    pub fn users(&self) -> Repository<User> {
        Repository::new(&self.data_dir)
    }

    /// Repository over `categories.csv`.
    #[must_use]
    pub fn categories(&self) -> Repository<Category> {
        Repository::new(&self.data_dir)
    }

    /// Repository over `projects.csv`.
    #[must_use]
    pub fn projects(&self) -> Repository<Project> {
        Repository::new(&self.data_dir)
    }

    /// Repository over `reward_tiers.csv`.
    #[must_use]
    pub fn reward_tiers(&self) -> Repository<RewardTier> {
        Repository::new(&self.data_dir)
    }

    /// Repository over `pledges.csv`.
    #[must_use]
    pub fn pledges(&self) -> Repository<Pledge> {
        Repository::new(&self.data_dir)
    }
}
