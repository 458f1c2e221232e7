//! Typed collection repositories over the CSV record store.
//!
//! One [`Repository`] exists per entity type, all sharing the same generic
//! load/find/save machinery. Every mutation rewrites the whole collection file
//! (the storage format has no partial-row update), locating the target by
//! primary key and preserving the order of all other rows.

use crate::entities::{Pledge, Project, RewardTier, User};
use crate::errors::{Error, Result};
use crate::store::{StoreRecord, csv_file};
use csv::StringRecord;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Typed access to one CSV-backed collection.
#[derive(Debug, Clone)]
pub struct Repository<T> {
    path: PathBuf,
    _entity: PhantomData<T>,
}

impl<T: StoreRecord> Repository<T> {
    /// Creates a repository for `T`'s collection file under `data_dir`.
    pub(crate) fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(T::FILE_NAME),
            _entity: PhantomData,
        }
    }

    /// Row 0 is a header iff its first field equals the primary-key column name.
    /// Anything else is data; a missing header is not an error.
    fn is_header(record: &StringRecord) -> bool {
        record.get(0) == Some(T::HEADERS[0])
    }

    /// Loads every entity in the collection, in file order.
    ///
    /// Rows that fail to decode (wrong field count, unparsable number/date/enum)
    /// are skipped with a warning rather than aborting the whole load.
    pub fn load_all(&self) -> Result<Vec<T>> {
        let records = csv_file::read_records(&self.path)?;
        let mut entities = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            if row == 0 && Self::is_header(record) {
                continue;
            }
            match T::from_record(record) {
                Ok(entity) => entities.push(entity),
                Err(error) => {
                    warn!(file = T::FILE_NAME, row = row + 1, %error, "skipping malformed row");
                }
            }
        }

        Ok(entities)
    }

    /// Finds one entity by primary key via a full-collection scan.
    pub fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        Ok(self.load_all()?.into_iter().find(|e| e.key() == id))
    }

    /// Overwrites the collection file with `entities`, preceded by a header row.
    pub fn save_all(&self, entities: &[T]) -> Result<()> {
        let mut rows = Vec::with_capacity(entities.len() + 1);
        rows.push(T::HEADERS.iter().map(|h| (*h).to_string()).collect());
        rows.extend(entities.iter().map(StoreRecord::to_record));
        csv_file::write_records(&self.path, &rows)
    }

    /// Appends one entity to the end of the collection.
    pub fn append(&self, entity: &T) -> Result<()> {
        let mut entities = self.load_all()?;
        entities.push(entity.clone());
        self.save_all(&entities)
    }

    /// Replaces the entity with the same primary key, preserving the order of
    /// all other rows. Fails with [`Error::RecordNotFound`] if no row matches.
    pub fn update(&self, entity: &T) -> Result<()> {
        let mut entities = self.load_all()?;
        let Some(slot) = entities.iter_mut().find(|e| e.key() == entity.key()) else {
            return Err(Error::RecordNotFound {
                file: T::FILE_NAME,
                id: entity.key().to_string(),
            });
        };
        *slot = entity.clone();
        self.save_all(&entities)
    }
}

impl Repository<Pledge> {
    /// All pledges against one project, in file order.
    pub fn find_by_project(&self, project_id: &str) -> Result<Vec<Pledge>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|p| p.project_id == project_id)
            .collect())
    }

    /// All pledges made by one user, in file order.
    pub fn find_by_user(&self, user_id: &str) -> Result<Vec<Pledge>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect())
    }

    /// All accepted pledges.
    pub fn find_successful(&self) -> Result<Vec<Pledge>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(Pledge::is_successful)
            .collect())
    }

    /// All rejected pledges.
    pub fn find_rejected(&self) -> Result<Vec<Pledge>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(Pledge::is_rejected)
            .collect())
    }
}

impl Repository<Project> {
    /// All projects in one category, in file order.
    pub fn find_by_category(&self, category_id: &str) -> Result<Vec<Project>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|p| p.category_id == category_id)
            .collect())
    }
}

impl Repository<RewardTier> {
    /// All reward tiers offered by one project, in file order.
    pub fn find_by_project(&self, project_id: &str) -> Result<Vec<RewardTier>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|t| t.project_id == project_id)
            .collect())
    }
}

impl Repository<User> {
    /// Finds a user by login name.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|u| u.username == username))
    }

    /// Checks a username/password pair against the collection.
    ///
    /// Passwords are compared byte-for-byte in plaintext, as given. Returns the
    /// authenticated user, or `None` on unknown username or wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        Ok(self
            .find_by_username(username)?
            .filter(|u| u.password == password))
    }
}
