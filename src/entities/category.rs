//! Category entity - Static reference data for grouping projects.

use crate::errors::Result;
use crate::store::StoreRecord;
use csv::StringRecord;

/// A project category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier for the category
    pub category_id: String,
    /// Display name
    pub name: String,
    /// Longer description of what belongs in this category
    pub description: String,
}

impl StoreRecord for Category {
    const FILE_NAME: &'static str = "categories.csv";
    const HEADERS: &'static [&'static str] = &["categoryId", "name", "description"];

    fn key(&self) -> &str {
        &self.category_id
    }

    fn from_record(record: &StringRecord) -> Result<Self> {
        let f = |idx, column| super::field(record, idx, Self::FILE_NAME, column);
        Ok(Self {
            category_id: f(0, "categoryId")?.to_string(),
            name: f(1, "name")?.to_string(),
            description: f(2, "description")?.to_string(),
        })
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.category_id.clone(),
            self.name.clone(),
            self.description.clone(),
        ]
    }
}
