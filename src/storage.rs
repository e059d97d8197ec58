//! Append-only CSV store for extracted contacts.
//!
//! The table lives in a single file with a fixed seven-column header. Each
//! successful extraction appends exactly one row; rows are never updated or
//! deleted. Appends are single-line writes serialized behind a mutex, so
//! concurrent requests cannot clobber each other's rows.

use crate::error::ExtractError;
use crate::schema::{ContactRecord, FIELDS};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

pub struct ContactStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the containing directory and the header-only table if absent.
    pub fn ensure_exists(&self) -> Result<(), ExtractError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if !self.path.exists() {
            let mut writer = csv::Writer::from_writer(File::create(&self.path)?);
            writer.write_record(FIELDS)?;
            writer.flush()?;
            info!(path = %self.path.display(), "created contact table");
        }

        Ok(())
    }

    /// Append one record as a single CSV row.
    pub fn append(&self, record: &ContactRecord) -> Result<(), ExtractError> {
        let _guard = self.write_lock.lock().unwrap();

        self.ensure_exists()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        Ok(())
    }

    /// Read every data row back, in append order.
    pub fn read_all(&self) -> Result<Vec<ContactRecord>, ExtractError> {
        let mut reader = csv::Reader::from_reader(File::open(&self.path)?);
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ContactStore {
        ContactStore::new(dir.path().join("contacts.csv"))
    }

    fn record(name: &str) -> ContactRecord {
        ContactRecord {
            name: Some(name.to_string()),
            title: Some("CEO".to_string()),
            company: Some("Acme".to_string()),
            email: Some("jane@acme.com".to_string()),
            phone: Some("555-1234".to_string()),
            website: Some("acme.com".to_string()),
            address: Some("1 Main St".to_string()),
        }
    }

    #[test]
    fn ensure_exists_writes_the_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();
        store.ensure_exists().unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "name,title,company,email,phone,website,address\n");
    }

    #[test]
    fn ensure_exists_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContactStore::new(dir.path().join("results/nested/contacts.csv"));
        store.ensure_exists().unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn n_appends_yield_n_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        for i in 0..5 {
            store.append(&record(&format!("Person {}", i))).unwrap();
        }

        let rows = store.read_all().unwrap();
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.name.as_deref(), Some(format!("Person {}", i).as_str()));
        }
    }

    #[test]
    fn append_creates_the_table_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append(&record("Jane")).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("name,title,company,email,phone,website,address\n"));
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn commas_and_quotes_survive_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let tricky = ContactRecord {
            name: Some(r#"Doe, Jane "JD""#.to_string()),
            address: Some("1 Main St, Suite 2\nSpringfield".to_string()),
            ..Default::default()
        };
        store.append(&tricky).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows[0].name, tricky.name);
        assert_eq!(rows[0].address, tricky.address);
    }

    #[test]
    fn absent_fields_round_trip_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .append(&ContactRecord {
                name: Some("Jane".to_string()),
                ..Default::default()
            })
            .unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("Jane"));
        assert_eq!(rows[0].phone, None);
        assert_eq!(rows[0].website, None);
    }

    #[test]
    fn unwritable_path_is_a_storage_error() {
        // A regular file where the parent directory should be.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let store = ContactStore::new(blocker.join("contacts.csv"));
        assert!(matches!(
            store.append(&record("Jane")),
            Err(ExtractError::Storage(_))
        ));
    }
}
