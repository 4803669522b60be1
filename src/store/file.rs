//! Whole-file load, rewrite and append primitives

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::observability::Logger;
use crate::person::Person;

use super::errors::{StoreError, StoreResult};

/// Backing file used when the caller does not supply one.
pub const DEFAULT_STORE_PATH: &str = "data/persons.txt";

/// The full record set as loaded from the backing file.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    /// Successfully decoded persons, in file order
    pub persons: Vec<Person>,
    /// Number of non-blank lines that failed to decode and were dropped
    pub dropped_lines: usize,
}

impl LoadedRecords {
    /// Finds a person by identifier.
    pub fn find(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    /// Finds a person by identifier, mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Person> {
        self.persons.iter_mut().find(|p| p.id == id)
    }
}

/// Store over a single line-oriented text file.
#[derive(Debug, Clone)]
pub struct PersonStore {
    path: PathBuf,
}

impl PersonStore {
    /// Creates a store over the given backing file. The file itself is
    /// not touched until the first load, rewrite or append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full record set from the backing file.
    ///
    /// A missing file yields an empty set. Blank lines are ignored.
    /// Malformed lines are dropped, counted and reported with a single
    /// `RECORD_LINE_DROPPED` warning per load.
    ///
    /// # Errors
    ///
    /// Returns `REG_STORE_READ_FAILED` if the file exists but cannot be
    /// read.
    pub fn load(&self) -> StoreResult<LoadedRecords> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedRecords::default())
            }
            Err(e) => {
                return Err(StoreError::read_failed(
                    format!("failed to read {}", self.path.display()),
                    e,
                ))
            }
        };

        let mut loaded = LoadedRecords::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Person::decode_line(line) {
                Ok(person) => loaded.persons.push(person),
                Err(_) => loaded.dropped_lines += 1,
            }
        }

        if loaded.dropped_lines > 0 {
            Logger::warn(
                "RECORD_LINE_DROPPED",
                &[
                    ("count", &loaded.dropped_lines.to_string()),
                    ("path", &self.path.display().to_string()),
                ],
            );
        }

        Ok(loaded)
    }

    /// Replaces the entire backing file with the given record set, one
    /// encoded line per person, trailing newline per line.
    ///
    /// # Errors
    ///
    /// Returns `REG_STORE_WRITE_FAILED` if the directory cannot be
    /// created or the file cannot be written.
    pub fn rewrite(&self, persons: &[Person]) -> StoreResult<()> {
        self.ensure_parent_dir()?;

        let mut contents = String::new();
        for person in persons {
            contents.push_str(&person.encode_line());
            contents.push('\n');
        }

        fs::write(&self.path, contents).map_err(|e| {
            StoreError::write_failed(format!("failed to rewrite {}", self.path.display()), e)
        })
    }

    /// Appends exactly one encoded line to the backing file, creating it
    /// if missing.
    ///
    /// # Errors
    ///
    /// Returns `REG_STORE_WRITE_FAILED` if the directory cannot be
    /// created or the line cannot be written.
    pub fn append(&self, person: &Person) -> StoreResult<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                StoreError::write_failed(format!("failed to open {}", self.path.display()), e)
            })?;

        let mut line = person.encode_line();
        line.push('\n');
        file.write_all(line.as_bytes()).map_err(|e| {
            StoreError::write_failed(format!("failed to append to {}", self.path.display()), e)
        })
    }

    fn ensure_parent_dir(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::write_failed(
                        format!("failed to create directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_person(id: &str) -> Person {
        Person::new(
            id,
            "John",
            "Doe",
            "32|Highland Street|Melbourne|Victoria|Australia",
            "15-11-1990",
        )
    }

    fn store_in(dir: &TempDir) -> PersonStore {
        PersonStore::new(dir.path().join("persons.txt"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let loaded = store.load().unwrap();
        assert!(loaded.persons.is_empty());
        assert_eq!(loaded.dropped_lines, 0);
    }

    #[test]
    fn test_append_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append(&sample_person("56s_d%&fAB")).unwrap();
        store.append(&sample_person("78#$%@*ABC")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.persons.len(), 2);
        assert!(loaded.find("56s_d%&fAB").is_some());
        assert!(loaded.find("78#$%@*ABC").is_some());
    }

    #[test]
    fn test_append_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = PersonStore::new(dir.path().join("nested").join("persons.txt"));
        store.append(&sample_person("56s_d%&fAB")).unwrap();
        assert_eq!(store.load().unwrap().persons.len(), 1);
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append(&sample_person("56s_d%&fAB")).unwrap();
        store.append(&sample_person("78#$%@*ABC")).unwrap();

        store.rewrite(&[sample_person("29!@#$%XYZ")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.persons.len(), 1);
        assert_eq!(loaded.persons[0].id, "29!@#$%XYZ");
    }

    #[test]
    fn test_one_line_per_person_with_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .rewrite(&[sample_person("56s_d%&fAB"), sample_person("78#$%@*ABC")])
            .unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_malformed_lines_dropped_and_counted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.append(&sample_person("56s_d%&fAB")).unwrap();

        let mut contents = fs::read_to_string(store.path()).unwrap();
        contents.push_str("this is not a record\n");
        contents.push_str("\n");
        fs::write(store.path(), contents).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.persons.len(), 1);
        assert_eq!(loaded.dropped_lines, 1);
    }

    #[test]
    fn test_read_failure_is_distinct() {
        let dir = TempDir::new().unwrap();
        // The path is a directory, so reading it as a file fails.
        let store = PersonStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert_eq!(err.code(), crate::store::StoreErrorCode::ReadFailed);
    }
}
