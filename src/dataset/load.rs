use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::parse::parse_people;
use super::person::Person;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed dataset {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_people(path: &Path) -> Result<Vec<Person>, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let people = parse_people(&raw).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    info!(people = people.len(), path = %path.display(), "loaded dataset");
    Ok(people)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_people(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(error, LoadError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("friends.json");
        fs::write(&path, r#"{"1": {"name": 5}}"#).expect("write dataset");

        let error = load_people(&path).unwrap_err();
        assert!(matches!(error, LoadError::Malformed { .. }));
        assert!(error.to_string().contains("friends.json"));
    }
}
