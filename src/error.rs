//! Error and degraded-state types.
//!
//! Nothing in the scoring paths fails hard. Table sources can still be missing or
//! broken, so loaders report a [`TableError`], and fail-soft constructors turn it into
//! a [`Degraded`] marker carried next to the value they managed to build.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported table format for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },
}

impl TableError {
    pub fn is_missing_source(&self) -> bool {
        matches!(self, TableError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// A soft failure that was absorbed while building an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degraded {
    /// Source file does not exist; the table is empty.
    MissingSource { path: String },
    /// Source exists but could not be read or parsed; the table is empty.
    MalformedSource { origin: String, reason: String },
    /// A single row was dropped (e.g. non-finite score, empty key).
    DroppedRow { table: String, reason: String },
}

impl Degraded {
    pub(crate) fn from_table_error(err: &TableError) -> Self {
        match err {
            TableError::Read { path, .. } if err.is_missing_source() => Degraded::MissingSource {
                path: path.display().to_string(),
            },
            TableError::Read { path, .. } | TableError::UnsupportedFormat { path } => {
                Degraded::MalformedSource {
                    origin: path.display().to_string(),
                    reason: err.to_string(),
                }
            }
            TableError::Toml { origin, .. } | TableError::Json { origin, .. } => {
                Degraded::MalformedSource {
                    origin: origin.clone(),
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// A value built in fail-soft mode plus everything that went wrong on the way.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub degraded: Vec<Degraded>,
}

impl<T> Loaded<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degraded: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            degraded: self.degraded,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_missing_source() {
        let err = TableError::Read {
            path: PathBuf::from("nope.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_missing_source());
        assert_eq!(
            Degraded::from_table_error(&err),
            Degraded::MissingSource {
                path: "nope.toml".into()
            }
        );
    }

    #[test]
    fn permission_error_is_malformed_not_missing() {
        let err = TableError::Read {
            path: PathBuf::from("locked.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(matches!(
            Degraded::from_table_error(&err),
            Degraded::MalformedSource { .. }
        ));
    }
}
