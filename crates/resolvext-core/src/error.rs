use std::path::PathBuf;
use thiserror::Error;

/// Core error type for resolvext operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to resolve path: {base}")]
    UnresolvedPath { specifier: String, base: PathBuf },

    #[error("Failed to resolve module: {specifier} (imported from {file})")]
    UnresolvedModule { specifier: String, file: PathBuf },

    #[error("Package not found: {name} (searched from {from})")]
    PackageNotFound { name: String, from: PathBuf },

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stable code for machine-readable reports.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::ConfigRead { .. } => "CONFIG_READ",
            Self::ConfigParse { .. } => "CONFIG_PARSE",
            Self::Configuration(_) => "CONFIGURATION",
            Self::UnresolvedPath { .. } => "UNRESOLVED_PATH",
            Self::UnresolvedModule { .. } => "UNRESOLVED_MODULE",
            Self::PackageNotFound { .. } => "PACKAGE_NOT_FOUND",
            Self::ManifestRead { .. } => "MANIFEST_READ",
            Self::ManifestParse { .. } => "MANIFEST_PARSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_path_message_names_base() {
        let err = Error::UnresolvedPath {
            specifier: "./missing".to_string(),
            base: PathBuf::from("/project/src/missing"),
        };
        assert_eq!(err.to_string(), "Failed to resolve path: /project/src/missing");
        assert_eq!(err.code(), "UNRESOLVED_PATH");
    }

    #[test]
    fn test_configuration_helper() {
        let err = Error::configuration("unknown entry kind: foo");
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("unknown entry kind"));
    }
}
