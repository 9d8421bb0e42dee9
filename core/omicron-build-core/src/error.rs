//! Error taxonomy for manifest loading and library builds.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Output binary does not exist. ({}, library {library})", .path.display())]
    MissingBinary { library: String, path: PathBuf },

    #[error("instruction failed in {library}: `{command}` exited with {}", describe_code(.code))]
    InstructionFailed {
        library: String,
        command: String,
        code: Option<i32>,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::Io {
            context: context.into(),
            source,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
