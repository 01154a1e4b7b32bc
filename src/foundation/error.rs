/// Convenience result alias used throughout the crate.
pub type BootAnimResult<T> = Result<T, BootAnimError>;

/// Why an archive could not be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerErrorKind {
    /// The file does not exist or cannot be read.
    NotFound,
    /// The file is shorter than a directory-end record.
    TooSmall,
    /// The directory-end record is missing or points outside the file.
    CorruptDirectory,
}

impl std::fmt::Display for ContainerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::TooSmall => "too small",
            Self::CorruptDirectory => "corrupt directory",
        };
        f.write_str(s)
    }
}

/// Error taxonomy of the boot animation engine.
///
/// `Container` and `Script` are fatal to one display's animated path; `Decode` and `Buffer` are
/// local to a single frame/display pair; `Incompatible` only downgrades the secondary display.
#[derive(thiserror::Error, Debug)]
pub enum BootAnimError {
    /// Archive open/directory-parse failure.
    #[error("container error ({kind}): {msg}")]
    Container {
        /// Failure class.
        kind: ContainerErrorKind,
        /// Human-readable detail.
        msg: String,
    },

    /// Missing or malformed `desc.txt`.
    #[error("script error: {0}")]
    Script(String),

    /// A single frame failed to decode.
    #[error("decode error: {0}")]
    Decode(String),

    /// A display buffer could not be acquired or locked.
    #[error("buffer error: {0}")]
    Buffer(String),

    /// Two descriptors cannot be played in lock-step.
    #[error("incompatible descriptors: {0}")]
    Incompatible(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O failure outside of archive loading.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootAnimError {
    /// Build a container error of the given kind.
    pub fn container(kind: ContainerErrorKind, msg: impl Into<String>) -> Self {
        Self::Container {
            kind,
            msg: msg.into(),
        }
    }

    /// Build a script error.
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Build a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a buffer error.
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    /// Build an incompatibility error.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::Incompatible(msg.into())
    }

    /// Build a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Container failure class, if this is a container error.
    pub fn container_kind(&self) -> Option<ContainerErrorKind> {
        match self {
            Self::Container { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
