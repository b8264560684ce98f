use thiserror::Error;

/// Convenience alias for `Result<T, ErrorCode>`.
pub type KvsResult<T> = Result<T, ErrorCode>;

/// Closed error set of the store.
///
/// Every fallible operation returns one of these codes. The message strings
/// are part of the external contract and must not change between versions;
/// callers are allowed to match on the rendered text.
///
/// Subsystems map their native errors into this set at a single boundary:
/// filesystem errors become `PhysicalStorageFailure` inside the storage
/// layer (except where absence has its own meaning), codec errors become
/// `JsonParserError`/`JsonGeneratorError` at the engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Native error with no mapping yet; always worth a log line.
    #[error("Error that was not yet mapped")]
    UnmappedError,

    #[error("File not found")]
    FileNotFound,

    /// The `.json` file of a generation could not be read although required.
    #[error("KVS file read error")]
    KvsFileReadError,

    /// The `.hash` companion is absent or shorter than its 4 bytes.
    #[error("KVS hash file read error")]
    KvsHashFileReadError,

    #[error("JSON parser error")]
    JsonParserError,

    #[error("JSON generator error")]
    JsonGeneratorError,

    #[error("Physical storage failure")]
    PhysicalStorageFailure,

    #[error("Integrity corrupted")]
    IntegrityCorrupted,

    /// Stored checksum does not match the file contents.
    #[error("Validation failed")]
    ValidationFailed,

    /// Reserved: encryption at rest is not implemented.
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Resource is busy")]
    ResourceBusy,

    #[error("Out of storage space")]
    OutOfStorageSpace,

    #[error("Quota exceeded")]
    QuotaExceeded,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Key default value not found")]
    KeyDefaultNotFound,

    #[error("Serialization failed")]
    SerializationFailed,

    #[error("Invalid snapshot ID")]
    InvalidSnapshotId,

    #[error("Conversion failed")]
    ConversionFailed,

    /// The instance lock could not be taken instantly (try-lock policy).
    #[error("Mutex failed")]
    MutexLockFailed,

    /// A value or tagged document violates the value model.
    #[error("Invalid value type")]
    InvalidValueType,
}

impl From<std::io::Error> for ErrorCode {
    fn from(cause: std::io::Error) -> Self {
        match cause.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            kind => {
                tracing::warn!("unmapped io error: {kind}");
                ErrorCode::UnmappedError
            }
        }
    }
}
