use thiserror::Error;

/// Terminal failures of the unpackaging pipeline.
///
/// None of these are retried internally; every variant is reported
/// synchronously to the caller. A failed zip *probe* is not an error — it
/// selects the text path instead.
#[derive(Debug, Error)]
pub enum UnpackageError {
    /// A recursively-classified zip's `project.json` carries neither a
    /// `targets` key (sb3) nor an `objName` key (sb2).
    #[error("could not determine project type from project.json")]
    UnknownProjectType,

    /// A matched data URI lacks the `;base64,` marker.
    #[error("data URI is not base64 encoded")]
    DataUriNotBase64,

    /// A zip archive was opened but contained neither `project.json` nor
    /// `project.zip`/`project`.
    #[error("zip archive does not contain a project")]
    ZipMissingProject,

    /// Input was not a valid zip and no embedded-payload pattern matched.
    #[error("input is not a zip archive and no project was found in it")]
    NoProjectFound,

    /// A header-bearing base-85 blob had no comma-terminated, parseable
    /// length prefix.
    #[error("invalid base-85 length header")]
    InvalidLengthHeader,

    /// Input bytes could not be decoded as UTF-8 text when text decoding
    /// was required.
    #[error("input could not be decoded as text: {0}")]
    BlobRead(#[from] std::str::Utf8Error),

    /// `project.json` or an embedded manifest is not valid JSON.
    #[error("malformed project JSON: {0}")]
    ProjectJson(#[from] serde_json::Error),

    /// A data URI's payload is not valid base64.
    #[error("malformed base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// An entry of an already-opened archive could not be read.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UnpackageError>;
