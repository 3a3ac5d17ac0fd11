use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by token sources, the transport and the project resolver.
///
/// Every variant is terminal for the call that produced it, nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The discovered credentials cannot mint identity tokens directly.
    /// Used as the trigger for the default-credentials fallback.
    #[error("idtoken: unsupported credentials type: {0}")]
    UnsupportedCredentials(String),

    #[error("{context}: {source}")]
    CredentialConstruction {
        context: String,
        #[source]
        source: Box<Error>,
    },

    #[error("could not find default credentials: {0}")]
    CredentialsNotFound(String),

    #[error("token did not contain an id_token")]
    MissingIdentityClaim,

    #[error("token request to {url} failed: {status}: {body}")]
    TokenFetch {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to create token source: {0}")]
    CreateTokenSource(#[source] Box<Error>),

    #[error("failed to get token: {0}")]
    GetToken(#[source] Box<Error>),

    #[error("project id: {0}")]
    MetadataLookup(#[source] Box<Error>),

    #[error("metadata request to {url} failed: {status}")]
    MetadataStatus { url: String, status: u16 },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    pub fn credential_construction(context: impl Into<String>, source: Error) -> Self {
        Error::CredentialConstruction {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True when the error means "this mechanism cannot handle these credentials".
    pub fn is_unsupported_credentials(&self) -> bool {
        matches!(self, Error::UnsupportedCredentials(_))
    }
}
