use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use webdash_core::error::{CoreError, FieldError};
use webdash_db::StoreError;

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Public error categories. Every failed request maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Authentication,
    Authorization,
    Validation,
    NotFound,
    RateLimit,
    ServerError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Canned message shown to clients.
    pub fn public_message(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication required",
            Self::Authorization => "You do not have permission to perform this action",
            Self::Validation => "Invalid request data",
            Self::NotFound => "Resource not found",
            Self::RateLimit => "Too many requests. Please try again later",
            Self::ServerError => "An internal error occurred",
        }
    }

    /// Category for a response that did not come from [`AppError`]
    /// (extractor rejections, unknown routes, panics, timeouts).
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 | 405 => Self::NotFound,
            429 => Self::RateLimit,
            400..=499 if status != StatusCode::REQUEST_TIMEOUT => Self::Validation,
            _ => Self::ServerError,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// `{success:false, error, message?, fields?, requestId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// What went wrong, carried in response extensions so the envelope
/// middleware can add the request id and, in development, the raw detail.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// Message written for the end user (validation feedback).
    pub public_detail: Option<String>,
    /// Raw internal detail. Logged, and echoed only in development.
    pub detail: Option<String>,
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            public_detail: None,
            detail: None,
            fields: None,
        }
    }

    pub fn body(&self, request_id: Option<String>, development: bool) -> ErrorBody {
        let message = match (&self.public_detail, development) {
            (Some(public), _) => Some(public.clone()),
            (None, true) => self.detail.clone(),
            (None, false) => None,
        };
        ErrorBody {
            success: false,
            error: self.kind.public_message(),
            message,
            fields: self.fields.clone(),
            request_id,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.kind.status();
        let body = self.body(None, false);
        let mut response = (status, axum::Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed input, with a message written for the end user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Core(CoreError::from(err))
    }
}

impl AppError {
    pub fn report(&self) -> ErrorReport {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorReport {
                    detail: Some(format!("{entity} with id {id} not found")),
                    ..ErrorReport::new(ErrorKind::NotFound)
                },
                CoreError::Validation(msg) => ErrorReport {
                    public_detail: Some(msg.clone()),
                    ..ErrorReport::new(ErrorKind::Validation)
                },
                CoreError::InvalidFields(fields) => ErrorReport {
                    public_detail: fields.first().map(|f| f.message.clone()),
                    fields: Some(fields.clone()),
                    ..ErrorReport::new(ErrorKind::Validation)
                },
                CoreError::Unauthorized(msg) => ErrorReport {
                    detail: Some(msg.clone()),
                    ..ErrorReport::new(ErrorKind::Authentication)
                },
                CoreError::Forbidden(msg) => ErrorReport {
                    detail: Some(msg.clone()),
                    ..ErrorReport::new(ErrorKind::Authorization)
                },
                CoreError::RateLimited(msg) => ErrorReport {
                    detail: Some(msg.clone()),
                    ..ErrorReport::new(ErrorKind::RateLimit)
                },
                CoreError::Internal(msg) => server_error(msg),
            },
            AppError::Store(StoreError::Conflict(constraint)) => ErrorReport {
                public_detail: Some("A record with this value already exists".into()),
                detail: Some(format!("Unique constraint violated: {constraint}")),
                ..ErrorReport::new(ErrorKind::Validation)
            },
            AppError::Store(StoreError::Database(err)) => server_error(&err.to_string()),
            AppError::BadRequest(msg) => ErrorReport {
                public_detail: Some(msg.clone()),
                ..ErrorReport::new(ErrorKind::Validation)
            },
            AppError::InternalError(msg) => server_error(msg),
        }
    }
}

fn server_error(detail: &str) -> ErrorReport {
    tracing::error!(error = %detail, "Internal error");
    ErrorReport {
        detail: Some(detail.to_string()),
        ..ErrorReport::new(ErrorKind::ServerError)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report().into_response()
    }
}
