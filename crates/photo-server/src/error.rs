//! Error types for the photo server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use photo_catalog::CatalogError;
use serde_json::json;
use std::fmt;

pub const LIST_FAILED: &str = "Erro ao listar imagens.";
pub const IMAGE_NOT_FOUND: &str = "Imagem não encontrada.";
pub const RETRIEVE_FAILED: &str = "Erro ao recuperar imagem.";

/// Startup failures
#[derive(Debug)]
pub enum ServerError {
    Catalog(CatalogError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Catalog(err) => write!(f, "Catalog error: {}", err),
            ServerError::Io(err) => write!(f, "IO error: {}", err),
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Catalog(err) => Some(err),
            ServerError::Io(err) => Some(err.as_ref()),
            ServerError::Config(_) => None,
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(err: CatalogError) -> Self {
        ServerError::Catalog(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Request failure, rendered as `{"error": message}`
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    /// `message` goes to the client, `cause` only to the log
    Internal {
        message: &'static str,
        cause: String,
    },
}

impl AppError {
    pub fn listing(cause: CatalogError) -> Self {
        AppError::Internal {
            message: LIST_FAILED,
            cause: cause.to_string(),
        }
    }

    pub fn retrieval(cause: CatalogError) -> Self {
        match cause {
            CatalogError::NotFound(_) => AppError::NotFound(IMAGE_NOT_FOUND.to_string()),
            cause => AppError::Internal {
                message: RETRIEVE_FAILED,
                cause: cause.to_string(),
            },
        }
    }

    /// An id segment with no leading digits
    pub fn invalid_id(segment: &str) -> Self {
        AppError::Internal {
            message: RETRIEVE_FAILED,
            cause: format!("id {:?} is not a number", segment),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal { message, cause } => {
                tracing::error!(error = %cause, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
