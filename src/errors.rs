use crate::config::Resource;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure to fetch or parse one of the source datasets.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {resource}: {source}")]
    Fetch {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {resource} returned HTTP {status}")]
    Status {
        resource: Resource,
        status: u16,
    },
    #[error("malformed CSV in {resource}: {source}")]
    Csv {
        resource: Resource,
        #[source]
        source: csv::Error,
    },
    #[error("{resource} is missing column `{column}`")]
    MissingColumn {
        resource: Resource,
        column: &'static str,
    },
    #[error("{resource} has an invalid date `{value}`")]
    InvalidDate {
        resource: Resource,
        value: String,
    },
}

impl LoadError {
    pub fn resource(&self) -> Resource {
        match self {
            LoadError::Fetch { resource, .. }
            | LoadError::Status { resource, .. }
            | LoadError::Csv { resource, .. }
            | LoadError::MissingColumn { resource, .. }
            | LoadError::InvalidDate { resource, .. } => *resource,
        }
    }
}
