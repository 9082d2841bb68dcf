use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use folio_common::FolioError;
use std::fmt;

use crate::types::ErrorResponse;

/// HTTP wrapper around [`FolioError`]
#[derive(Debug)]
pub struct ApiError(pub FolioError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.to_string(),
        })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
