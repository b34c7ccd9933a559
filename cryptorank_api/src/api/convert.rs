use actix_web::{Responder, HttpResponse};
use actix_web::body::Body;
use actix_web::http::StatusCode;
use log::{error, warn};

use crate::api::models::{ErrorResponse, RATE_LIMITED_MESSAGE, FETCH_FAILED_MESSAGE};
use crate::snapshot::SnapshotError;

pub trait ToResponse {
    type Output : Responder;
    fn to_response(&self) -> Self::Output;
}

impl ToResponse for SnapshotError {
    type Output = HttpResponse<Body>;
    fn to_response(&self) -> Self::Output {
        match self {
            SnapshotError::RateLimited => {
                warn!("Snapshot unavailable: {}", self);
                HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
                    .json(ErrorResponse::new(RATE_LIMITED_MESSAGE))
            },
            SnapshotError::UpstreamError { .. }
            | SnapshotError::EndpointError { .. } => {
                error!("Failed to serve snapshot: {}", self);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::new(FETCH_FAILED_MESSAGE))
            },
        }
    }
}
