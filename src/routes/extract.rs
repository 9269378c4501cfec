use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};

use crate::error::AppError;

/// JSON body whose parse failures come back as [`AppError::Validation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Song id taken from the `{id}` path segment.
///
/// An id that is not a number cannot name a stored song, so it is rejected
/// as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongId(pub i64);

impl<S> FromRequestParts<S> for SongId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        raw.trim()
            .parse()
            .map(SongId)
            .map_err(|_| AppError::NotFound(format!("Song {} not found", raw)))
    }
}
