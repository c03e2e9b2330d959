use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use crate::error::AppError;

/// `Json` whose rejections render through `AppError` as 400 `VALIDATION_ERROR`.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}
