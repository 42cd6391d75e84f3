use axum::{
    extract::{FromRequest, Request},
    Json,
};

use crate::error::ApiError;

/// `Json` whose rejections (bad syntax, wrong types, missing content type)
/// come back as the usual `{error, message}` body.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}
