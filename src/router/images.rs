//! Image upload endpoint.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::middleware::Identity;

#[derive(Debug, Deserialize)]
pub struct Params {
    filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub url: String,
}

/// Handler to upload an image and get back the URL it is served from.
///
/// Raw bytes in, URL out; the primary host is tried first and local
/// storage catches its failures.
pub async fn handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<(StatusCode, Json<Response>)> {
    identity.require()?;

    let url = state.images.upload(body.to_vec(), &params.filename).await?;

    Ok((StatusCode::CREATED, Json(Response { url })))
}
