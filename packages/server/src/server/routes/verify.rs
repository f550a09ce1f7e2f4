//! Claim verification endpoint.
//!
//! POST /api/verify
//!
//! Body: `{"query", "claimType", "originalClaim"}`. Responds with the ranked
//! evidence, or `{"error"}` with 400 for bad input and 500 otherwise.
//!
//! A request that runs past the configured timeout has its crawl cancelled:
//! in-flight fetches finish and whatever pages they produced are ranked and
//! returned. With no pages at all the request fails with 500.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use tokio_util::sync::CancellationToken;

use verification::{VerifyRequest, VerifyResponse};

use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn verify_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let cancel = CancellationToken::new();
    let verify = state.verifier.verify_with_cancel(
        &request.query,
        request.claim_type,
        &request.original_claim,
        &cancel,
    );
    tokio::pin!(verify);

    let result = match tokio::time::timeout(state.verify_timeout, &mut verify).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                query = %request.query,
                timeout_secs = state.verify_timeout.as_secs_f64(),
                "Verification timed out, cancelling crawl"
            );
            cancel.cancel();
            verify.await
        }
    };

    let response = result?;
    tracing::info!(
        query = %response.query,
        total_found = response.total_found,
        "Verification complete"
    );
    Ok(Json(response))
}
