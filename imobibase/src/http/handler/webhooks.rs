use crate::service::webhook::WebhookVendors;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use imobibase_error::{bail, ErrorType, Result};
use serde::Serialize;
use siegel::VerifyError;

#[derive(Serialize)]
pub struct WebhookReceived {
    received: bool,
}

#[derive(Serialize)]
pub struct WebhookRejection {
    error: &'static str,
}

fn rejection_status(error: &VerifyError) -> StatusCode {
    match error {
        VerifyError::MissingSignature | VerifyError::InvalidSignatureFormat => {
            StatusCode::BAD_REQUEST
        }
        VerifyError::TimestampTooOld | VerifyError::InvalidSignature => StatusCode::UNAUTHORIZED,
    }
}

/// Signature verification runs over the raw body bytes, before anything
/// attempts to parse them
#[instrument(skip_all, fields(vendor = %vendor))]
pub async fn post(
    State(vendors): State<WebhookVendors>,
    Path(vendor): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let Some(vendor) = vendors.get(&vendor) else {
        bail!(type = ErrorType::NotFound, "Unknown webhook vendor");
    };

    let verdict = match headers.get(vendor.signature_header()) {
        Some(value) => match value.to_str() {
            Ok(header) => vendor.verify(&body, Some(header)),
            Err(..) => Err(VerifyError::InvalidSignatureFormat),
        },
        None => vendor.verify(&body, None),
    };

    if let Err(error) = verdict {
        debug!(code = error.code(), "webhook signature rejected");

        let rejection = WebhookRejection { error: error.code() };
        return Ok((rejection_status(&error), Json(rejection)).into_response());
    }

    Ok(Json(WebhookReceived { received: true }).into_response())
}
