use std::sync::Arc;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State as AxumState,
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    state::State,
    upstream::{caller_auth, client_credential},
    utils::{decode_login, default_content_disposition, get_basic_credential, get_file_query},
};

/// `POST /api/getfile`: one `GetFile` call, body streamed straight through.
pub async fn file_handler(
    AxumState(state): AxumState<Arc<State>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let query = get_file_query(&body)?;
    let caller = caller_auth(&query.login, &query.password)?;

    info!(
        login = %query.login,
        metod = %query.metod,
        number = %query.number,
        "GetFile request"
    );

    let upstream = state
        .upstream
        .get_file(caller, &query.metod, &query.number)
        .await
        .inspect_err(|e| error!("GetFile unreachable: {e}"))?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();

    if !status.is_success() {
        warn!("GetFile upstream responded with {status}");

        return Err(AppError::UpstreamHttp {
            status,
            content_type,
            body: upstream.bytes().await?,
        });
    }

    let content_disposition = upstream
        .headers()
        .get(CONTENT_DISPOSITION)
        .cloned()
        .unwrap_or_else(|| default_content_disposition(&query.metod, &query.number));

    info!("GetFile upstream responded with {status}, streaming body");

    // Dropping the body (client gone) drops the upstream response with it. An
    // error mid-stream makes hyper close the connection since headers are out.
    let stream = upstream.bytes_stream().map_err(|e| {
        error!("GetFile stream failed: {e}");
        AppError::StreamingFailure(e)
    });

    Ok((
        StatusCode::OK,
        [
            (
                CONTENT_TYPE,
                content_type
                    .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream")),
            ),
            (CONTENT_DISPOSITION, content_disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// `GET /api/perevozki`: one `GetPerevozki` call for the configured range.
pub async fn perevozki_handler(
    AxumState(state): AxumState<Arc<State>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let credential = get_basic_credential(&headers)?;

    match decode_login(credential) {
        Some(login) => info!(login = %login, "GetPerevozki request"),
        None => warn!("GetPerevozki request with undecodable credential"),
    }

    let credential = client_credential(credential)?;

    let upstream = state
        .upstream
        .get_perevozki(credential)
        .await
        .inspect_err(|e| error!("GetPerevozki unreachable: {e}"))?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();

    // Read in full so a timeout here still ends as a clean 500.
    let body = upstream
        .bytes()
        .await
        .inspect_err(|e| error!("GetPerevozki body failed: {e}"))?;

    if !status.is_success() {
        warn!("GetPerevozki upstream responded with {status}");

        if body.is_empty() {
            return Ok((
                status,
                Json(json!({ "message": format!("Upstream responded with {status}") })),
            )
                .into_response());
        }

        return Err(AppError::UpstreamHttp {
            status,
            content_type,
            body,
        });
    }

    info!("GetPerevozki upstream responded with {status}, {} bytes", body.len());

    Ok((
        status,
        [(
            CONTENT_TYPE,
            content_type.unwrap_or_else(|| HeaderValue::from_static("application/json")),
        )],
        body,
    )
        .into_response())
}

pub async fn post_only() -> AppError {
    AppError::MethodNotAllowed {
        allow: Method::POST,
    }
}

pub async fn get_only() -> AppError {
    AppError::MethodNotAllowed { allow: Method::GET }
}
