//! Final rendering of error responses.
//!
//! Handlers fail with [`AppError`](crate::error::AppError), which leaves an
//! [`ErrorReport`] in the response extensions. This layer re-renders those
//! bodies with the request id and, in development, the raw detail. Error
//! responses produced outside handlers (extractor rejections, unknown routes,
//! timeouts, panics) are wrapped into the same envelope. JSON error bodies
//! without a report are passed through untouched; the payment webhook relies
//! on this for its bare `{error}` responses.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ErrorKind, ErrorReport};
use crate::state::AppState;

/// Largest non-JSON error body kept as detail.
const MAX_DETAIL_BYTES: usize = 4096;

pub async fn render_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let report = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => report,
        None if is_json(&response) => return response,
        None => {
            let kind = ErrorKind::from_status(status);
            let body = to_bytes(response.into_body(), MAX_DETAIL_BYTES)
                .await
                .unwrap_or_default();
            let detail = String::from_utf8_lossy(&body).trim().to_string();
            tracing::debug!(%status, detail = %detail, "Wrapping non-handler error response");
            let report = ErrorReport {
                detail: (!detail.is_empty()).then_some(detail),
                ..ErrorReport::new(kind)
            };
            return render(report, request_id, state.config.app_env.is_development(), None);
        }
    };

    render(
        report,
        request_id,
        state.config.app_env.is_development(),
        Some(response),
    )
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Build the envelope response, reusing the original headers when present.
fn render(
    report: ErrorReport,
    request_id: Option<String>,
    development: bool,
    original: Option<Response>,
) -> Response {
    let body = report.body(request_id, development);
    let bytes = serde_json::to_vec(&body).unwrap_or_default();

    let mut response = match original {
        Some(original) => {
            let (mut parts, _) = original.into_parts();
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        None => Response::new(Body::from(bytes)),
    };
    *response.status_mut() = report.kind.status();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
