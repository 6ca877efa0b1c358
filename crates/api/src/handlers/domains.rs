//! Domain suggestions for the questionnaire's domain step.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use webdash_core::domains::{affordable_offers, estimate_price, status_is_available, DomainOffer, MAX_PRICE_USD};
use webdash_core::error::FieldError;
use webdash_core::questionnaire::answers::is_valid_domain;
use webdash_services::domains::DomainLookupError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Candidates checked per search.
const MAX_CANDIDATES: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub domains: Vec<DomainOffer>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub domain: String,
    pub available: bool,
    pub price_usd: f64,
    pub affordable: bool,
}

/// GET /api/v1/domains/search?query=
///
/// Returns only names that are free to register and within the plan's
/// price ceiling.
pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<SearchResponse>>> {
    let query = params.query.trim().to_string();
    if query.is_empty() {
        return Err(FieldError::new("query", "Enter a name to search for").into());
    }

    let mut candidates = state.domains.search(&query).await.map_err(lookup_error)?;
    candidates.truncate(MAX_CANDIDATES);
    let statuses = if candidates.is_empty() {
        Vec::new()
    } else {
        state.domains.status(&candidates).await.map_err(lookup_error)?
    };

    let domains = affordable_offers(
        statuses
            .iter()
            .map(|s| (s.domain.as_str(), s.status.as_str())),
    );
    tracing::debug!(query = %query, candidates = candidates.len(), offered = domains.len(), "Domain search");
    Ok(ApiResponse::ok(SearchResponse { query, domains }))
}

/// GET /api/v1/domains/status?domain=
pub async fn status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<StatusParams>,
) -> AppResult<Json<ApiResponse<StatusResponse>>> {
    let domain = params.domain.trim().to_ascii_lowercase();
    if !is_valid_domain(&domain) {
        return Err(FieldError::new("domain", "Enter a valid domain name, such as example.com").into());
    }

    let statuses = state
        .domains
        .status(std::slice::from_ref(&domain))
        .await
        .map_err(lookup_error)?;
    let available = statuses
        .iter()
        .find(|s| s.domain.eq_ignore_ascii_case(&domain))
        .is_some_and(|s| status_is_available(&s.status));
    let price_usd = estimate_price(&domain);

    Ok(ApiResponse::ok(StatusResponse {
        domain,
        available,
        price_usd,
        affordable: price_usd <= MAX_PRICE_USD,
    }))
}

fn lookup_error(err: DomainLookupError) -> AppError {
    AppError::InternalError(format!("Domain lookup failed: {err}"))
}
