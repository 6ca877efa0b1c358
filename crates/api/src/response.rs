//! Success envelope shared by handlers.
//!
//! Every successful response is `{ "success": true, "data": ... }`. Use
//! [`ApiResponse::ok`] rather than ad-hoc `json!` bodies.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}
