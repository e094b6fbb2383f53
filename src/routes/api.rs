//! `/api` routes and their guard

use crate::routes::guard_ids;
use async_trait::async_trait;
use axum::{Extension, Json, http::header};
use route_guards::BoxError;
use route_guards::guard::Guard;
use route_guards::http::{HttpGuards, Parts};
use serde_json::{Value, json};

/// Requires `Authorization: Bearer <token>`
pub struct BearerGuard {
    expected: String,
}

impl BearerGuard {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            expected: format!("Bearer {}", token.as_ref()),
        }
    }
}

#[async_trait]
impl Guard<Parts> for BearerGuard {
    async fn check(&self, parts: &Parts) -> Result<bool, BoxError> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        Ok(header == Some(self.expected.as_str()))
    }
}

pub async fn list_users(Extension(guards): Extension<HttpGuards>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "There are no users",
        "guards": guard_ids(&guards),
    }))
}
