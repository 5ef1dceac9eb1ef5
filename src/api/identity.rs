use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use std::convert::Infallible;

use super::AppState;

/// Header the upstream authentication layer uses for the caller's username
/// unless configured otherwise
pub const DEFAULT_IDENTITY_HEADER: &str = "x-authenticated-user";

/// The username established by whatever authenticated the request.
///
/// Absent when the header is missing or blank. Whether that is acceptable is
/// up to the catalog's ownership policy, not this extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller(pub Option<String>);

impl Caller {
    pub fn username(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(&state.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        Ok(Caller(username))
    }
}
