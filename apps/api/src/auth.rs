//! Identity from the authenticating proxy in front of the service.
//!
//! Sign-in, sign-up and password reset happen at the identity provider. The service only
//! reads who the user is from trusted headers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CurrentUser {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            id: header(headers, USER_ID_HEADER)?,
            email: header(headers, USER_EMAIL_HEADER),
            name: header(headers, USER_NAME_HEADER),
        })
    }

    /// Display name, else email, else id.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        CurrentUser::from_headers(&parts.headers).ok_or(AppError::Unauthorized)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub label: String,
    pub email: Option<String>,
}

/// GET /api/v1/session
pub async fn handle_session(user: CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        label: user.label().to_string(),
        user_id: user.id,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_missing_id_is_anonymous() {
        assert!(CurrentUser::from_headers(&headers(&[(USER_EMAIL_HEADER, "a@b.com")])).is_none());
        assert!(CurrentUser::from_headers(&headers(&[(USER_ID_HEADER, "  ")])).is_none());
    }

    #[test]
    fn test_label_prefers_name_then_email() {
        let user = CurrentUser::from_headers(&headers(&[
            (USER_ID_HEADER, "u1"),
            (USER_EMAIL_HEADER, "jane@doe.io"),
        ]))
        .unwrap();
        assert_eq!(user.label(), "jane@doe.io");

        let named = CurrentUser {
            name: Some("Jane".into()),
            ..user.clone()
        };
        assert_eq!(named.label(), "Jane");

        let bare = CurrentUser {
            email: None,
            ..user
        };
        assert_eq!(bare.label(), "u1");
    }
}
