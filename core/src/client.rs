//! Stateless HTTP request builder and response parser for the board API.
//!
//! # Design
//! `BoardClient` holds only a base URL and an optional auth token, both fixed
//! at construction. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Identifiers are interpolated into paths as-is: no
//! validation, no escaping. An id containing `/` therefore yields extra path
//! segments, which the server answers with 404.
//!
//! Any 2xx status counts as success; the body is then decoded as the
//! operation's result type.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, LoginResponse, NewMessage, Post, UserProfile};

/// Synchronous, stateless client for the board API.
#[derive(Debug, Clone)]
pub struct BoardClient {
    base_url: String,
    token: Option<String>,
}

impl BoardClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Returns a client that sends `Authorization: Token <token>` on every
    /// request it builds.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request("/", credentials)
    }

    pub fn build_get_user_profile(&self, user_id: impl Display) -> HttpRequest {
        self.get(&format!("/user/{user_id}/"))
    }

    pub fn build_get_global_messages(&self) -> HttpRequest {
        self.get("/board/")
    }

    pub fn build_post_global_message(&self, content: &str) -> Result<HttpRequest, ApiError> {
        self.json_request("/board/post/", &NewMessage { content })
    }

    pub fn build_get_section_messages(&self, section_id: impl Display) -> HttpRequest {
        self.get(&format!("/section/{section_id}/"))
    }

    pub fn build_post_section_message(
        &self,
        section_id: impl Display,
        content: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(
            &format!("/section/{section_id}/post/"),
            &NewMessage { content },
        )
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_user_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    /// Parses either message listing (global or section).
    pub fn parse_messages(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    /// Parses either message creation response (global or section).
    pub fn parse_created_message(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{path}", self.base_url),
            headers: self.auth_headers(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        headers.extend(self.auth_headers());
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{path}", self.base_url),
            headers,
            body: Some(body),
        })
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        match &self.token {
            Some(token) => vec![("authorization".to_string(), format!("Token {token}"))],
            None => Vec::new(),
        }
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BoardClient {
        BoardClient::new("http://localhost:8000")
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn build_login_posts_credentials_verbatim() {
        let creds = Credentials::new("alice", "alice-pass").with_field("device", "kiosk-2");
        let req = client().build_login(&creds).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(
            body_json(&req),
            serde_json::json!({"username": "alice", "password": "alice-pass", "device": "kiosk-2"})
        );
    }

    #[test]
    fn build_get_user_profile_interpolates_id() {
        let req = client().build_get_user_profile(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/user/42/");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_user_profile_does_not_escape_slashes() {
        let req = client().build_get_user_profile("1/2");
        assert_eq!(req.path, "http://localhost:8000/user/1/2/");
    }

    #[test]
    fn build_get_global_messages_produces_correct_request() {
        let req = client().build_get_global_messages();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/board/");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_post_global_message_wraps_content() {
        let req = client().build_post_global_message("hello").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/board/post/");
        assert_eq!(body_json(&req), serde_json::json!({"content": "hello"}));
    }

    #[test]
    fn build_section_requests_use_section_id() {
        let get = client().build_get_section_messages("7");
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.path, "http://localhost:8000/section/7/");

        let post = client().build_post_section_message(7, "quiz moved").unwrap();
        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.path, "http://localhost:8000/section/7/post/");
        assert_eq!(body_json(&post), serde_json::json!({"content": "quiz moved"}));
    }

    #[test]
    fn token_adds_authorization_header() {
        let authed = client().with_token("abc123");
        let req = authed.build_get_global_messages();
        assert_eq!(req.header("authorization"), Some("Token abc123"));

        let post = authed.build_post_global_message("hi").unwrap();
        assert_eq!(post.header("content-type"), Some("application/json"));
        assert_eq!(post.header("authorization"), Some("Token abc123"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = BoardClient::new("http://localhost:8000/api/");
        let req = client.build_get_global_messages();
        assert_eq!(req.path, "http://localhost:8000/api/board/");
    }

    #[test]
    fn parse_login_success() {
        let response = HttpResponse::new(
            200,
            r#"{"token":"t0k","user_id":1,"name":"Alice","section":1}"#,
        );
        let login = client().parse_login(response).unwrap();
        assert_eq!(login.token, "t0k");
        assert_eq!(login.section, Some(1));
    }

    #[test]
    fn parse_login_unauthorized_keeps_body() {
        let response = HttpResponse::new(401, r#"{"error":"Invalid credentials"}"#);
        let err = client().parse_login(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 401, .. }));
        assert_eq!(err.server_message().as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn parse_user_profile_not_found() {
        let response = HttpResponse::new(404, r#"{"detail":"Not found."}"#);
        let err = client().parse_user_profile(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_messages_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":2,"content":"second","author":1,"author_name":"Alice",
                "date_made":"2024-03-01T10:00:00Z"},
               {"id":1,"content":"first","author":1,"author_name":"Alice",
                "date_made":"2024-03-01T09:00:00Z"}]"#,
        );
        let posts = client().parse_messages(response).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].content, "second");
    }

    #[test]
    fn parse_messages_bad_json() {
        let response = HttpResponse::new(200, "not json");
        let err = client().parse_messages(response).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_created_message_accepts_any_2xx() {
        let body = r#"{"id":5,"content":"hi","author":1,"author_name":"Alice",
            "date_made":"2024-03-01T09:00:00Z"}"#;
        for status in [200, 201, 202] {
            let post = client()
                .parse_created_message(HttpResponse::new(status, body))
                .unwrap();
            assert_eq!(post.id, 5, "{status}");
        }

        for status in [199, 300, 400] {
            let err = client()
                .parse_created_message(HttpResponse::new(status, body))
                .unwrap_err();
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn parse_messages_accepts_non_200_success() {
        let posts = client()
            .parse_messages(HttpResponse::new(203, "[]"))
            .unwrap();
        assert!(posts.is_empty());

        let err = client()
            .parse_messages(HttpResponse::new(302, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 302, .. }));
    }
}
