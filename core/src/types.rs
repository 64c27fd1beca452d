//! Domain DTOs for the board API.
//!
//! # Design
//! These types mirror the mock server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Login payload. Sent to the server exactly as built, field for field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::default()
            .with_field("username", username.into())
            .with_field("password", password.into())
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Credentials {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub name: String,
    pub section: Option<i64>,
}

/// A user together with the ids of their posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub section: Option<i64>,
    #[serde(rename = "isStudent")]
    pub is_student: bool,
    pub datemade: DateTime<Utc>,
    #[serde(default)]
    pub posts: Vec<i64>,
}

/// A message on the global board or in a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub author: i64,
    pub author_name: String,
    pub date_made: DateTime<Utc>,
}

/// Request payload for posting a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage<'a> {
    pub content: &'a str,
}

/// `{"error": "..."}` body returned by login and section access checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
