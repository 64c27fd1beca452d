use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub name: String,
    pub section: Option<i64>,
    pub is_student: bool,
    pub datemade: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct Section {
    pub id: i64,
    pub adviser: Option<i64>,
    pub students: Vec<i64>,
}

#[derive(Clone, Debug)]
pub struct StoredPost {
    pub id: i64,
    pub content: String,
    pub author: i64,
    pub section: Option<i64>,
    pub date_made: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub author: i64,
    pub author_name: String,
    pub date_made: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub section: Option<i64>,
    #[serde(rename = "isStudent")]
    pub is_student: bool,
    pub datemade: DateTime<Utc>,
    pub posts: Vec<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub name: String,
    pub section: Option<i64>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: HashMap<i64, User>,
    pub sections: HashMap<i64, Section>,
    pub posts: Vec<StoredPost>,
    pub tokens: HashMap<String, i64>,
}

impl Store {
    /// Fixture data: two students in separate sections and an adviser for
    /// section 1 who is not allowed to log in.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let user = |id, username: &str, password: &str, name: &str, section, is_student| User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            section,
            is_student,
            datemade: now,
        };
        let mut store = Store::default();
        for u in [
            user(1, "alice", "alice-pass", "Alice Santos", Some(1), true),
            user(2, "bob", "bob-pass", "Bob Cruz", Some(2), true),
            user(3, "mr_reyes", "reyes-pass", "Mr. Reyes", None, false),
        ] {
            store.users.insert(u.id, u);
        }
        store.sections.insert(
            1,
            Section {
                id: 1,
                adviser: Some(3),
                students: vec![1],
            },
        );
        store.sections.insert(
            2,
            Section {
                id: 2,
                adviser: None,
                students: vec![2],
            },
        );
        store
    }

    fn token_for(&mut self, user_id: i64) -> String {
        if let Some((token, _)) = self.tokens.iter().find(|(_, id)| **id == user_id) {
            return token.clone();
        }
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn can_access(&self, user_id: i64, section: &Section) -> bool {
        let member = self
            .users
            .get(&user_id)
            .is_some_and(|u| u.section == Some(section.id));
        member || section.adviser == Some(user_id)
    }

    fn add_post(&mut self, author: i64, section: Option<i64>, content: String) -> StoredPost {
        let post = StoredPost {
            id: self.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            content,
            author,
            section,
            date_made: Utc::now(),
        };
        self.posts.push(post.clone());
        post
    }

    /// Posts matching `filter`, newest first.
    fn posts_where(&self, filter: impl Fn(&StoredPost) -> bool) -> Vec<Post> {
        let mut posts: Vec<&StoredPost> = self.posts.iter().filter(|p| filter(*p)).collect();
        posts.sort_by(|a, b| b.date_made.cmp(&a.date_made).then(b.id.cmp(&a.id)));
        posts.into_iter().map(|p| self.render(p)).collect()
    }

    fn render(&self, post: &StoredPost) -> Post {
        Post {
            id: post.id,
            content: post.content.clone(),
            author: post.author,
            author_name: self
                .users
                .get(&post.author)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            date_made: post.date_made,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, body: Value) -> Rejection {
    (status, Json(body))
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/", post(login))
        .route("/user/{user_id}/", get(user_profile))
        .route("/board/", get(global_messages))
        .route("/board/post/", post(create_global_message))
        .route("/section/{section_id}/", get(section_messages))
        .route("/section/{section_id}/post/", post(create_section_message))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve `Authorization: Token <key>` to a user id.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<i64, Rejection> {
    let unauthorized = |detail: &str| reject(StatusCode::UNAUTHORIZED, json!({ "detail": detail }));
    let Some(raw) = headers.get(header::AUTHORIZATION) else {
        return Err(unauthorized("Authentication credentials were not provided."));
    };
    let key = raw
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Token "))
        .ok_or_else(|| unauthorized("Authentication credentials were not provided."))?;
    store
        .tokens
        .get(key.trim())
        .copied()
        .ok_or_else(|| unauthorized("Invalid token."))
}

fn not_found() -> Rejection {
    reject(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }))
}

/// Route ids are integers only; anything else matches no route.
fn parse_id(raw: &str) -> Result<i64, Rejection> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }
    raw.parse().map_err(|_| not_found())
}

/// Decode a message body. Runs after authentication so anonymous callers
/// get 401 whatever they sent. An empty body counts as an empty object.
fn parse_message(body: &Bytes) -> Result<NewMessage, Rejection> {
    if body.is_empty() {
        return Ok(NewMessage { content: None });
    }
    serde_json::from_slice(body).map_err(|e| {
        reject(
            StatusCode::BAD_REQUEST,
            json!({ "detail": format!("JSON parse error - {e}") }),
        )
    })
}

fn message_content(input: NewMessage) -> Result<String, Rejection> {
    match input.content {
        None => Err(reject(
            StatusCode::BAD_REQUEST,
            json!({ "content": ["This field is required."] }),
        )),
        Some(c) if c.trim().is_empty() => Err(reject(
            StatusCode::BAD_REQUEST,
            json!({ "content": ["This field may not be blank."] }),
        )),
        Some(c) => Ok(c),
    }
}

fn find_section(store: &Store, section_id: i64, user_id: i64) -> Result<Section, Rejection> {
    let section = store
        .sections
        .get(&section_id)
        .cloned()
        .ok_or_else(not_found)?;
    if !store.can_access(user_id, &section) {
        return Err(reject(
            StatusCode::FORBIDDEN,
            json!({ "error": "You do not have access to this section" }),
        ));
    }
    Ok(section)
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Rejection> {
    let username = input.username.filter(|s| !s.is_empty());
    let password = input.password.filter(|s| !s.is_empty());
    let (Some(username), Some(password)) = (username, password) else {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Please provide both username and password" }),
        ));
    };

    let mut store = db.write().await;
    let user = store
        .users
        .values()
        .find(|u| u.username == username && u.password == password)
        .cloned()
        .ok_or_else(|| {
            reject(
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid credentials" }),
            )
        })?;
    if !user.is_student {
        return Err(reject(
            StatusCode::FORBIDDEN,
            json!({ "error": "Only students can login through this endpoint" }),
        ));
    }

    let token = store.token_for(user.id);
    info!(user_id = user.id, "login");
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        name: user.name,
        section: user.section,
    }))
}

async fn user_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, Rejection> {
    let user_id = parse_id(&user_id)?;
    let store = db.read().await;
    authenticate(&store, &headers)?;
    let user = store.users.get(&user_id).ok_or_else(not_found)?;
    let posts = store
        .posts_where(|p| p.author == user_id)
        .into_iter()
        .map(|p| p.id)
        .collect();
    Ok(Json(UserProfile {
        id: user.id,
        name: user.name.clone(),
        section: user.section,
        is_student: user.is_student,
        datemade: user.datemade,
        posts,
    }))
}

async fn global_messages(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Post>>, Rejection> {
    let store = db.read().await;
    authenticate(&store, &headers)?;
    Ok(Json(store.posts_where(|p| p.section.is_none())))
}

async fn create_global_message(
    State(db): State<Db>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Post>), Rejection> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let content = message_content(parse_message(&body)?)?;
    let post = store.add_post(user_id, None, content);
    info!(post_id = post.id, author = user_id, "global message created");
    Ok((StatusCode::CREATED, Json(store.render(&post))))
}

async fn section_messages(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(section_id): Path<String>,
) -> Result<Json<Vec<Post>>, Rejection> {
    let section_id = parse_id(&section_id)?;
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    let section = find_section(&store, section_id, user_id)?;
    Ok(Json(store.posts_where(|p| p.section == Some(section.id))))
}

async fn create_section_message(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(section_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Post>), Rejection> {
    let section_id = parse_id(&section_id)?;
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let section = find_section(&store, section_id, user_id)?;
    let content = message_content(parse_message(&body)?)?;
    let post = store.add_post(user_id, Some(section.id), content);
    info!(post_id = post.id, author = user_id, section = section.id, "section message created");
    Ok((StatusCode::CREATED, Json(store.render(&post))))
}
