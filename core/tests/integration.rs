//! Full board flow against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every `BoardApi`
//! operation over real HTTP through `ReqwestTransport`. Validates that request
//! building, transport and response parsing agree with the server end to end.

use std::time::Duration;

use board_core::{ApiError, BoardApi, ClientConfig, Credentials, ReqwestTransport};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn anonymous(base_url: &str) -> BoardApi<ReqwestTransport> {
    let mut config = ClientConfig::new(base_url);
    config.timeout = Duration::from_secs(5);
    BoardApi::from_config(&config).unwrap()
}

#[tokio::test]
async fn board_flow() {
    let base_url = start_server().await;
    let api = anonymous(&base_url);

    // Step 1: unauthenticated calls are rejected by the server.
    let err = api.get_global_messages().await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 401, .. }));

    // Step 2: bad credentials.
    let err = api
        .login(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message().as_deref(), Some("Invalid credentials"));

    // Step 3: login.
    let login = api
        .login(&Credentials::new("alice", "alice-pass"))
        .await
        .unwrap();
    assert_eq!(login.user_id, 1);
    assert_eq!(login.section, Some(1));
    let alice = api.authenticated(login.token);

    // Step 4: global board starts empty, then shows the new post.
    assert!(alice.get_global_messages().await.unwrap().is_empty());
    let post = alice.post_global_message("hello").await.unwrap();
    assert_eq!(post.content, "hello");
    assert_eq!(post.author, 1);
    assert_eq!(post.author_name, "Alice Santos");
    let board = alice.get_global_messages().await.unwrap();
    assert_eq!(board, vec![post.clone()]);

    // Step 5: section board.
    let section_post = alice
        .post_section_message(1, "homework due monday")
        .await
        .unwrap();
    let section = alice.get_section_messages(1).await.unwrap();
    assert_eq!(section, vec![section_post.clone()]);

    // Step 6: profile lists both posts, newest first.
    let profile = alice.get_user_profile(1).await.unwrap();
    assert_eq!(profile.name, "Alice Santos");
    assert!(profile.is_student);
    assert_eq!(profile.posts, vec![section_post.id, post.id]);

    // Step 7: another section is forbidden.
    let err = alice.get_section_messages(2).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    let err = alice.post_section_message(2, "hi").await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    // Step 8: missing resources and malformed ids.
    let err = alice.get_user_profile(404).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = alice.get_user_profile("1/2").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = alice.get_section_messages(77).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = alice.get_user_profile("abc").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "{err:?}");
    let err = alice.get_section_messages("abc").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "{err:?}");
    let err = alice.post_section_message("abc", "hi").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "{err:?}");
    let err = api.get_user_profile("abc").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "{err:?}");

    // Step 9: blank content is rejected server-side, not client-side.
    let err = alice.post_global_message("").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
}

#[tokio::test]
async fn adviser_cannot_login() {
    let base_url = start_server().await;
    let err = anonymous(&base_url)
        .login(&Credentials::new("mr_reyes", "reyes-pass"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(
        err.server_message().as_deref(),
        Some("Only students can login through this endpoint")
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = anonymous(&format!("http://{addr}"))
        .get_global_messages()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}
