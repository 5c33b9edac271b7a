//! API routes

use crate::api::handlers::{create_message, health_check, list_messages, AppState};
use crate::auth::handlers::{get_me, get_profile, login, register, update_profile};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API route table
///
/// The authentication middleware runs on every route; it only attaches an
/// identity (or rejects an invalid credential). Which routes demand that
/// identity is decided by their handlers' extractors, so register and login
/// stay open to anonymous callers.
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Open endpoints: identity is established here
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Authenticated endpoints
        .route("/api/auth/me", get(get_me))
        .route(
            "/api/profile",
            get(get_profile).put(update_profile).patch(update_profile),
        )
        .route(
            "/api/chat/messages",
            get(list_messages).post(create_message),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::manager::DatabaseManager;
    use crate::db::repository::{MemberRepository, MessageRepository, TokenRepository};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let state = AppState {
            member_repo: Arc::new(MemberRepository::new(db.clone())),
            token_repo: Arc::new(TokenRepository::new(db.clone())),
            message_repo: Arc::new(MessageRepository::new(db)),
        };
        build_routes(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_member(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    #[tokio::test]
    async fn test_register_returns_token_and_member() {
        let app = test_app();

        let (status, body) = register_member(&app, "alice", "secret1").await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["token"].as_str().unwrap().len() == 40);
        assert_eq!(body["member"]["username"], "alice");
        assert!(body["member"]["id"].is_string());
        assert!(body["member"]["created_at"].is_string());
        // The password hash never leaves the server
        assert!(body["member"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let app = test_app();

        register_member(&app, "alice", "secret1").await;
        let (status, body) = register_member(&app, "alice", "other123").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(
            body["details"]["username"][0],
            "A member with this username already exists."
        );
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let app = test_app();

        let (status, body) = register_member(&app, "alice", "abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["details"]["password"][0],
            "Ensure this field has at least 4 characters."
        );
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["details"]["username"][0], "This field is required.");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["password"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["username"][0], "This field is required.");

        let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["username"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let app = test_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_login_returns_existing_token() {
        let app = test_app();

        let (_, registered) = register_member(&app, "alice", "secret1").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "secret1" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token"], registered["token"]);
        assert_eq!(body["member"]["username"], "alice");
    }

    #[tokio::test]
    async fn test_login_failures_are_generic() {
        let app = test_app();
        register_member(&app, "alice", "secret1").await;

        // Wrong password and unknown username give the identical message
        for payload in [
            json!({ "username": "alice", "password": "wrong" }),
            json!({ "username": "nobody", "password": "secret1" }),
        ] {
            let (status, body) =
                send(&app, Method::POST, "/api/auth/login", None, Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Invalid username or password.");
        }
    }

    #[tokio::test]
    async fn test_protected_endpoint_without_header() {
        let app = test_app();

        let (status, body) = send(&app, Method::GET, "/api/auth/me", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            "Authentication credentials were not provided."
        );
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/auth/me",
            Some("0000000000000000000000000000000000000000"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token.");
    }

    #[tokio::test]
    async fn test_malformed_token_headers() {
        let app = test_app();

        let cases = [
            ("Token", "Invalid token header. No credentials provided."),
            (
                "Token abc def",
                "Invalid token header. Token string should not contain spaces.",
            ),
        ];

        for (value, message) in cases {
            let request = Request::builder()
                .method(Method::GET)
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn test_invalid_header_on_open_endpoint_still_fails() {
        // A credential that is offered but malformed fails even where
        // anonymous access would have been allowed
        let app = test_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/register")
            .header(header::AUTHORIZATION, "Token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": "alice", "password": "secret1" }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_message_author_cannot_be_forged() {
        let app = test_app();

        let (_, alice) = register_member(&app, "alice", "secret1").await;
        let (_, bob) = register_member(&app, "bob", "secret2").await;
        let alice_token = alice["token"].as_str().unwrap();
        let bob_token = bob["token"].as_str().unwrap();

        // Bob posts while claiming to be alice; the member field is ignored
        let (status, posted) = send(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(bob_token),
            Some(json!({
                "content": "hello",
                "member": alice["member"]["id"],
                "member_username": "alice"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(posted["member_username"], "bob");
        assert_eq!(posted["member"], bob["member"]["id"]);

        // Alice sees the message attributed to bob
        let (status, feed) = send(
            &app,
            Method::GET,
            "/api/chat/messages",
            Some(alice_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(feed[0]["member_username"], "bob");
        assert_eq!(feed[0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_messages_require_authentication() {
        let app = test_app();

        let (status, _) = send(&app, Method::GET, "/api/chat/messages", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/chat/messages",
            None,
            Some(json!({ "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let app = test_app();

        let (_, alice) = register_member(&app, "alice", "secret1").await;
        let token = alice["token"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(token),
            Some(json!({ "content": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["content"][0], "This field may not be blank.");

        // Absent content field
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["content"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_profile_update() {
        let app = test_app();

        let (_, alice) = register_member(&app, "alice", "secret1").await;
        register_member(&app, "bob", "secret2").await;
        let token = alice["token"].as_str().unwrap();

        // Collision with another member
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/profile",
            Some(token),
            Some(json!({ "username": "bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["details"]["username"][0],
            "A member with this username already exists."
        );

        // Unchanged after the failed update
        let (_, profile) = send(&app, Method::GET, "/api/profile", Some(token), None).await;
        assert_eq!(profile["username"], "alice");

        // Re-submitting the current username is not a duplicate
        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/profile",
            Some(token),
            Some(json!({ "username": "alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Missing username
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/profile",
            Some(token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // A fresh username sticks
        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/profile",
            Some(token),
            Some(json!({ "username": "alicia" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["username"], "alicia");

        let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(token), None).await;
        assert_eq!(me["username"], "alicia");
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let app = test_app();

        // register alice/secret1 -> 201 with token T1
        let (status, registered) = register_member(&app, "alice", "secret1").await;
        assert_eq!(status, StatusCode::CREATED);
        let t1 = registered["token"].as_str().unwrap().to_string();

        // login alice/secret1 -> 200 with token == T1
        let (status, logged_in) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logged_in["token"], t1.as_str());

        // login alice/wrong -> 400 generic error
        let (status, failed) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(failed["message"], "Invalid username or password.");

        // POST /messages {content:"hi"} with T1 -> 201 with member_username alice
        let (status, posted) = send(
            &app,
            Method::POST,
            "/api/chat/messages",
            Some(&t1),
            Some(json!({ "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(posted["member_username"], "alice");

        // GET /messages with T1 -> list containing that message
        let (status, feed) = send(&app, Method::GET, "/api/chat/messages", Some(&t1), None).await;
        assert_eq!(status, StatusCode::OK);
        let feed = feed.as_array().unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0]["content"], "hi");
        assert_eq!(feed[0]["id"], posted["id"]);
    }
}
