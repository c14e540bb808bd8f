use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_starts_with_unselected_role_and_grade() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "alice@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_string());
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["role_id"], "not_selected");
        assert_eq!(res.body["grade_id"], "not_selected");
        assert_eq!(res.body["is_staff"], false);
        assert!(res.body.get("password").is_none());
        assert_eq!(res.body["skills"], json!([]));
        assert_eq!(res.body["experience"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_validation_error_on_username() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "other@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "username");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error_on_email() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice2", "email": "alice@EXAMPLE.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "email");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "alice@example.com", "password": "short"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "password");
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "not-an-email", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "email");
    }

    #[tokio::test]
    async fn client_cannot_make_itself_staff() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "mallory",
                    "email": "mallory@example.com",
                    "password": PASSWORD,
                    "is_staff": true,
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["is_staff"], false);
    }

    #[tokio::test]
    async fn configured_admin_identity_cannot_be_registered() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "Admin", "email": "mallory@example.com", "password": PASSWORD}),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "username");

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "mallory", "email": "admin@example.com", "password": PASSWORD}),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "email");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn returns_access_and_refresh_tokens() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["access"].is_string());
        assert!(res.body["refresh"].is_string());
        assert_ne!(res.body["access"], res.body["refresh"]);
    }

    #[tokio::test]
    async fn wrong_password_gives_invalid_credentials() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "wrong_password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_email_gives_invalid_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ghost@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod tokens {
    use super::*;

    async fn token_pair(app: &TestApp, username: &str) -> (String, String) {
        app.create_user(username).await;
        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": format!("{username}@example.com"), "password": PASSWORD}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        (
            res.body["access"].as_str().unwrap().to_string(),
            res.body["refresh"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn refresh_token_yields_a_working_access_token() {
        let app = TestApp::spawn().await;
        let (_, refresh) = token_pair(&app, "alice").await;

        let res = app
            .post_without_token(routes::REFRESH, &json!({"refresh": refresh}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let access = res.body["access"].as_str().unwrap();

        let me = app.get_with_token(routes::ME, access).await;
        assert_eq!(me.status, 200, "{}", me.text);
        assert_eq!(me.body["username"], "alice");
    }

    #[tokio::test]
    async fn access_token_is_not_accepted_for_refresh() {
        let app = TestApp::spawn().await;
        let (access, _) = token_pair(&app, "alice").await;

        let res = app
            .post_without_token(routes::REFRESH, &json!({"refresh": access}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn refresh_token_is_not_accepted_as_bearer() {
        let app = TestApp::spawn().await;
        let (_, refresh) = token_pair(&app, "alice").await;

        let res = app.get_with_token(routes::ME, &refresh).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::PROJECTS, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn missing_token_on_authenticated_route() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
