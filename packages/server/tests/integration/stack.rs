use serde_json::json;

use crate::common::{TestApp, routes, uuid_at};

mod reading {
    use super::*;

    #[tokio::test]
    async fn anyone_can_list_and_fetch_stacks() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        let rust = app.create_stack(&admin.token, "Rust").await;
        app.create_stack(&admin.token, "Django").await;

        let res = app.get_without_token(routes::STACKS).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
        assert_eq!(res.body[0]["name"], "Django");

        let res = app.get_without_token(&routes::stack(rust)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Rust");
    }

    #[tokio::test]
    async fn search_matches_names_case_insensitively() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        app.create_stack(&admin.token, "PostgreSQL").await;
        app.create_stack(&admin.token, "MySQL").await;
        app.create_stack(&admin.token, "Redis").await;

        let res = app
            .get_without_token(&format!("{}?search=sql", routes::STACKS))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }
}

mod writing {
    use super::*;

    #[tokio::test]
    async fn regular_user_cannot_create_a_stack() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .post_with_token(routes::STACKS, &json!({"name": "Rust"}), &alice.token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn anonymous_cannot_create_a_stack() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::STACKS, &json!({"name": "Rust"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn duplicate_name_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        app.create_stack(&admin.token, "Rust").await;

        let res = app
            .post_with_token(routes::STACKS, &json!({"name": "Rust"}), &admin.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "name");
    }

    #[tokio::test]
    async fn deleting_a_stack_detaches_it_from_projects() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        let rust = app.create_stack(&admin.token, "Rust").await;
        let alice = app.create_user("alice").await;
        let project = app
            .create_project(&alice.token, json!({"name": "Garden App", "stacks_ids": [rust]}))
            .await;
        assert_eq!(uuid_at(&project.body["stacks"][0]["id"]), rust);

        let res = app.delete_with_token(&routes::stack(rust), &admin.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_without_token(&routes::project(project.id())).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["stacks"], json!([]));
    }
}
