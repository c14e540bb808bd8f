use serde_json::json;

use crate::common::{TestApp, routes};

mod catalog {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_and_list_skills() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;

        let res = app
            .post_with_token(routes::SKILLS, &json!({"code": "rust", "name": "Rust"}), &admin.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["code"], "rust");

        app.create_skill(&admin.token, "ansible", "Ansible").await;

        let res = app.get_with_token(routes::SKILLS, &admin.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Ansible", "Rust"]);
    }

    #[tokio::test]
    async fn duplicate_code_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        app.create_skill(&admin.token, "rust", "Rust").await;

        let res = app
            .post_with_token(routes::SKILLS, &json!({"code": "rust", "name": "Rust 2"}), &admin.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "code");
    }

    #[tokio::test]
    async fn admin_can_rename_a_skill() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        let id = app.create_skill(&admin.token, "js", "JS").await;

        let res = app
            .patch_with_token(&routes::skill(id), &json!({"name": "JavaScript"}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["code"], "js");
        assert_eq!(res.body["name"], "JavaScript");
    }

    #[tokio::test]
    async fn deleting_a_skill_drops_it_from_profiles() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        let id = app.create_skill(&admin.token, "rust", "Rust").await;
        let alice = app.create_user("alice").await;
        app.put_with_token(routes::MY_SKILLS, &json!({"skills_ids": [id]}), &alice.token)
            .await;

        let res = app.delete_with_token(&routes::skill(id), &admin.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let me = app.get_with_token(routes::ME, &alice.token).await;
        assert_eq!(me.body["skills"], json!([]));
        let res = app.get_with_token(&routes::skill(id), &admin.token).await;
        assert_eq!(res.status, 404);
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn regular_user_cannot_read_or_write_skills() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let list = app.get_with_token(routes::SKILLS, &alice.token).await;
        assert_eq!(list.status, 403);
        assert_eq!(list.body["code"], "PERMISSION_DENIED");

        let create = app
            .post_with_token(routes::SKILLS, &json!({"code": "go", "name": "Go"}), &alice.token)
            .await;
        assert_eq!(create.status, 403);
    }

    #[tokio::test]
    async fn anonymous_caller_gets_token_missing() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::SKILLS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
