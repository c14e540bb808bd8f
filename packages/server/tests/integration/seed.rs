use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::json;

use growhub_server::config::AdminConfig;
use growhub_server::entity::user;
use growhub_server::seed::{AdminOutcome, ensure_admin};

use crate::common::{PASSWORD, TestApp, routes};

fn admin_with_password() -> AdminConfig {
    AdminConfig {
        password: Some(PASSWORD.to_string()),
        ..AdminConfig::default()
    }
}

async fn find_by_username(app: &TestApp, username: &str) -> Option<user::Model> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&app.db)
        .await
        .expect("DB query failed")
}

/// Rename a registered user directly in the database, standing in for an
/// account that predates the current admin configuration.
async fn rename(app: &TestApp, id: uuid::Uuid, username: &str) {
    let db_user = user::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .expect("DB query failed")
        .expect("User not found");
    let mut active: user::ActiveModel = db_user.into();
    active.username = Set(username.to_string());
    active.update(&app.db).await.expect("Failed to rename user");
}

mod bootstrap {
    use super::*;

    #[tokio::test]
    async fn creates_admin_once_then_leaves_it_alone() {
        let app = TestApp::spawn().await;
        let config = admin_with_password();

        let first = ensure_admin(&app.db, &config).await.unwrap();
        assert_eq!(first, AdminOutcome::Created);

        let second = ensure_admin(&app.db, &config).await.unwrap();
        assert_eq!(second, AdminOutcome::Unchanged);

        let admin = find_by_username(&app, "admin").await.unwrap();
        assert!(admin.is_staff);
        assert!(admin.is_active);
        assert_eq!(admin.email, "admin@example.com");
        let count = user::Entity::find()
            .filter(user::Column::Username.eq("admin"))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let token = app.login("admin@example.com").await;
        let res = app
            .post_with_token(routes::SKILLS, &json!({"code": "rust", "name": "Rust"}), &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn missing_password_skips_bootstrap() {
        let app = TestApp::spawn().await;

        let outcome = ensure_admin(&app.db, &AdminConfig::default()).await.unwrap();

        assert_eq!(outcome, AdminOutcome::Skipped);
        assert!(find_by_username(&app, "admin").await.is_none());
    }
}

mod conflicts {
    use super::*;

    #[tokio::test]
    async fn existing_non_staff_account_under_admin_name_is_never_promoted() {
        let app = TestApp::spawn().await;
        let mallory = app.create_user("mallory").await;
        rename(&app, mallory.id, "admin").await;

        // Both with and without a configured password.
        for config in [AdminConfig::default(), admin_with_password()] {
            let outcome = ensure_admin(&app.db, &config).await.unwrap();
            assert_eq!(outcome, AdminOutcome::Conflict { field: "username" });
        }

        let squatter = find_by_username(&app, "admin").await.unwrap();
        assert_eq!(squatter.id, mallory.id);
        assert!(!squatter.is_staff);
        assert_eq!(squatter.email, "mallory@example.com");

        let token = app.login("mallory@example.com").await;
        let res = app
            .post_with_token(routes::SKILLS, &json!({"code": "rust", "name": "Rust"}), &token)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn configured_email_held_by_another_account_is_reported() {
        let app = TestApp::spawn().await;
        let bob = app.create_user("bob").await;
        let config = AdminConfig {
            username: "ops".to_string(),
            email: Some("bob@example.com".to_string()),
            password: Some(PASSWORD.to_string()),
        };

        let outcome = ensure_admin(&app.db, &config).await.unwrap();

        assert_eq!(outcome, AdminOutcome::Conflict { field: "email" });
        assert!(find_by_username(&app, "ops").await.is_none());
        let bob_row = find_by_username(&app, "bob").await.unwrap();
        assert_eq!(bob_row.id, bob.id);
        assert!(!bob_row.is_staff);
    }
}
