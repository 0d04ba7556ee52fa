mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_returns_user_and_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "email": "New.Buyer@Example.com",
                "password": "s3cure-pass",
                "firstName": "Ilze",
                "lastName": "Ozola",
                "userType": "BUYER",
                "companyId": app.buyer_company.id,
            })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "new.buyer@example.com");
    assert_eq!(body["user"]["userType"], "BUYER");
    assert_eq!(body["user"]["status"], "PENDING");
    assert_eq!(body["user"]["company"]["name"], "Riga Builders SIA");
    assert!(body["user"].get("passwordHash").is_none());

    // Pending accounts may sign in straight away.
    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "new.buyer@example.com", "password": "s3cure-pass"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "email": "buyer@test.lv",
                "password": "another-pass",
                "firstName": "Dup",
                "lastName": "Licate",
                "userType": "BUYER",
            })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User with this email already exists");
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn register_validates_password_and_company() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "email": "short@test.lv",
                "password": "short",
                "firstName": "A",
                "lastName": "B",
                "userType": "CARRIER",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "email": "ghost@test.lv",
                "password": "long-enough",
                "firstName": "A",
                "lastName": "B",
                "userType": "SUPPLIER",
                "companyId": uuid::Uuid::new_v4(),
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_accounts_cannot_self_register() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "email": "root@test.lv",
                "password": "long-enough",
                "firstName": "Root",
                "lastName": "User",
                "userType": "ADMIN",
            })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "supplier@test.lv", "password": TEST_PASSWORD})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["userType"], "SUPPLIER");
    assert_eq!(body["user"]["company"]["companyType"], "SUPPLIER");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "supplier@test.lv", "password": "wrong-password"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "nobody@test.lv", "password": TEST_PASSWORD})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn suspended_accounts_cannot_log_in() {
    use marketplace_api::entities::user::{self, UserStatus};
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    let app = TestApp::new().await;
    let mut active = app.buyer.model.clone().into_active_model();
    active.status = Set(UserStatus::Suspended);
    let _: user::Model = active.update(&*app.state.db).await.unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "buyer@test.lv", "password": TEST_PASSWORD})),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account is not active");
}

#[tokio::test]
async fn me_requires_a_valid_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/auth/me", None, Some(&app.buyer.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "buyer@test.lv");
    assert_eq!(body["company"]["id"], app.buyer_company.id.to_string());

    let (status, _) = app.send(Method::GET, "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/v1/auth/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_reports_deleted_users() {
    use marketplace_api::entities::user;
    use sea_orm::{EntityTrait, ModelTrait};

    let app = TestApp::new().await;
    let ghost = app
        .create_user("ghost@test.lv", user::UserType::Carrier, None)
        .await;
    let model = user::Entity::find_by_id(ghost.model.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    model.delete(&*app.state.db).await.unwrap();

    let (status, body) = app
        .send(Method::GET, "/api/v1/auth/me", None, Some(&ghost.token))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn responses_echo_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/materials/categories", None, None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
