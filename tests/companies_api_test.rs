mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use marketplace_api::entities::company::CompanyType;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn admin_creates_company() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/companies",
            Some(json!({
                "name": "  Daugava Recycling SIA ",
                "companyType": "RECYCLER",
                "email": "info@daugava.lv",
                "city": "Riga",
                "country": "LV",
            })),
            Some(&app.admin.token),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["name"], "Daugava Recycling SIA");
    assert_eq!(body["companyType"], "RECYCLER");
    assert_eq!(body["email"], "info@daugava.lv");
    assert!(body["rating"].is_null());

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = app
        .send(
            Method::GET,
            &format!("/api/v1/companies/{id}"),
            None,
            Some(&app.buyer.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Daugava Recycling SIA");
}

#[tokio::test]
async fn only_admins_create_companies() {
    let app = TestApp::new().await;
    let payload = json!({"name": "Sneaky SIA", "companyType": "BUYER"});

    for token in [&app.buyer.token, &app.supplier.token] {
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/companies",
                Some(payload.clone()),
                Some(token),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = app
        .send(Method::POST, "/api/v1/companies", Some(payload), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_company_validates_input() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/companies",
            Some(json!({"name": "", "companyType": "BUYER"})),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/companies",
            Some(json!({"name": "Mail SIA", "companyType": "BUYER", "email": "nope"})),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn companies_are_listed_by_name() {
    let app = TestApp::new().await;
    app.create_company("Zemgale Transport SIA", CompanyType::Carrier)
        .await;
    app.create_company("Aluksne Timber SIA", CompanyType::Supplier)
        .await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/companies", None, Some(&app.buyer.token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "Aluksne Timber SIA",
            "Baltic Aggregates SIA",
            "Riga Builders SIA",
            "Zemgale Transport SIA",
        ]
    );

    let (status, _) = app
        .send(Method::GET, "/api/v1/companies", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_company_is_not_found() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/companies/{missing}"),
            None,
            Some(&app.buyer.token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Company with ID {missing} not found"));

    let (status, body) = app
        .send(
            Method::GET,
            "/api/v1/companies/not-a-uuid",
            None,
            Some(&app.buyer.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}
