mod common;

use axum::http::{Method, StatusCode};
use common::{money, TestApp};
use marketplace_api::entities::company::CompanyType;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn listing_is_public_and_hides_inactive_materials() {
    let app = TestApp::new().await;
    app.seed_material("Granite chips 8/16", dec!(22.00), None, None)
        .await;
    let retired = app
        .seed_material("Old limestone", dec!(11.00), None, None)
        .await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/materials/{}", retired.id),
            None,
            Some(&app.supplier.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/api/v1/materials", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Granite chips 8/16"]);
    assert_eq!(body[0]["supplier"]["name"], "Baltic Aggregates SIA");
    assert_eq!(money(&body[0]["basePrice"]), dec!(22.00));

    // Deactivated materials stay reachable by id.
    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/materials/{}", retired.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn listing_filters_by_recycled_flag() {
    let app = TestApp::new().await;
    app.seed_material("Virgin gravel", dec!(15.00), None, None)
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Crushed concrete",
                "category": "AGGREGATES",
                "basePrice": 8.5,
                "unit": "TONNE",
                "isRecycled": true,
                "supplierId": app.supplier_company.id,
            })),
            Some(&app.supplier.token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, body) = app
        .send(Method::GET, "/api/v1/materials?isRecycled=true", None, None)
        .await;
    assert_eq!(names(&body), vec!["Crushed concrete"]);

    let (_, body) = app
        .send(Method::GET, "/api/v1/materials?isRecycled=false", None, None)
        .await;
    assert_eq!(names(&body), vec!["Virgin gravel"]);

    let (_, body) = app.send(Method::GET, "/api/v1/materials", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn categories_lists_every_category() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/materials/categories", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let categories = body.as_array().unwrap();
    assert_eq!(categories.len(), 10);
    assert!(categories.contains(&json!("GRAVEL")));
    assert!(categories.contains(&json!("OTHER")));
}

#[tokio::test]
async fn search_matches_case_insensitively() {
    let app = TestApp::new().await;
    app.seed_material("Washed Sand 0/4", dec!(12.90), None, None)
        .await;
    app.seed_material("Granite chips", dec!(25.00), None, None)
        .await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/materials/search?q=sAnD", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Washed Sand 0/4"]);

    // The seeded description mentions integration tests.
    let (_, body) = app
        .send(Method::GET, "/api/v1/materials/search?q=INTEGRATION", None, None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app
        .send(Method::GET, "/api/v1/materials/search?q=%20", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Search query is required");

    let (status, _) = app
        .send(Method::GET, "/api/v1/materials/search", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let app = TestApp::new().await;
    app.seed_material("Washed Sand 0/4", dec!(12.90), None, None)
        .await;
    app.seed_material("Rebar B500_12mm", dec!(640.00), None, None)
        .await;

    for q in ["%25", "%25%25", "a%25d", "s__d"] {
        let (status, body) = app
            .send(
                Method::GET,
                &format!("/api/v1/materials/search?q={q}"),
                None,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "q={q}");
        assert!(names(&body).is_empty(), "q={q}: {body}");
    }

    let (_, body) = app
        .send(Method::GET, "/api/v1/materials/search?q=_", None, None)
        .await;
    assert_eq!(names(&body), vec!["Rebar B500_12mm"]);

    let (_, body) = app
        .send(Method::GET, "/api/v1/materials/search?q=0_1", None, None)
        .await;
    assert_eq!(names(&body), vec!["Rebar B500_12mm"]);
}

#[tokio::test]
async fn unknown_material_is_not_found() {
    let app = TestApp::new().await;
    let id = uuid::Uuid::new_v4();

    let (status, body) = app
        .send(Method::GET, &format!("/api/v1/materials/{id}"), None, None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Material with ID {id} not found"));
}

#[tokio::test]
async fn suppliers_manage_only_their_own_catalog() {
    let app = TestApp::new().await;
    let rival = app
        .create_company("Kurzeme Quarry SIA", CompanyType::Supplier)
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Dolomite 0/32",
                "category": "AGGREGATES",
                "basePrice": 14.2,
                "unit": "TONNE",
                "minOrder": 5,
                "maxOrder": 200,
                "certificates": ["CE"],
                "supplierId": app.supplier_company.id,
            })),
            Some(&app.supplier.token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["inStock"], true);
    assert_eq!(body["certificates"], json!(["CE"]));
    let own_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Borrowed gravel",
                "category": "GRAVEL",
                "basePrice": 10,
                "unit": "TONNE",
                "supplierId": rival.id,
            })),
            Some(&app.supplier.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/materials/{own_id}"),
            Some(json!({"basePrice": 15.75, "inStock": false})),
            Some(&app.supplier.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["basePrice"]), dec!(15.75));
    assert_eq!(body["inStock"], false);

    // Admins may edit any catalog.
    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/materials/{own_id}"),
            Some(json!({"quality": "Premium"})),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn material_writes_are_validated() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Inverted bounds",
                "category": "SAND",
                "basePrice": 9,
                "unit": "TONNE",
                "minOrder": 50,
                "maxOrder": 10,
                "supplierId": app.supplier_company.id,
            })),
            Some(&app.supplier.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Ghost supplier",
                "category": "SAND",
                "basePrice": 9,
                "unit": "TONNE",
                "supplierId": uuid::Uuid::new_v4(),
            })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({"name": "Missing fields"})),
            Some(&app.supplier.token),
        )
        .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn buyers_cannot_write_materials() {
    let app = TestApp::new().await;
    let material = app
        .seed_material("Sand", dec!(10.00), None, None)
        .await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Buyer listing",
                "category": "SAND",
                "basePrice": 1,
                "unit": "TONNE",
                "supplierId": app.supplier_company.id,
            })),
            Some(&app.buyer.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/materials/{}", material.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
