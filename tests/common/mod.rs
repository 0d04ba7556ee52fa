#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use marketplace_api::{
    auth::password::hash_password,
    build_router,
    config::AppConfig,
    db,
    entities::{
        company::{self, CompanyType},
        material::{self, MaterialCategory, MaterialUnit},
        user::{self, UserStatus, UserType},
    },
    events, AppState,
};

pub const TEST_PASSWORD: &str = "Password123!";
const TEST_SECRET: &str =
    "integration-test-secret-0123456789-abcdefghijklmnopqrstuvwxyz-ABCDEFGHIJKLMNOP";

/// Seeded account plus a bearer token for it
#[derive(Clone)]
pub struct TestUser {
    pub model: user::Model,
    pub token: String,
}

/// Full router over an in-memory SQLite database with migrations applied.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: TestUser,
    pub buyer: TestUser,
    pub supplier: TestUser,
    pub buyer_company: company::Model,
    pub supplier_company: company::Model,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps the in-memory database alive and shared.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = build_router(state.clone());

        let buyer_company = insert_company(&state, "Riga Builders SIA", CompanyType::Buyer).await;
        let supplier_company =
            insert_company(&state, "Baltic Aggregates SIA", CompanyType::Supplier).await;

        let admin = insert_user(&state, "admin@test.lv", UserType::Admin, None).await;
        let buyer =
            insert_user(&state, "buyer@test.lv", UserType::Buyer, Some(buyer_company.id)).await;
        let supplier = insert_user(
            &state,
            "supplier@test.lv",
            UserType::Supplier,
            Some(supplier_company.id),
        )
        .await;

        Self {
            router,
            state,
            admin,
            buyer,
            supplier,
            buyer_company,
            supplier_company,
            _event_task: event_task,
        }
    }

    pub async fn create_user(
        &self,
        email: &str,
        user_type: UserType,
        company_id: Option<Uuid>,
    ) -> TestUser {
        insert_user(&self.state, email, user_type, company_id).await
    }

    pub async fn create_company(&self, name: &str, company_type: CompanyType) -> company::Model {
        insert_company(&self.state, name, company_type).await
    }

    /// Inserts an active material for the seeded supplier company
    pub async fn seed_material(
        &self,
        name: &str,
        base_price: Decimal,
        min_order: Option<Decimal>,
        max_order: Option<Decimal>,
    ) -> material::Model {
        let now = Utc::now();
        material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(format!("{} for integration tests", name))),
            category: Set(MaterialCategory::Gravel),
            sub_category: Set(None),
            base_price: Set(base_price),
            unit: Set(MaterialUnit::Tonne),
            currency: Set("EUR".to_string()),
            in_stock: Set(true),
            min_order: Set(min_order),
            max_order: Set(max_order),
            is_recycled: Set(false),
            quality: Set(None),
            certificates: Set(serde_json::json!([])),
            images: Set(serde_json::json!([])),
            specifications: Set(None),
            supplier_id: Set(self.supplier_company.id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed material")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends the request and returns status plus parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    }
}

/// Reads a JSON number as a 2dp decimal; SQLite may round-trip money through floats
pub fn money(value: &Value) -> Decimal {
    let raw = value
        .as_f64()
        .unwrap_or_else(|| panic!("expected a JSON number, got {}", value));
    Decimal::try_from(raw).expect("finite number").round_dp(2)
}

async fn insert_company(state: &AppState, name: &str, company_type: CompanyType) -> company::Model {
    let now = Utc::now();
    company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        company_type: Set(company_type),
        email: Set(None),
        phone: Set(None),
        logo: Set(None),
        rating: Set(None),
        city: Set(Some("Riga".to_string())),
        country: Set(Some("LV".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*state.db)
    .await
    .expect("seed company")
}

async fn insert_user(
    state: &AppState,
    email: &str,
    user_type: UserType,
    company_id: Option<Uuid>,
) -> TestUser {
    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(TEST_PASSWORD.to_string())
            .await
            .expect("hash test password")),
        first_name: Set("Test".to_string()),
        last_name: Set(format!("{:?}", user_type)),
        phone: Set(None),
        avatar: Set(None),
        user_type: Set(user_type),
        status: Set(UserStatus::Active),
        email_verified: Set(true),
        phone_verified: Set(false),
        company_id: Set(company_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*state.db)
    .await
    .expect("seed user");

    let token = state.auth.issue_token(&model).expect("issue test token");
    TestUser { model, token }
}
