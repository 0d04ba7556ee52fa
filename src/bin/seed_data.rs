//! Seed data script - populates the database with demo accounts and a small catalog
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates or refreshes:
//! - buyer, supplier, carrier and recycler demo accounts (password `Demo1234!`)
//! - one supplier company with a handful of materials

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use tracing::info;
use uuid::Uuid;

use marketplace_api::{
    auth::password::hash_password,
    config, db,
    entities::{
        company::{self, CompanyType},
        material::{self, MaterialCategory, MaterialUnit},
        user::{self, UserStatus, UserType},
    },
};

const DEMO_PASSWORD: &str = "Demo1234!";
const DEMO_PHONE: &str = "+371 20 000 000";
const SUPPLIER_NAME: &str = "Baltic Aggregates SIA";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Marketplace Seed Data ===");

    let cfg = config::load_config()?;
    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;

    let supplier = ensure_supplier_company(&pool).await?;
    info!(company_id = %supplier.id, "Supplier company ready");

    let accounts = [
        ("buyer@demo.com", "Demo", "Buyer", UserType::Buyer, None),
        ("supplier@demo.com", "Demo", "Supplier", UserType::Supplier, Some(supplier.id)),
        ("carrier@demo.com", "Demo", "Carrier", UserType::Carrier, None),
        ("recycler@demo.com", "Demo", "Recycler", UserType::Recycler, None),
    ];
    for (email, first_name, last_name, user_type, company_id) in accounts {
        upsert_user(&pool, email, first_name, last_name, user_type, company_id).await?;
        info!("  {} ready", email);
    }

    let created = ensure_materials(&pool, &supplier, &cfg.currency).await?;
    info!("  Created {} materials", created);

    info!("Seed complete. Log in with any demo account and password {}", DEMO_PASSWORD);
    Ok(())
}

async fn ensure_supplier_company(db: &DatabaseConnection) -> anyhow::Result<company::Model> {
    if let Some(existing) = company::Entity::find()
        .filter(company::Column::Name.eq(SUPPLIER_NAME))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let model = company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(SUPPLIER_NAME.to_string()),
        company_type: Set(CompanyType::Supplier),
        email: Set(Some("sales@balticaggregates.lv".to_string())),
        phone: Set(Some(DEMO_PHONE.to_string())),
        logo: Set(None),
        rating: Set(Some(dec!(4.60))),
        city: Set(Some("Riga".to_string())),
        country: Set(Some("LV".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Creates the account, or resets password, status and company on an existing one
async fn upsert_user(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
    user_type: UserType,
    company_id: Option<Uuid>,
) -> anyhow::Result<()> {
    let password_hash = hash_password(DEMO_PASSWORD.to_string()).await?;
    let now = Utc::now();

    match user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
    {
        Some(existing) => {
            let mut active = existing.into_active_model();
            active.password_hash = Set(password_hash);
            active.status = Set(UserStatus::Active);
            active.user_type = Set(user_type);
            active.company_id = Set(company_id);
            active.phone = Set(Some(DEMO_PHONE.to_string()));
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            user::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(email.to_string()),
                password_hash: Set(password_hash),
                first_name: Set(first_name.to_string()),
                last_name: Set(last_name.to_string()),
                phone: Set(Some(DEMO_PHONE.to_string())),
                avatar: Set(None),
                user_type: Set(user_type),
                status: Set(UserStatus::Active),
                email_verified: Set(true),
                phone_verified: Set(true),
                company_id: Set(company_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

async fn ensure_materials(
    db: &DatabaseConnection,
    supplier: &company::Model,
    currency: &str,
) -> anyhow::Result<usize> {
    let catalog: [(&str, MaterialCategory, Option<&str>, Decimal, MaterialUnit, bool); 5] = [
        ("Washed gravel 16/32", MaterialCategory::Gravel, Some("Washed"), dec!(18.50), MaterialUnit::Tonne, false),
        ("Building sand 0/4", MaterialCategory::Sand, Some("Fine"), dec!(12.90), MaterialUnit::Tonne, false),
        ("Recycled concrete aggregate", MaterialCategory::Aggregates, Some("RCA 0/45"), dec!(9.75), MaterialUnit::Tonne, true),
        ("Ready-mix concrete C25/30", MaterialCategory::Concrete, None, dec!(96.00), MaterialUnit::M3, false),
        ("Topsoil, screened", MaterialCategory::Soil, None, dec!(21.40), MaterialUnit::M3, false),
    ];

    let mut created = 0;
    for (name, category, sub_category, price, unit, recycled) in catalog {
        let exists = material::Entity::find()
            .filter(material::Column::SupplierId.eq(supplier.id))
            .filter(material::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(format!("{} delivered from our Riga yard", name))),
            category: Set(category),
            sub_category: Set(sub_category.map(str::to_string)),
            base_price: Set(price),
            unit: Set(unit),
            currency: Set(currency.to_string()),
            in_stock: Set(true),
            min_order: Set(Some(dec!(1))),
            max_order: Set(None),
            is_recycled: Set(recycled),
            quality: Set(None),
            certificates: Set(serde_json::json!(["CE"])),
            images: Set(serde_json::json!([])),
            specifications: Set(None),
            supplier_id: Set(supplier.id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        created += 1;
    }

    Ok(created)
}
