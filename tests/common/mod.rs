// Shared across integration test binaries; not every helper is used by each.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseBackend,
    DatabaseConnection, Set, Statement,
};
use uuid::Uuid;

use salesops_api::entities::{
    customer, godown, order_item, role, sales_order, user, user_godown_access, visit,
};
use salesops_api::handlers::AppServices;

/// Helper harness backed by an in-memory SQLite database.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE godowns (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        city TEXT,
        state TEXT,
        created_at TEXT NOT NULL
    );",
    "CREATE TABLE roles (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL
    );",
    "CREATE TABLE users (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        employee_id TEXT NOT NULL,
        email TEXT NOT NULL,
        role_id TEXT,
        department TEXT,
        primary_godown_id TEXT,
        is_active INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );",
    "CREATE TABLE user_godown_access (
        user_id TEXT NOT NULL,
        godown_id TEXT NOT NULL,
        PRIMARY KEY (user_id, godown_id)
    );",
    "CREATE TABLE customers (
        id TEXT PRIMARY KEY NOT NULL,
        business_name TEXT NOT NULL,
        customer_type TEXT NOT NULL,
        city TEXT,
        state TEXT,
        credit_limit REAL NOT NULL,
        outstanding_amount REAL NOT NULL,
        assigned_godown_id TEXT,
        created_at TEXT NOT NULL
    );",
    "CREATE TABLE sales_orders (
        id TEXT PRIMARY KEY NOT NULL,
        order_number TEXT NOT NULL,
        customer_id TEXT NOT NULL,
        created_by TEXT,
        godown_id TEXT,
        status TEXT NOT NULL,
        payment_status TEXT NOT NULL,
        delivery_status TEXT NOT NULL,
        subtotal REAL NOT NULL,
        discount REAL NOT NULL,
        tax_amount REAL NOT NULL,
        total_amount REAL NOT NULL,
        paid_amount REAL NOT NULL,
        order_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT
    );",
    "CREATE TABLE order_items (
        id TEXT PRIMARY KEY NOT NULL,
        order_id TEXT NOT NULL,
        product_name TEXT NOT NULL,
        grade TEXT,
        quantity REAL NOT NULL,
        unit TEXT NOT NULL,
        rate_per_unit REAL NOT NULL,
        total_amount REAL NOT NULL,
        packaging TEXT
    );",
    "CREATE TABLE visits (
        id TEXT PRIMARY KEY NOT NULL,
        created_by TEXT,
        godown_id TEXT,
        customer_id TEXT,
        location TEXT,
        image_url TEXT,
        visit_date TEXT NOT NULL,
        created_at TEXT NOT NULL
    );",
];

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // One connection: each in-memory SQLite connection is its own DB.
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1);

        let db = Database::connect(options)
            .await
            .expect("failed to create test database");

        for ddl in SCHEMA {
            db.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                (*ddl).to_string(),
            ))
            .await
            .expect("failed to create schema");
        }

        let db = Arc::new(db);
        let services = AppServices::new(db.clone());
        Self { db, services }
    }

    pub fn ts(&self, year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    pub async fn seed_godown(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        godown::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            city: Set(Some("Indore".to_string())),
            state: Set(Some("MP".to_string())),
            created_at: Set(self.ts(2024, 1, 1)),
        }
        .insert(&*self.db)
        .await
        .expect("seed godown");
        id
    }

    pub async fn seed_role(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        role::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
        }
        .insert(&*self.db)
        .await
        .expect("seed role");
        id
    }

    pub async fn seed_user(
        &self,
        name: &str,
        role_id: Option<Uuid>,
        primary_godown: Option<Uuid>,
    ) -> user::Model {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            employee_id: Set(format!("EMP-{}", &Uuid::new_v4().simple().to_string()[..6])),
            email: Set(format!("{}@salesops.test", Uuid::new_v4().simple())),
            role_id: Set(role_id),
            department: Set(Some("Sales".to_string())),
            primary_godown_id: Set(primary_godown),
            is_active: Set(true),
            created_at: Set(self.ts(2024, 1, 1)),
        }
        .insert(&*self.db)
        .await
        .expect("seed user")
    }

    pub async fn grant_godown_access(&self, user_id: Uuid, godown_id: Uuid) {
        user_godown_access::ActiveModel {
            user_id: Set(user_id),
            godown_id: Set(godown_id),
        }
        .insert(&*self.db)
        .await
        .expect("seed godown access");
    }

    pub async fn seed_customer(&self, name: &str, assigned_godown: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        customer::ActiveModel {
            id: Set(id),
            business_name: Set(name.to_string()),
            customer_type: Set("retailer".to_string()),
            city: Set(Some("Indore".to_string())),
            state: Set(Some("MP".to_string())),
            credit_limit: Set(Decimal::new(500_000, 0)),
            outstanding_amount: Set(Decimal::ZERO),
            assigned_godown_id: Set(assigned_godown),
            created_at: Set(self.ts(2024, 1, 1)),
        }
        .insert(&*self.db)
        .await
        .expect("seed customer")
        .id;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn seed_order(
        &self,
        order_number: &str,
        customer_id: Uuid,
        created_by: Option<Uuid>,
        godown_id: Option<Uuid>,
        status: &str,
        total: Decimal,
        paid: Decimal,
        order_date: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sales_order::ActiveModel {
            id: Set(id),
            order_number: Set(order_number.to_string()),
            customer_id: Set(customer_id),
            created_by: Set(created_by),
            godown_id: Set(godown_id),
            status: Set(status.to_string()),
            payment_status: Set(if paid >= total { "paid" } else { "partial" }.to_string()),
            delivery_status: Set("pending".to_string()),
            subtotal: Set(total),
            discount: Set(Decimal::ZERO),
            tax_amount: Set(Decimal::ZERO),
            total_amount: Set(total),
            paid_amount: Set(paid),
            order_date: Set(order_date),
            created_at: Set(order_date),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .expect("seed order");
        id
    }

    pub async fn seed_item(
        &self,
        order_id: Uuid,
        grade: Option<&str>,
        quantity: Decimal,
        unit: &str,
        rate: Decimal,
        packaging: Option<&str>,
    ) {
        order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_name: Set("Chakki Atta".to_string()),
            grade: Set(grade.map(Into::into)),
            quantity: Set(quantity),
            unit: Set(unit.to_string()),
            rate_per_unit: Set(rate),
            total_amount: Set(quantity * rate),
            packaging: Set(packaging.map(Into::into)),
        }
        .insert(&*self.db)
        .await
        .expect("seed order item");
    }

    pub async fn seed_visit(
        &self,
        created_by: Option<Uuid>,
        godown_id: Option<Uuid>,
        customer_id: Option<Uuid>,
        visit_date: DateTime<Utc>,
    ) {
        visit::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_by: Set(created_by),
            godown_id: Set(godown_id),
            customer_id: Set(customer_id),
            location: Set(Some("field".to_string())),
            image_url: Set(None),
            visit_date: Set(visit_date),
            created_at: Set(visit_date),
        }
        .insert(&*self.db)
        .await
        .expect("seed visit");
    }
}
