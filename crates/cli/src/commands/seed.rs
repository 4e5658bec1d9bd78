//! Seed the database from a YAML fixture file.
//!
//! # Fixture Format
//!
//! ```yaml
//! customers:
//!   - name: Ada Lovelace
//!     email: ada@example.com
//!     phone: "+441234567890"
//!     account:
//!       username: ada1815
//!       password: "engine#1843"
//! products:
//!   - name: Widget
//!     price: 10.00
//!     stock_level: 3
//! orders:
//!   - customer: ada@example.com
//!     date: "2024-01-15"
//!     status: pending
//!     products: [Widget]
//! ```
//!
//! Orders refer to customers by email and to products by name, so both must be
//! unique within the file (emails ignoring case). The whole file is validated
//! before anything is written, and all rows are inserted in one transaction.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use online_shopping_api::db::{insert_account, insert_customer, insert_order, insert_product};
use online_shopping_api::models::account::{CreateAccountRequest, NewAccount};
use online_shopping_api::models::customer::{CreateCustomerRequest, NewCustomer};
use online_shopping_api::models::order::{CreateOrderRequest, NewOrder};
use online_shopping_api::models::product::{CreateProductRequest, NewProduct};
use online_shopping_api::services::password::hash_password;
use online_shopping_core::{CustomerId, ProductId, ValidationErrors};

/// Errors found while reading a fixture file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file is not valid YAML for the fixture format.
    #[error("Invalid fixture file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An entry failed validation.
    #[error("{entry}: {}", .errors.summary())]
    Invalid {
        entry: String,
        errors: ValidationErrors,
    },

    /// Two customers share an email, ignoring case.
    #[error("Customer {0}: duplicate email {1}")]
    DuplicateCustomer(usize, String),

    /// Two products share a name.
    #[error("Product {0}: duplicate name {1}")]
    DuplicateProduct(usize, String),

    /// An order names a customer email not listed in the file.
    #[error("Order {0}: unknown customer {1}")]
    UnknownCustomer(usize, String),

    /// An order names a product not listed in the file.
    #[error("Order {0}: unknown product {1}")]
    UnknownProduct(usize, String),
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    customers: Vec<CustomerFixture>,
    #[serde(default)]
    products: Vec<CreateProductRequest>,
    #[serde(default)]
    orders: Vec<OrderFixture>,
}

#[derive(Debug, Deserialize)]
struct CustomerFixture {
    #[serde(flatten)]
    customer: CreateCustomerRequest,
    account: Option<AccountFixture>,
}

#[derive(Debug, Deserialize)]
struct AccountFixture {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderFixture {
    customer: String,
    date: Option<String>,
    status: Option<String>,
    #[serde(default)]
    products: Vec<String>,
}

/// A validated fixture, ready to insert.
#[derive(Debug)]
struct SeedPlan {
    customers: Vec<(NewCustomer, Option<NewAccount>)>,
    products: Vec<NewProduct>,
    orders: Vec<PlannedOrder>,
}

#[derive(Debug)]
struct PlannedOrder {
    /// Validated fields; customer and product IDs are filled in on insert.
    order: NewOrder,
    customer: String,
    products: Vec<String>,
}

/// Counts of inserted rows.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub customers: usize,
    pub accounts: usize,
    pub products: usize,
    pub orders: usize,
}

// IDs are assigned by the database; validation runs before any exist.
const PENDING_ID: i32 = 0;

fn invalid(entry: String) -> impl FnOnce(ValidationErrors) -> SeedError {
    move |errors| SeedError::Invalid { entry, errors }
}

/// Parse and validate a fixture without touching the database.
fn plan(content: &str) -> Result<SeedPlan, SeedError> {
    let fixture: Fixture = serde_yaml::from_str(content)?;

    let mut customers = Vec::with_capacity(fixture.customers.len());
    let mut emails = HashSet::with_capacity(fixture.customers.len());
    for (i, entry) in fixture.customers.into_iter().enumerate() {
        let customer = entry
            .customer
            .validate()
            .map_err(invalid(format!("Customer {}", i + 1)))?;
        if !emails.insert(customer.email.as_str().to_lowercase()) {
            return Err(SeedError::DuplicateCustomer(
                i + 1,
                customer.email.as_str().to_owned(),
            ));
        }
        let account = entry
            .account
            .map(|a| {
                CreateAccountRequest {
                    customer_id: Some(CustomerId::new(PENDING_ID)),
                    username: a.username,
                    password: a.password,
                }
                .validate()
                .map_err(invalid(format!("Account of customer {}", i + 1)))
            })
            .transpose()?;
        customers.push((customer, account));
    }

    let products = fixture
        .products
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.validate().map_err(invalid(format!("Product {}", i + 1))))
        .collect::<Result<Vec<_>, _>>()?;

    let mut names = HashSet::with_capacity(products.len());
    for (i, product) in products.iter().enumerate() {
        if !names.insert(product.name.as_str()) {
            return Err(SeedError::DuplicateProduct(i + 1, product.name.clone()));
        }
    }

    let mut orders = Vec::with_capacity(fixture.orders.len());
    for (i, entry) in fixture.orders.into_iter().enumerate() {
        let position = i + 1;
        let email = entry.customer.to_lowercase();
        if !emails.contains(&email) {
            return Err(SeedError::UnknownCustomer(position, entry.customer));
        }
        if let Some(name) = entry
            .products
            .iter()
            .find(|name| !names.contains(name.as_str()))
        {
            return Err(SeedError::UnknownProduct(position, name.clone()));
        }

        let order = CreateOrderRequest {
            customer_id: Some(CustomerId::new(PENDING_ID)),
            date: entry.date,
            status: entry.status,
            product_ids: Some(Vec::new()),
        }
        .validate()
        .map_err(invalid(format!("Order {position}")))?;

        orders.push(PlannedOrder {
            order,
            customer: email,
            products: entry.products,
        });
    }

    Ok(SeedPlan {
        customers,
        products,
        orders,
    })
}

/// Seed the database from a YAML fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or an
/// insert fails.
pub async fn from_file(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading fixture");

    // Read and validate before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let plan = plan(&content).inspect_err(|e| error!("Fixture validation failed: {e}"))?;

    info!(
        customers = plan.customers.len(),
        products = plan.products.len(),
        orders = plan.orders.len(),
        "Fixture validated"
    );

    let (_, pool) = super::connect().await?;
    let result = insert(&pool, plan).await?;

    info!("Seeding complete!");
    info!("  Customers inserted: {}", result.customers);
    info!("  Accounts inserted: {}", result.accounts);
    info!("  Products inserted: {}", result.products);
    info!("  Orders inserted: {}", result.orders);

    Ok(())
}

async fn insert(
    pool: &sqlx::PgPool,
    plan: SeedPlan,
) -> Result<SeedResult, Box<dyn std::error::Error>> {
    let mut result = SeedResult::default();
    let mut customer_ids: HashMap<String, CustomerId> = HashMap::new();
    let mut product_ids: HashMap<String, ProductId> = HashMap::new();

    // Dropped without commit on any error, rolling back every insert
    let mut tx = pool.begin().await?;

    for (input, account) in plan.customers {
        let customer = insert_customer(&mut *tx, &input).await?;
        result.customers += 1;

        if let Some(mut account) = account {
            account.customer_id = customer.customer_id;
            let password_hash = hash_password(&account.password)?;
            insert_account(&mut *tx, &account, &password_hash).await?;
            result.accounts += 1;
        }
        customer_ids.insert(customer.email.as_str().to_lowercase(), customer.customer_id);
    }

    for input in plan.products {
        let product = insert_product(&mut *tx, &input).await?;
        product_ids.insert(product.name.clone(), product.product_id);
        result.products += 1;
    }

    for planned in plan.orders {
        let mut order = planned.order;
        order.customer_id = customer_ids
            .get(&planned.customer)
            .copied()
            .ok_or_else(|| format!("Customer {} was not inserted", planned.customer))?;
        for name in &planned.products {
            let id = product_ids
                .get(name)
                .copied()
                .ok_or_else(|| format!("Product {name} was not inserted"))?;
            if !order.product_ids.contains(&id) {
                order.product_ids.push(id);
            }
        }
        insert_order(&mut tx, &order).await?;
        result.orders += 1;
    }

    tx.commit().await?;

    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
customers:
  - name: Ada Lovelace
    email: ada@example.com
    phone: "+441234567890"
    account:
      username: ada1815
      password: "engine#1843"
  - name: Alan Turing
    email: alan@example.com
    phone: "+441234567891"
products:
  - name: Widget
    price: 10.00
    stock_level: 3
  - name: Gadget
    price: 5.50
orders:
  - customer: ADA@example.com
    date: "2024-01-15"
    products: [Widget, Gadget, Widget]
"#;

    #[test]
    fn test_plan_valid_fixture() {
        let plan = plan(FIXTURE).unwrap();

        assert_eq!(plan.customers.len(), 2);
        assert!(plan.customers[0].1.is_some());
        assert!(plan.customers[1].1.is_none());
        assert_eq!(plan.products.len(), 2);
        assert_eq!(plan.products[1].stock_level, 0);
        assert_eq!(plan.orders.len(), 1);
        assert_eq!(plan.orders[0].customer, "ada@example.com");
    }

    #[test]
    fn test_plan_empty_fixture() {
        let plan = plan("{}").unwrap();
        assert!(plan.customers.is_empty());
        assert!(plan.products.is_empty());
        assert!(plan.orders.is_empty());
    }

    #[test]
    fn test_plan_rejects_invalid_customer() {
        let err = plan(
            r"
customers:
  - name: Ada
    email: not-an-email
    phone: '+441234567890'
",
        )
        .unwrap_err();

        match err {
            SeedError::Invalid { entry, errors } => {
                assert_eq!(entry, "Customer 1");
                assert_eq!(errors.messages_for("email").count(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_rejects_unknown_product() {
        let err = plan(
            r"
customers:
  - name: Ada
    email: ada@example.com
    phone: '+441234567890'
orders:
  - customer: ada@example.com
    date: '2024-01-15'
    products: [Sprocket]
",
        )
        .unwrap_err();

        assert!(matches!(err, SeedError::UnknownProduct(1, ref name) if name == "Sprocket"));
    }

    #[test]
    fn test_plan_rejects_unknown_customer() {
        let err = plan(
            r"
orders:
  - customer: nobody@example.com
    date: '2024-01-15'
",
        )
        .unwrap_err();

        assert!(matches!(err, SeedError::UnknownCustomer(1, _)));
    }

    #[test]
    fn test_plan_rejects_bad_order_date() {
        let err = plan(
            r"
customers:
  - name: Ada
    email: ada@example.com
    phone: '+441234567890'
orders:
  - customer: ada@example.com
    date: '15/01/2024'
",
        )
        .unwrap_err();

        assert!(matches!(err, SeedError::Invalid { ref entry, .. } if entry == "Order 1"));
    }

    #[test]
    fn test_plan_rejects_duplicate_email() {
        let err = plan(
            r"
customers:
  - name: Ada
    email: ada@example.com
    phone: '+441234567890'
  - name: Ada Again
    email: ADA@Example.com
    phone: '+441234567891'
",
        )
        .unwrap_err();

        assert!(matches!(err, SeedError::DuplicateCustomer(2, ref email) if email == "ADA@Example.com"));
    }

    #[test]
    fn test_plan_rejects_duplicate_product_name() {
        let err = plan(
            r"
products:
  - name: Widget
    price: 10.00
  - name: Widget
    price: 12.00
",
        )
        .unwrap_err();

        assert!(matches!(err, SeedError::DuplicateProduct(2, ref name) if name == "Widget"));
    }

    // ========================================================================
    // Insert (requires PostgreSQL)
    // ========================================================================

    async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
    async fn test_insert_writes_whole_fixture() {
        let ctx = online_shopping_integration_tests::TestContext::new().await;

        let result = insert(&ctx.pool, plan(FIXTURE).unwrap()).await.unwrap();

        assert_eq!(
            result,
            SeedResult {
                customers: 2,
                accounts: 1,
                products: 2,
                orders: 1,
            }
        );
        assert_eq!(count(&ctx.pool, "order_product").await, 2);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (set TEST_DATABASE_URL)"]
    async fn test_insert_failure_leaves_database_untouched() {
        let ctx = online_shopping_integration_tests::TestContext::new().await;
        let existing = ctx.create_customer("Grace", "grace@example.com").await;
        let taken = ctx
            .post(
                "/accounts",
                serde_json::json!({"customer_id": existing, "username": "ada1815", "password": "engine#1843"}),
            )
            .await;
        assert_eq!(taken.status.as_u16(), 201);

        // Ada's account collides with the stored username after Ada is inserted
        let err = insert(&ctx.pool, plan(FIXTURE).unwrap()).await.unwrap_err();
        assert_eq!(err.to_string(), "constraint violation: Username is already taken.");

        assert_eq!(count(&ctx.pool, "customer").await, 1);
        assert_eq!(count(&ctx.pool, "customer_account").await, 1);
        assert_eq!(count(&ctx.pool, "product").await, 0);
        assert_eq!(count(&ctx.pool, "customer_order").await, 0);
    }
}
