// Typed query layer. One section per table; every protected handler goes
// through these instead of issuing SQL of its own.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::access::{Actor, PropertyScope, Role};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::expense::Expense;
use crate::database::models::maintenance::{MaintenanceRequest, MaintenanceStatus};
use crate::database::models::message::Message;
use crate::database::models::payment::{Payment, PaymentKind};
use crate::database::models::property::{Property, PropertyStatus};
use crate::database::models::tenant::Tenant;
use crate::database::models::user::User;

// ---------------------------------------------------------------------------
// users

pub async fn find_user_by_email(email: &str) -> Result<Option<User>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?;

    Ok(user)
}

pub async fn insert_user(
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(&pool)
    .await?;

    Ok(user)
}

// ---------------------------------------------------------------------------
// properties

pub struct NewProperty {
    pub address: String,
    pub image_url: Option<String>,
    pub status: PropertyStatus,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent_amount: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
}

pub async fn insert_property(
    landlord_id: Uuid,
    new: NewProperty,
) -> Result<Property, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let property = sqlx::query_as::<_, Property>(
        "INSERT INTO properties
             (address, image_url, status, lease_start, lease_end,
              rent_amount, security_deposit, landlord_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(&new.address)
    .bind(&new.image_url)
    .bind(new.status)
    .bind(new.lease_start)
    .bind(new.lease_end)
    .bind(new.rent_amount)
    .bind(new.security_deposit)
    .bind(landlord_id)
    .fetch_one(&pool)
    .await?;

    Ok(property)
}

pub async fn find_property(id: Uuid) -> Result<Option<Property>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    Ok(property)
}

/// Role-filtered property listing: landlords see what they own, tenants see
/// what they occupy. The SQL predicates mirror `access::can_view_property`
/// record for record.
pub async fn list_properties_for_actor(actor: &Actor) -> Result<Vec<Property>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let properties = match actor.role {
        Role::Landlord => {
            sqlx::query_as::<_, Property>(
                "SELECT * FROM properties WHERE landlord_id = $1 ORDER BY created_at",
            )
            .bind(actor.id)
            .fetch_all(&pool)
            .await?
        }
        Role::Tenant => {
            sqlx::query_as::<_, Property>(
                "SELECT p.* FROM properties p
                 JOIN tenants t ON t.property_id = p.id
                 WHERE t.user_id = $1
                 ORDER BY p.created_at",
            )
            .bind(actor.id)
            .fetch_all(&pool)
            .await?
        }
    };

    Ok(properties)
}

/// User ids of the tenants currently linked to a property.
pub async fn tenant_user_ids(property_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT user_id FROM tenants WHERE property_id = $1 AND user_id IS NOT NULL",
    )
    .bind(property_id)
    .fetch_all(&pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Ownership snapshot for an already-loaded property.
pub async fn scope_for_property(property: &Property) -> Result<PropertyScope, DatabaseError> {
    let tenants = tenant_user_ids(property.id).await?;
    Ok(PropertyScope::with_tenants(property.landlord_id, tenants))
}

/// Ownership snapshot by property id; `None` when the property is absent.
pub async fn scope_for_property_id(
    property_id: Uuid,
) -> Result<Option<PropertyScope>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let landlord: Option<(Uuid,)> =
        sqlx::query_as("SELECT landlord_id FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(&pool)
            .await?;

    let Some((landlord_id,)) = landlord else {
        return Ok(None);
    };

    let tenants = tenant_user_ids(property_id).await?;
    Ok(Some(PropertyScope::with_tenants(landlord_id, tenants)))
}

// ---------------------------------------------------------------------------
// tenants

pub struct NewTenant {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub property_id: Uuid,
    pub user_id: Option<Uuid>,
}

pub async fn insert_tenant(new: NewTenant) -> Result<Tenant, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let tenant = sqlx::query_as::<_, Tenant>(
        "INSERT INTO tenants
             (name, email, phone, lease_start, lease_end, property_id, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(new.lease_start)
    .bind(new.lease_end)
    .bind(new.property_id)
    .bind(new.user_id)
    .fetch_one(&pool)
    .await?;

    Ok(tenant)
}

pub async fn find_tenant(id: Uuid) -> Result<Option<Tenant>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    Ok(tenant)
}

pub async fn list_tenants_for_property(property_id: Uuid) -> Result<Vec<Tenant>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let tenants = sqlx::query_as::<_, Tenant>(
        "SELECT * FROM tenants WHERE property_id = $1 ORDER BY created_at",
    )
    .bind(property_id)
    .fetch_all(&pool)
    .await?;

    Ok(tenants)
}

/// Role-filtered tenant listing: landlords see the tenants of properties
/// they own, tenant accounts see their own occupancy records.
pub async fn list_tenants_for_actor(actor: &Actor) -> Result<Vec<Tenant>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let tenants = match actor.role {
        Role::Landlord => {
            sqlx::query_as::<_, Tenant>(
                "SELECT t.* FROM tenants t
                 JOIN properties p ON p.id = t.property_id
                 WHERE p.landlord_id = $1
                 ORDER BY t.created_at",
            )
            .bind(actor.id)
            .fetch_all(&pool)
            .await?
        }
        Role::Tenant => {
            sqlx::query_as::<_, Tenant>(
                "SELECT * FROM tenants WHERE user_id = $1 ORDER BY created_at",
            )
            .bind(actor.id)
            .fetch_all(&pool)
            .await?
        }
    };

    Ok(tenants)
}

pub async fn delete_tenant(id: Uuid) -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Tenant not found".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// payments

pub struct NewPayment {
    pub property_id: Uuid,
    pub sender: String,
    pub amount: Decimal,
    pub kind: PaymentKind,
    pub processor_intent_id: String,
}

pub async fn insert_payment(new: NewPayment) -> Result<Payment, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (sender, amount, kind, processor_intent_id, property_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(&new.sender)
    .bind(new.amount)
    .bind(new.kind)
    .bind(&new.processor_intent_id)
    .bind(new.property_id)
    .fetch_one(&pool)
    .await?;

    Ok(payment)
}

pub async fn find_payment(id: Uuid) -> Result<Option<Payment>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    Ok(payment)
}

pub async fn list_payments_for_property(property_id: Uuid) -> Result<Vec<Payment>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE property_id = $1 ORDER BY paid_on DESC",
    )
    .bind(property_id)
    .fetch_all(&pool)
    .await?;

    Ok(payments)
}

/// Correction update. The processor intent id and payment date are
/// immutable and deliberately absent here.
pub async fn update_payment(
    id: Uuid,
    sender: &str,
    amount: Decimal,
    kind: PaymentKind,
) -> Result<Payment, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments SET sender = $2, amount = $3, kind = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(sender)
    .bind(amount)
    .bind(kind)
    .fetch_optional(&pool)
    .await?;

    payment.ok_or_else(|| DatabaseError::NotFound("Payment not found".to_string()))
}

pub async fn delete_payment(id: Uuid) -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Payment not found".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// expenses

pub struct NewExpense {
    pub property_id: Uuid,
    pub description: String,
    pub cost: Decimal,
    pub incurred_on: Option<NaiveDate>,
}

pub async fn insert_expense(new: NewExpense) -> Result<Expense, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let expense = sqlx::query_as::<_, Expense>(
        "INSERT INTO expenses (description, cost, incurred_on, property_id)
         VALUES ($1, $2, COALESCE($3, CURRENT_DATE), $4)
         RETURNING *",
    )
    .bind(&new.description)
    .bind(new.cost)
    .bind(new.incurred_on)
    .bind(new.property_id)
    .fetch_one(&pool)
    .await?;

    Ok(expense)
}

pub async fn find_expense(id: Uuid) -> Result<Option<Expense>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    Ok(expense)
}

pub async fn list_expenses_for_property(property_id: Uuid) -> Result<Vec<Expense>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let expenses = sqlx::query_as::<_, Expense>(
        "SELECT * FROM expenses WHERE property_id = $1 ORDER BY incurred_on DESC",
    )
    .bind(property_id)
    .fetch_all(&pool)
    .await?;

    Ok(expenses)
}

pub async fn delete_expense(id: Uuid) -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Expense not found".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// messages

pub async fn insert_message(
    property_id: Uuid,
    sender: &str,
    body: &str,
) -> Result<Message, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (sender, body, property_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(sender)
    .bind(body)
    .bind(property_id)
    .fetch_one(&pool)
    .await?;

    Ok(message)
}

pub async fn find_message(id: Uuid) -> Result<Option<Message>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    Ok(message)
}

pub async fn list_messages_for_property(property_id: Uuid) -> Result<Vec<Message>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE property_id = $1 ORDER BY sent_at",
    )
    .bind(property_id)
    .fetch_all(&pool)
    .await?;

    Ok(messages)
}

pub async fn delete_message(id: Uuid) -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Message not found".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// maintenance requests

pub async fn insert_maintenance(
    property_id: Uuid,
    description: &str,
) -> Result<MaintenanceRequest, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let request = sqlx::query_as::<_, MaintenanceRequest>(
        "INSERT INTO maintenance_requests (description, property_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(description)
    .bind(property_id)
    .fetch_one(&pool)
    .await?;

    Ok(request)
}

pub async fn find_maintenance(id: Uuid) -> Result<Option<MaintenanceRequest>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let request =
        sqlx::query_as::<_, MaintenanceRequest>("SELECT * FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;

    Ok(request)
}

pub async fn list_maintenance_for_property(
    property_id: Uuid,
) -> Result<Vec<MaintenanceRequest>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let requests = sqlx::query_as::<_, MaintenanceRequest>(
        "SELECT * FROM maintenance_requests WHERE property_id = $1 ORDER BY opened_on DESC",
    )
    .bind(property_id)
    .fetch_all(&pool)
    .await?;

    Ok(requests)
}

pub async fn update_maintenance_status(
    id: Uuid,
    status: MaintenanceStatus,
) -> Result<MaintenanceRequest, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let request = sqlx::query_as::<_, MaintenanceRequest>(
        "UPDATE maintenance_requests SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(&pool)
    .await?;

    request.ok_or_else(|| DatabaseError::NotFound("Maintenance request not found".to_string()))
}

pub async fn delete_maintenance(id: Uuid) -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Maintenance request not found".to_string()));
    }
    Ok(())
}
