use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::ApiError,
    model::bank::BankAccount,
    utils::pagination::{PageMeta, PageRequest, page_meta},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::collections::HashMap;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBankAccount {
    /// Id of the worker
    #[schema(example = 12)]
    pub user_id: u64,
    /// City of the bank account
    #[schema(example = "Tiruppur")]
    pub city: String,
    #[schema(example = "HDFC0001234")]
    pub ifsc: String,
    /// Name of the account holder
    #[schema(example = "Ramesh Kumar")]
    pub account_name: String,
    #[schema(example = "HDFC")]
    pub bank_name: String,
    #[schema(example = 50100234567812u64)]
    pub account_number: u64,
    pub itr1: String,
    pub aadhar: String,
    pub itr2: Option<String>,
}

impl CreateBankAccount {
    fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("city", &self.city),
            ("ifsc", &self.ifsc),
            ("accountName", &self.account_name),
            ("bankName", &self.bank_name),
            ("itr1", &self.itr1),
            ("aadhar", &self.aadhar),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::bad_request(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankQuery {
    #[schema(example = 0)]
    pub page: i64,
    #[schema(example = 20)]
    pub size: i64,
    /// name of the bank
    pub name: Option<String>,
    /// Account number of the bank account
    pub account_number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: u64,
    pub name: String,
    pub mobile1: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithUser {
    #[serde(flatten)]
    pub account: BankAccount,
    pub user: Option<UserSummary>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankListResponse {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub accounts: Vec<AccountWithUser>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Create a new bank account for an existing user
#[utoipa::path(
    post,
    path = "/api/bank",
    request_body = CreateBankAccount,
    responses(
        (status = 201, description = "New bank account added Successfully.", body = BankAccount),
        (status = 400, description = "User doesnt exist"),
        (status = 409, description = "User already has a bank account associated with him.")
    ),
    security(("bearer_auth" = [])),
    tag = "bank"
)]
pub async fn create_bank_account(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateBankAccount>,
) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO banks
            (user_id, account_number, bank_name, account_name, ifsc, city, itr1, itr2, aadhar)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.account_number)
    .bind(&payload.bank_name)
    .bind(&payload.account_name)
    .bind(&payload.ifsc)
    .bind(&payload.city)
    .bind(&payload.itr1)
    .bind(&payload.itr2)
    .bind(&payload.aadhar)
    .execute(pool.get_ref())
    .await;

    let id = match result {
        Ok(done) => done.last_insert_id(),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(ApiError::conflict(
                "Bank account with the given details already exists",
            ));
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            return Err(ApiError::bad_request("User doesnt exist"));
        }
        Err(e) => return Err(ApiError::internal(e, "Failed to create bank account")),
    };

    let account = sqlx::query_as::<_, BankAccount>(
        r#"
        SELECT id, user_id, account_number, bank_name, account_name, ifsc, city,
               itr1, itr2, aadhar, created_at, updated_at
        FROM banks
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| ApiError::internal(e, "Failed to reload bank account"))?;

    info!(account_id = id, user_id = payload.user_id, "Bank account created");

    Ok(HttpResponse::Created().json(account))
}

/// GET details of all the bank accounts
#[utoipa::path(
    get,
    path = "/api/bank",
    params(BankQuery),
    responses(
        (status = 200, description = "List of all bank accounts returned successfully", body = BankListResponse),
        (status = 400, description = "Page size and page number must be greater than 0"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "bank"
)]
pub async fn list_bank_accounts(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<BankQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_admin()?;

    let page = PageRequest::new(query.page, query.size)?;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
        where_sql.push_str(" AND bank_name = ?");
        args.push(FilterValue::Str(name));
    }

    if let Some(account_number) = query.account_number {
        where_sql.push_str(" AND account_number = ?");
        args.push(FilterValue::U64(account_number));
    }

    let count_sql = format!("SELECT COUNT(*) FROM banks{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count bank accounts"))?;

    let data_sql = format!(
        r#"
        SELECT id, user_id, account_number, bank_name, account_name, ifsc, city,
               itr1, itr2, aadhar, created_at, updated_at
        FROM banks
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    debug!(sql = %data_sql, page = page.page, size = page.size, "Fetching bank accounts");

    let mut data_q = sqlx::query_as::<_, BankAccount>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let accounts = data_q
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch bank accounts"))?;

    let owners = load_owners(pool.get_ref(), &accounts).await?;

    Ok(HttpResponse::Ok().json(BankListResponse {
        meta: page_meta(total.max(0) as u64, page, &config.base_url, "bank"),
        accounts: accounts
            .into_iter()
            .map(|account| {
                let user = owners.get(&account.user_id).cloned();
                AccountWithUser { account, user }
            })
            .collect(),
    }))
}

/// One query for all account holders of a page.
async fn load_owners(
    pool: &MySqlPool,
    accounts: &[BankAccount],
) -> Result<HashMap<u64, UserSummary>, ApiError> {
    if accounts.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; accounts.len()].join(", ");
    let sql = format!("SELECT id, name, mobile1 FROM users WHERE id IN ({placeholders})");

    let mut q = sqlx::query_as::<_, UserSummary>(&sql);
    for account in accounts {
        q = q.bind(account.user_id);
    }

    let users = q
        .fetch_all(pool)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch account holders"))?;

    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// DELETE bank account of the worker
#[utoipa::path(
    delete,
    path = "/api/bank/{id}",
    params(
        ("id" = u64, Path, description = "Id of the bank account you want to delete")
    ),
    responses(
        (status = 200, description = "Bank account successfully deleted.", body = Object, example = json!({
            "deleted": true
        })),
        (status = 400, description = "Bank account doesn't exist"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "bank"
)]
pub async fn delete_bank_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_admin()?;

    let account_id = path.into_inner();

    let result = sqlx::query("DELETE FROM banks WHERE id = ?")
        .bind(account_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete bank account"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::bad_request("Bank account doesn't exist"));
    }

    info!(account_id, by = auth.user_id, "Bank account deleted");

    Ok(HttpResponse::Ok().json(json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> CreateBankAccount {
        serde_json::from_value(json!({
            "userId": 12,
            "city": "Tiruppur",
            "ifsc": "HDFC0001234",
            "accountName": "Ramesh Kumar",
            "bankName": "HDFC",
            "accountNumber": 50100234567812u64,
            "itr1": "ITR-2023",
            "aadhar": "1234 5678 9012"
        }))
        .unwrap()
    }

    #[test]
    fn camel_case_payload_parses() {
        let req = account();
        assert_eq!(req.user_id, 12);
        assert_eq!(req.itr2, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut req = account();
        req.ifsc = " ".into();
        assert_eq!(req.validate().unwrap_err().to_string(), "ifsc must not be empty");
    }
}
