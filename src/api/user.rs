use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::ApiError,
    model::{bank::BankAccount, role::Role, user::User},
    utils::{
        pagination::{PageMeta, PageQuery, PageRequest, page_meta},
        shift_cache,
    },
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::ToSchema;

/// A user as exposed over the API: no password hash, no active flag.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "Ramesh")]
    pub name: String,
    #[schema(example = "scanner")]
    pub role: String,
    #[schema(example = 9876543210i64)]
    pub mobile1: i64,
    pub mobile2: i64,
    #[schema(example = "1990-05-17", format = "date", value_type = String)]
    pub dob: NaiveDate,
    pub photo: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub morning: bool,
    pub evening: bool,
    pub night: bool,
    pub salary: i64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankAccount>,
}

impl UserProfile {
    pub fn from_user(user: User, bank: Option<BankAccount>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            mobile1: user.mobile1,
            mobile2: user.mobile2,
            dob: user.dob,
            photo: user.photo,
            address: user.address,
            city: user.city,
            state: user.state,
            morning: user.morning,
            evening: user.evening,
            night: user.night,
            salary: user.salary,
            created_at: user.created_at,
            bank,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub users: Vec<UserProfile>,
}

const USER_COLUMNS: &str = "id, name, password, role, mobile1, mobile2, dob, photo, address, \
                            city, state, active, morning, evening, night, salary, created_at, updated_at";

async fn load_profile(pool: &MySqlPool, user_id: u64) -> Result<Option<UserProfile>, ApiError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(user) = user else {
        return Ok(None);
    };

    let bank = sqlx::query_as::<_, BankAccount>(
        r#"
        SELECT id, user_id, account_number, bank_name, account_name, ifsc, city,
               itr1, itr2, aadhar, created_at, updated_at
        FROM banks
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::internal(e, "Failed to fetch bank account"))?;

    Ok(Some(UserProfile::from_user(user, bank)))
}

/// GET own user details
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Details of user returned successfully", body = UserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn get_own_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let profile = load_profile(pool.get_ref(), auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// GET user details
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(
        ("id" = u64, Path, description = "Id of the user")
    ),
    responses(
        (status = 200, description = "Details of user returned successfully", body = UserProfile),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_any(Role::PROFILE_READERS)?;

    let user_id = path.into_inner();
    let profile = load_profile(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// GET details of all the users
#[utoipa::path(
    get,
    path = "/api/users",
    params(PageQuery),
    responses(
        (status = 200, description = "List of all users returned successfully", body = UserListResponse),
        (status = 400, description = "Page size and page number must be greater than 0"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_admin()?;

    let page = PageRequest::new(query.page, query.size)?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count users"))?;

    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL \
         ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    debug!(page = page.page, size = page.size, "Fetching users");

    let users = sqlx::query_as::<_, User>(&sql)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch users"))?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        meta: page_meta(total.max(0) as u64, page, &config.base_url, "users"),
        users: users
            .into_iter()
            .map(|u| UserProfile::from_user(u, None))
            .collect(),
    }))
}

/// DELETE user
#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    params(
        ("id" = u64, Path, description = "Id of the user")
    ),
    responses(
        (status = 200, description = "User successfully deleted.", body = Object, example = json!({
            "deleted": true
        })),
        (status = 403, description = "You can not delete yourself")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    if user_id == auth.user_id {
        return Err(ApiError::forbidden("You can not delete yourself"));
    }

    let result = sqlx::query(
        "UPDATE users SET deleted_at = CURRENT_TIMESTAMP(3) WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;

    shift_cache::invalidate(user_id).await;
    info!(user_id, by = auth.user_id, affected = result.rows_affected(), "User deleted");

    Ok(HttpResponse::Ok().json(json!({ "deleted": true })))
}
