use crate::{
    api::user::UserProfile,
    auth::{
        jwt::generate_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::ApiError,
    model::{reset_code::ResetCode, role::Role, user::User},
    models::{LoginReqDto, ResetPasswordDto, ResetRequestDto, SignupReq},
    utils::name_filter,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_MOBILE: i64 = 9_999_999_999;

fn require_text(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::bad_request(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn require_mobile(value: i64, field: &str) -> Result<(), ApiError> {
    if value > 0 && value <= MAX_MOBILE {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "{field} must be a positive number of at most 10 digits"
        )))
    }
}

pub fn validate_signup(req: &SignupReq) -> Result<(), ApiError> {
    require_text(&req.name, "name")?;
    require_text(&req.password, "password")?;
    require_text(&req.address, "address")?;
    require_text(&req.city, "city")?;
    require_text(&req.state, "state")?;
    require_mobile(req.mobile1, "mobile1")?;
    if let Some(mobile2) = req.mobile2 {
        require_mobile(mobile2, "mobile2")?;
    }
    Ok(())
}

async fn find_user_by_name(pool: &MySqlPool, name: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, password, role, mobile1, mobile2, dob, photo, address, city, state,
               active, morning, evening, night, salary, created_at, updated_at
        FROM users
        WHERE name = ? AND deleted_at IS NULL
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::internal(e, "Database error while fetching user"))
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/api/user",
    request_body = SignupReq,
    responses(
        (status = 201, description = "New User Created Successfully.", body = Object, example = json!({
            "success": true
        })),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "User with the given name already exist.")
    ),
    tag = "user"
)]
pub async fn signup(
    user: web::Json<SignupReq>,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    validate_signup(&user)?;

    let hashed = hash_password(&user.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let name = user.name.trim();

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (name, password, role, mobile1, mobile2, dob, address, city, state, morning, evening, night)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(&hashed)
    .bind(user.role.as_ref())
    .bind(user.mobile1)
    .bind(user.mobile2.unwrap_or(0))
    .bind(user.dob)
    .bind(&user.address)
    .bind(&user.city)
    .bind(&user.state)
    .bind(user.morning.unwrap_or(true))
    .bind(user.evening.unwrap_or(false))
    .bind(user.night.unwrap_or(false))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            name_filter::insert(name);
            info!(name, role = %user.role, "User registered");
            Ok(HttpResponse::Created().json(json!({ "success": true })))
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            ApiError::conflict("User with the given name already exists"),
        ),
        Err(e) => Err(ApiError::internal(e, "Failed to register user")),
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// The api key used to authenticate all future requests
    pub jwt: String,
    pub user: UserProfile,
}

/// Returns a JWT for the user after a successful login
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Successfully authenticated.", body = LoginResponse),
        (status = 401, description = "Name or password is incorrect.")
    ),
    tag = "user"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(name = %user.name)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    info!("Login request received");

    if user.name.trim().is_empty() || user.password.is_empty() {
        return Err(ApiError::bad_request("Name and password required"));
    }

    if !name_filter::might_exist(&user.name) {
        info!("Invalid credentials: name filter miss");
        return Err(ApiError::unauthorized("Name or Password is incorrect."));
    }

    debug!("Fetching user from database");
    let Some(db_user) = find_user_by_name(pool.get_ref(), user.name.trim()).await? else {
        info!("Invalid credentials: user not found");
        return Err(ApiError::unauthorized("Name or Password is incorrect."));
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, user_id = db_user.id, "Invalid credentials: password mismatch");
        return Err(ApiError::unauthorized("Password is incorrect."));
    }

    let role: Role = db_user.role.parse().map_err(|e| {
        error!(error = %e, user_id = db_user.id, role = %db_user.role, "Stored role is unknown");
        ApiError::Internal
    })?;

    let jwt = generate_token(db_user.id, role, db_user.active, &config.jwt_secret, config.jwt_ttl)
        .map_err(|e| ApiError::internal(e, "Failed to sign token"))?;

    info!(user_id = db_user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        jwt,
        user: UserProfile::from_user(db_user, None),
    }))
}

/// Returns the code necessary to reset the password
#[utoipa::path(
    post,
    path = "/api/user/requestResetPassword",
    request_body = ResetRequestDto,
    responses(
        (status = 200, description = "Reset code issued", body = Object, example = json!({
            "code": "3f2b8c1e9d4a4b6f8e0c7a5d2b1e9f3c"
        })),
        (status = 404, description = "Username not registered on platform")
    ),
    tag = "user"
)]
pub async fn request_reset_password(
    body: web::Json<ResetRequestDto>,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let not_registered = || ApiError::not_found("Username not registered on platform");

    if !name_filter::might_exist(&body.name) {
        return Err(not_registered());
    }
    let user = find_user_by_name(pool.get_ref(), body.name.trim())
        .await?
        .ok_or_else(not_registered)?;

    let code = Uuid::new_v4().to_simple().to_string();

    // replaces the previous code of this user, if any
    sqlx::query(
        r#"
        INSERT INTO reset_codes (user_id, code, valid)
        VALUES (?, ?, TRUE)
        ON DUPLICATE KEY UPDATE code = VALUES(code), valid = TRUE
        "#,
    )
    .bind(user.id)
    .bind(&code)
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store reset code"))?;

    info!(user_id = user.id, "Password reset code issued");

    Ok(HttpResponse::Ok().json(json!({ "code": code })))
}

/// Resets the password after verifying the unique code
#[utoipa::path(
    post,
    path = "/api/user/resetPassword",
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Successfully changed the password", body = Object, example = json!({
            "reset": true
        })),
        (status = 400, description = "Code has expired."),
        (status = 404, description = "Name not registered on platform")
    ),
    tag = "user"
)]
pub async fn reset_password(
    body: web::Json<ResetPasswordDto>,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    require_text(&body.password, "password")?;

    let user = find_user_by_name(pool.get_ref(), body.name.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("name not registered on platform"))?;

    let code = sqlx::query_as::<_, ResetCode>(
        "SELECT id, user_id, code, valid FROM reset_codes WHERE user_id = ?",
    )
    .bind(user.id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| ApiError::internal(e, "Failed to fetch reset code"))?
    .ok_or_else(|| ApiError::bad_request("User has not requested to reset his password"))?;

    if !code.accepts(&body.code) {
        return Err(ApiError::bad_request(
            "Link to reset the password is no longer valid.",
        ));
    }

    let hashed = hash_password(&body.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to open transaction"))?;

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&hashed)
        .bind(user.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update password"))?;

    // a code is good for one reset only
    sqlx::query("UPDATE reset_codes SET valid = FALSE WHERE id = ?")
        .bind(code.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to invalidate reset code"))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to commit password reset"))?;

    info!(user_id = user.id, "Password reset");

    Ok(HttpResponse::Ok().json(json!({ "reset": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn signup() -> SignupReq {
        SignupReq {
            name: "Ramesh".into(),
            role: Role::Staff,
            password: "pw".into(),
            mobile1: 9876543210,
            mobile2: None,
            dob: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            address: "12 Mill Road".into(),
            city: "Tiruppur".into(),
            state: "Tamil Nadu".into(),
            morning: None,
            evening: None,
            night: None,
        }
    }

    #[test]
    fn accepts_complete_signup() {
        assert!(validate_signup(&signup()).is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        let mut req = signup();
        req.city = "   ".into();
        assert_eq!(
            validate_signup(&req).unwrap_err().to_string(),
            "city must not be empty"
        );
    }

    #[test]
    fn rejects_out_of_range_mobiles() {
        let mut req = signup();
        req.mobile1 = 10_000_000_000;
        assert!(validate_signup(&req).is_err());

        let mut req = signup();
        req.mobile2 = Some(-5);
        assert!(validate_signup(&req).is_err());

        let mut req = signup();
        req.mobile2 = Some(9_999_999_999);
        assert!(validate_signup(&req).is_ok());
    }

    #[test]
    fn unknown_role_fails_to_deserialize() {
        let body = r#"{"name":"a","role":"GOD","password":"p","mobile1":1,"dob":"1990-01-01",
                      "address":"x","city":"y","state":"z"}"#;
        assert!(serde_json::from_str::<SignupReq>(body).is_err());
    }
}
