use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupReq {
    #[schema(example = "Ramesh")]
    pub name: String,
    #[schema(example = "scanner", value_type = String)]
    pub role: Role,
    #[schema(example = "s3cret")]
    pub password: String,
    /// Mobile number of the worker
    #[schema(example = 9876543210i64)]
    pub mobile1: i64,
    /// Alternative number of the worker
    #[schema(example = 9123456780i64)]
    pub mobile2: Option<i64>,
    #[schema(example = "1990-05-17", format = "date", value_type = String)]
    pub dob: NaiveDate,
    pub address: String,
    pub city: String,
    pub state: String,
    pub morning: Option<bool>,
    pub evening: Option<bool>,
    pub night: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "Ramesh")]
    pub name: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetRequestDto {
    #[schema(example = "Ramesh")]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordDto {
    /// Unique code handed out by requestResetPassword
    pub code: String,
    /// New password
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: u64,
    pub role: Role,
    pub active: bool,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}
