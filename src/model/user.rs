use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub password: String,
    pub role: String,
    pub mobile1: i64,
    pub mobile2: i64,
    pub dob: NaiveDate,
    pub photo: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub active: bool,
    pub morning: bool,
    pub evening: bool,
    pub night: bool,
    pub salary: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
