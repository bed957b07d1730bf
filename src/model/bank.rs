use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 4,
    "userId": 12,
    "accountNumber": 50100234567812u64,
    "bankName": "HDFC",
    "accountName": "Ramesh Kumar",
    "ifsc": "HDFC0001234",
    "city": "Tiruppur",
    "itr1": "ITR-2023",
    "itr2": null,
    "aadhar": "1234 5678 9012",
    "createdAt": "2024-03-11T05:00:00Z",
    "updatedAt": "2024-03-11T05:00:00Z"
}))]
pub struct BankAccount {
    pub id: u64,
    pub user_id: u64,
    pub account_number: u64,
    pub bank_name: String,
    pub account_name: String,
    pub ifsc: String,
    pub city: String,
    pub itr1: String,
    pub itr2: Option<String>,
    pub aadhar: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
