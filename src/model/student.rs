use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered student as returned by the API. The raw card data stays in
/// the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "full_name": "Ada Lovelace",
        "registered_date": "2025-10-23T14:02:11Z"
    })
)]
pub struct Student {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ada")]
    pub first_name: String,

    #[schema(example = "Lovelace")]
    pub last_name: String,

    #[schema(example = "Ada Lovelace")]
    pub full_name: String,

    #[schema(example = "2025-10-23T14:02:11Z", format = "date-time", value_type = String)]
    pub registered_date: DateTime<Utc>,
}

/// Name columns only, used when a handler just needs to identify a student.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentName {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}
