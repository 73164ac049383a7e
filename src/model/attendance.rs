use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 10)]
    pub id: u64,
    #[schema(example = 1)]
    pub student_id: u64,
    #[schema(example = "2025-10-23", format = "date", value_type = String)]
    pub attendance_date: NaiveDate,
    #[schema(example = false)]
    pub is_late: bool,
    #[schema(example = "2025-10-23T14:05:00Z", format = "date-time", value_type = String)]
    pub timestamp: DateTime<Utc>,
}
