use crate::{
    api::response::{ApiError, ErrorBody, required, success},
    calendar::parse_date,
    db::is_integrity_violation,
    model::{attendance::AttendanceRecord, student::StudentName},
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    #[schema(example = "Ada", value_type = String)]
    pub first_name: Option<String>,
    #[schema(example = "Lovelace", value_type = String)]
    pub last_name: Option<String>,
    #[schema(example = "2025-10-23", format = "date", value_type = String)]
    pub date: Option<String>,
    /// Only read when marking present
    #[schema(example = false)]
    pub is_late: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkedPresent {
    #[schema(example = "Ada Lovelace marked present")]
    pub message: String,
    pub attendance: AttendanceRecord,
    /// True when an existing row for the same date was overwritten
    pub updated: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MarkedAbsent {
    #[schema(example = "Ada Lovelace marked absent")]
    pub message: String,
    /// False when there was nothing to remove
    pub deleted: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    /// Class date, YYYY-MM-DD
    pub date: Option<String>,
}

#[derive(FromRow)]
struct DailyAttendanceRow {
    id: u64,
    first_name: String,
    last_name: String,
    full_name: String,
    attendance_id: Option<u64>,
    timestamp: Option<DateTime<Utc>>,
    is_late: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentDayAttendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
    #[schema(example = "2025-10-23T14:05:00Z", format = "date-time", value_type = Option<String>)]
    pub timestamp: Option<DateTime<Utc>>,
    #[schema(example = false)]
    pub is_late: Option<bool>,
    #[schema(example = true)]
    pub present: bool,
}

impl From<DailyAttendanceRow> for StudentDayAttendance {
    fn from(row: DailyAttendanceRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            full_name: row.full_name,
            timestamp: row.timestamp,
            is_late: row.is_late,
            present: row.attendance_id.is_some(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, ToSchema)]
pub struct DayStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
}

impl DayStats {
    pub fn tally(rows: &[StudentDayAttendance]) -> Self {
        let present = rows.iter().filter(|r| r.present).count();
        Self {
            total: rows.len(),
            present,
            absent: rows.len() - present,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DayAttendanceResponse {
    #[schema(example = "2025-10-23")]
    pub date: String,
    pub attendance: Vec<StudentDayAttendance>,
    pub stats: DayStats,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct HistoryEntry {
    #[schema(example = "2025-10-23", format = "date", value_type = String)]
    pub attendance_date: NaiveDate,
    #[schema(example = 21)]
    pub present_count: i64,
    #[schema(example = 24)]
    pub total_students: i64,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

/// Validated body shared by mark present and mark absent.
struct AttendanceTarget {
    student: StudentName,
    date: NaiveDate,
}

fn parse_required_date(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_date(raw).ok_or_else(|| ApiError::bad_request("Invalid date, expected YYYY-MM-DD"))
}

async fn resolve_target(
    pool: &MySqlPool,
    payload: &MarkAttendance,
) -> Result<AttendanceTarget, ApiError> {
    let (Some(first_name), Some(last_name), Some(date)) = (
        required(&payload.first_name),
        required(&payload.last_name),
        required(&payload.date),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    let date = parse_required_date(date)?;

    let student = sqlx::query_as::<_, StudentName>(
        r#"
        SELECT id, first_name, last_name, full_name
        FROM students
        WHERE first_name = ? AND last_name = ?
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, first_name, last_name, "Failed to look up student");
        ApiError::internal()
    })?
    .ok_or_else(|| ApiError::not_found("Student not registered"))?;

    Ok(AttendanceTarget { student, date })
}

/// Mark a student present (or late) for a date
#[utoipa::path(
    post,
    path = "/api/mark-attendance",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = MarkedPresent),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 404, description = "Student not registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn mark_present(
    pool: web::Data<MySqlPool>,
    payload: web::Json<MarkAttendance>,
) -> Result<HttpResponse, ApiError> {
    let AttendanceTarget { student, date } = resolve_target(pool.get_ref(), &payload).await?;
    let is_late = payload.is_late.unwrap_or(false);
    let student_id = student.id;

    let db_error = |e: sqlx::Error| {
        error!(error = %e, student_id, %date, "Failed to mark attendance");
        ApiError::internal()
    };

    // Must stay a non-locking read, concurrent marks for one day deadlock on gap locks
    let existing = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT id
        FROM attendance
        WHERE student_id = ? AND attendance_date = ?
        "#,
    )
    .bind(student_id)
    .bind(date)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(db_error)?;

    let mut tx = pool.begin().await.map_err(db_error)?;

    let upsert = sqlx::query(
        r#"
        INSERT INTO attendance (student_id, attendance_date, is_late)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE
            is_late = VALUES(is_late),
            `timestamp` = CURRENT_TIMESTAMP
        "#,
    )
    .bind(student_id)
    .bind(date)
    .bind(is_late)
    .execute(&mut *tx)
    .await;

    match upsert {
        Ok(_) => {}
        // The student was deleted after the lookup
        Err(e) if is_integrity_violation(&e) => {
            return Err(ApiError::not_found("Student not registered"));
        }
        Err(e) => return Err(db_error(e)),
    }

    let attendance = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, student_id, attendance_date, is_late, `timestamp`
        FROM attendance
        WHERE student_id = ? AND attendance_date = ?
        "#,
    )
    .bind(student_id)
    .bind(date)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error)?;

    tx.commit().await.map_err(db_error)?;

    let updated = existing.is_some();
    info!(student_id, %date, is_late, updated, "Attendance marked");

    let status = if is_late { "late" } else { "present" };
    Ok(success(MarkedPresent {
        message: format!("{} marked {}", student.full_name, status),
        attendance,
        updated,
    }))
}

/// Remove a student's attendance row for a date
#[utoipa::path(
    delete,
    path = "/api/mark-attendance",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance removed", body = MarkedAbsent),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 404, description = "Student not registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn mark_absent(
    pool: web::Data<MySqlPool>,
    payload: web::Json<MarkAttendance>,
) -> Result<HttpResponse, ApiError> {
    let AttendanceTarget { student, date } = resolve_target(pool.get_ref(), &payload).await?;
    let student_id = student.id;

    let result = sqlx::query(
        r#"
        DELETE FROM attendance
        WHERE student_id = ? AND attendance_date = ?
        "#,
    )
    .bind(student_id)
    .bind(date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, student_id, %date, "Failed to remove attendance");
        ApiError::internal()
    })?;

    let deleted = result.rows_affected() > 0;
    info!(student_id, %date, deleted, "Attendance removed");

    Ok(success(MarkedAbsent {
        message: format!("{} marked absent", student.full_name),
        deleted,
    }))
}

/// Attendance sheet for one date
#[utoipa::path(
    get,
    path = "/api/get-attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Every student with their status for the date", body = DayAttendanceResponse),
        (status = 400, description = "Date parameter is required", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let raw = required(&query.date)
        .ok_or_else(|| ApiError::bad_request("Date parameter is required"))?;
    let date = parse_required_date(raw)?;

    let rows = sqlx::query_as::<_, DailyAttendanceRow>(
        r#"
        SELECT
            s.id,
            s.first_name,
            s.last_name,
            s.full_name,
            a.id AS attendance_id,
            a.`timestamp`,
            a.is_late
        FROM students s
        LEFT JOIN attendance a
            ON s.id = a.student_id AND a.attendance_date = ?
        ORDER BY s.last_name, s.first_name
        "#,
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch attendance");
        ApiError::internal()
    })?;

    let attendance: Vec<StudentDayAttendance> = rows.into_iter().map(Into::into).collect();
    let stats = DayStats::tally(&attendance);
    debug!(%date, present = stats.present, absent = stats.absent, "Attendance sheet built");

    Ok(success(DayAttendanceResponse {
        date: raw.to_string(),
        attendance,
        stats,
    }))
}

/// Per-date attendance counts, newest first
#[utoipa::path(
    get,
    path = "/api/get-attendance-history",
    responses(
        (status = 200, description = "One entry per date with attendance", body = HistoryResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn attendance_history(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let history = sqlx::query_as::<_, HistoryEntry>(
        r#"
        SELECT
            a.attendance_date,
            COUNT(DISTINCT a.student_id) AS present_count,
            (SELECT COUNT(*) FROM students) AS total_students
        FROM attendance a
        GROUP BY a.attendance_date
        ORDER BY a.attendance_date DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch attendance history");
        ApiError::internal()
    })?;

    Ok(success(HistoryResponse { history }))
}
