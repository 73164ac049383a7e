use crate::{
    api::response::{ApiError, ErrorBody, created, required, success},
    db::is_integrity_violation,
    model::student::Student,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudent {
    #[schema(example = "Ada", value_type = String)]
    pub first_name: Option<String>,
    #[schema(example = "Lovelace", value_type = String)]
    pub last_name: Option<String>,
    #[schema(example = "Ada Lovelace", value_type = String)]
    pub full_name: Option<String>,
    /// Raw magnetic stripe data captured at registration
    #[schema(example = "%B6010^LOVELACE/ADA^2612?")]
    pub raw_card_data: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RegisteredStudent {
    pub student: Student,
    #[schema(example = "Student registered successfully")]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentListResponse {
    pub students: Vec<Student>,
    #[schema(example = 24)]
    pub total: usize,
    /// Students whose registration happened on the current calendar day
    #[schema(example = 3)]
    pub registered_today: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteStudent {
    #[schema(example = 1, value_type = u64)]
    pub id: Option<u64>,
}

async fn find_student_by_name(
    pool: &MySqlPool,
    first_name: &str,
    last_name: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        r#"
        SELECT id, first_name, last_name, full_name, registered_date
        FROM students
        WHERE first_name = ? AND last_name = ?
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(pool)
    .await
}

/// Register a student
#[utoipa::path(
    post,
    path = "/api/register-student",
    request_body = RegisterStudent,
    responses(
        (status = 201, description = "Student registered", body = RegisteredStudent),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 409, description = "Student already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Students"
)]
pub async fn register_student(
    pool: web::Data<MySqlPool>,
    payload: web::Json<RegisterStudent>,
) -> Result<HttpResponse, ApiError> {
    let (Some(first_name), Some(last_name), Some(full_name)) = (
        required(&payload.first_name),
        required(&payload.last_name),
        required(&payload.full_name),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    let raw_card_data = required(&payload.raw_card_data);

    let existing = find_student_by_name(pool.get_ref(), first_name, last_name)
        .await
        .map_err(|e| {
            error!(error = %e, first_name, last_name, "Failed to look up student");
            ApiError::internal()
        })?;

    if existing.is_some() {
        return Err(ApiError::conflict("Student already registered"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO students (first_name, last_name, full_name, raw_card_data)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(full_name)
    .bind(raw_card_data)
    .execute(pool.get_ref())
    .await;

    let inserted = match result {
        Ok(res) => res.last_insert_id(),
        // Lost a race with a concurrent registration of the same name
        Err(e) if is_integrity_violation(&e) => {
            return Err(ApiError::conflict("Student already registered"));
        }
        Err(e) => {
            error!(error = %e, first_name, last_name, "Failed to register student");
            return Err(ApiError::internal());
        }
    };

    let student = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, first_name, last_name, full_name, registered_date
        FROM students
        WHERE id = ?
        "#,
    )
    .bind(inserted)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, student_id = inserted, "Failed to read back registered student");
        ApiError::internal()
    })?;

    info!(student_id = student.id, full_name = %student.full_name, "Student registered");

    Ok(created(RegisteredStudent {
        student,
        message: "Student registered successfully".to_string(),
    }))
}

/// List registered students
#[utoipa::path(
    get,
    path = "/api/get-students",
    responses(
        (status = 200, description = "All students ordered by last, first name", body = StudentListResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Students"
)]
pub async fn list_students(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let students = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, first_name, last_name, full_name, registered_date
        FROM students
        ORDER BY last_name, first_name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch students");
        ApiError::internal()
    })?;

    let registered_today = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM students
        WHERE DATE(registered_date) = CURRENT_DATE
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to count today's registrations");
        ApiError::internal()
    })?;

    Ok(success(StudentListResponse {
        total: students.len(),
        students,
        registered_today,
    }))
}

/// Delete a student together with their attendance rows
#[utoipa::path(
    delete,
    path = "/api/delete-student",
    request_body = DeleteStudent,
    responses(
        (status = 200, description = "Student deleted", body = Object, example = json!({
            "success": true,
            "message": "Student deleted successfully"
        })),
        (status = 400, description = "Student ID is required", body = ErrorBody),
        (status = 404, description = "Student not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Students"
)]
pub async fn delete_student(
    pool: web::Data<MySqlPool>,
    payload: web::Json<DeleteStudent>,
) -> Result<HttpResponse, ApiError> {
    let student_id = payload
        .id
        .filter(|id| *id != 0)
        .ok_or_else(|| ApiError::bad_request("Student ID is required"))?;

    // attendance rows go with it through ON DELETE CASCADE
    let result = sqlx::query(r#"DELETE FROM students WHERE id = ?"#)
        .bind(student_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, student_id, "Failed to delete student");
            ApiError::internal()
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Student not found"));
    }

    info!(student_id, "Student deleted");

    Ok(success(json!({
        "message": "Student deleted successfully"
    })))
}
