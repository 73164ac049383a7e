//! Database-backed handler tests. Each test gets a fresh MySQL database with
//! the crate's migrations applied.
//!
//! Run with `DATABASE_URL=mysql://... cargo test -- --ignored`.

use actix_web::{HttpResponse, ResponseError, body::to_bytes, http::StatusCode, web};
use classroom_attendance::{
    api::{
        attendance::{self, AttendanceQuery, MarkAttendance},
        overview,
        response::ApiError,
        student::{self, DeleteStudent, RegisterStudent},
    },
    calendar::ClassCalendar,
    config::Config,
};
use serde_json::Value;
use sqlx::MySqlPool;

async fn body_json(resp: HttpResponse) -> Value {
    let bytes = to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn status_of(result: &Result<HttpResponse, ApiError>) -> StatusCode {
    match result {
        Ok(resp) => resp.status(),
        Err(e) => e.status_code(),
    }
}

fn config_with(calendar: ClassCalendar) -> Config {
    Config {
        database_url: String::new(),
        server_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "test-secret".to_string(),
        rate_read_per_min: 10_000,
        rate_write_per_min: 10_000,
        rate_auth_per_min: 10_000,
        api_prefix: "/api".to_string(),
        auth_prefix: "/auth".to_string(),
        log_dir: "logs".to_string(),
        class_calendar: calendar,
    }
}

fn registration(first: &str, last: &str) -> web::Json<RegisterStudent> {
    web::Json(RegisterStudent {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        full_name: Some(format!("{first} {last}")),
        raw_card_data: Some(format!("%B6010^{}/{}^2612?", last.to_uppercase(), first.to_uppercase())),
    })
}

fn mark(first: &str, last: &str, date: &str, is_late: Option<bool>) -> web::Json<MarkAttendance> {
    web::Json(MarkAttendance {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        date: Some(date.to_string()),
        is_late,
    })
}

async fn register(pool: &MySqlPool, first: &str, last: &str) -> u64 {
    let resp = student::register_student(web::Data::new(pool.clone()), registration(first, last))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["student"]["id"].as_u64().unwrap()
}

async fn attendance_rows(pool: &MySqlPool, student_id: u64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE student_id = ?")
        .bind(student_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn second_registration_of_same_name_conflicts(pool: MySqlPool) {
    register(&pool, "Ada", "Lovelace").await;

    let again =
        student::register_student(web::Data::new(pool.clone()), registration("Ada", "Lovelace"))
            .await;
    assert_eq!(status_of(&again), StatusCode::CONFLICT);
    assert_eq!(
        again.unwrap_err(),
        ApiError::conflict("Student already registered")
    );

    // same last name, different student
    register(&pool, "Augusta", "Lovelace").await;
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn listing_is_sorted_and_counts_today(pool: MySqlPool) {
    register(&pool, "Grace", "Hopper").await;
    register(&pool, "Ada", "Lovelace").await;
    register(&pool, "Alan", "Hopper").await;

    let resp = student::list_students(web::Data::new(pool.clone()))
        .await
        .unwrap();
    let body = body_json(resp).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 3);
    assert_eq!(body["registeredToday"], 3);
    let names: Vec<&str> = body["students"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alan Hopper", "Grace Hopper", "Ada Lovelace"]);
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn marking_unknown_student_is_not_found(pool: MySqlPool) {
    let result = attendance::mark_present(
        web::Data::new(pool.clone()),
        mark("Nobody", "Here", "2025-10-23", None),
    )
    .await;
    assert_eq!(status_of(&result), StatusCode::NOT_FOUND);
    assert_eq!(result.unwrap_err().to_string(), "Student not registered");
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn marking_twice_updates_the_same_row(pool: MySqlPool) {
    let id = register(&pool, "Ada", "Lovelace").await;
    let data = web::Data::new(pool.clone());

    let first = attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-23", None))
        .await
        .unwrap();
    let first = body_json(first).await;
    assert_eq!(first["message"], "Ada Lovelace marked present");
    assert_eq!(first["updated"], false);
    assert_eq!(first["attendance"]["is_late"], false);

    let second = attendance::mark_present(
        data.clone(),
        mark("Ada", "Lovelace", "2025-10-23", Some(true)),
    )
    .await
    .unwrap();
    let second = body_json(second).await;
    assert_eq!(second["message"], "Ada Lovelace marked late");
    assert_eq!(second["updated"], true);
    assert_eq!(second["attendance"]["is_late"], true);
    assert_eq!(second["attendance"]["id"], first["attendance"]["id"]);

    assert_eq!(attendance_rows(&pool, id).await, 1);
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn simultaneous_marks_for_one_day_both_succeed(pool: MySqlPool) {
    let id = register(&pool, "Ada", "Lovelace").await;
    let data = web::Data::new(pool.clone());

    let (a, b) = futures::join!(
        attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-23", None)),
        attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-23", Some(true))),
    );

    assert_eq!(status_of(&a), StatusCode::OK);
    assert_eq!(status_of(&b), StatusCode::OK);
    assert_eq!(attendance_rows(&pool, id).await, 1);
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn marking_absent_removes_the_row(pool: MySqlPool) {
    let id = register(&pool, "Ada", "Lovelace").await;
    let data = web::Data::new(pool.clone());

    attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-23", None))
        .await
        .unwrap();

    let removed = attendance::mark_absent(data.clone(), mark("Ada", "Lovelace", "2025-10-23", None))
        .await
        .unwrap();
    let removed = body_json(removed).await;
    assert_eq!(removed["message"], "Ada Lovelace marked absent");
    assert_eq!(removed["deleted"], true);
    assert_eq!(attendance_rows(&pool, id).await, 0);

    let again = attendance::mark_absent(data, mark("Ada", "Lovelace", "2025-10-23", None))
        .await
        .unwrap();
    assert_eq!(body_json(again).await["deleted"], false);
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn deleting_a_student_cascades_to_attendance(pool: MySqlPool) {
    let id = register(&pool, "Ada", "Lovelace").await;
    let data = web::Data::new(pool.clone());

    for date in ["2025-10-23", "2025-10-28", "2025-10-30"] {
        attendance::mark_present(data.clone(), mark("Ada", "Lovelace", date, None))
            .await
            .unwrap();
    }
    assert_eq!(attendance_rows(&pool, id).await, 3);

    let resp = student::delete_student(data.clone(), web::Json(DeleteStudent { id: Some(id) }))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(attendance_rows(&pool, id).await, 0);

    let missing =
        student::delete_student(data, web::Json(DeleteStudent { id: Some(id) })).await;
    assert_eq!(status_of(&missing), StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn attendance_sheet_left_joins_every_student(pool: MySqlPool) {
    register(&pool, "Ada", "Lovelace").await;
    register(&pool, "Grace", "Hopper").await;
    let data = web::Data::new(pool.clone());

    attendance::mark_present(data.clone(), mark("Grace", "Hopper", "2025-10-23", Some(true)))
        .await
        .unwrap();

    let resp = attendance::get_attendance(
        data,
        web::Query(AttendanceQuery {
            date: Some("2025-10-23".to_string()),
        }),
    )
    .await
    .unwrap();
    let body = body_json(resp).await;

    assert_eq!(body["date"], "2025-10-23");
    assert_eq!(body["stats"]["total"], 2);
    assert_eq!(body["stats"]["present"], 1);
    assert_eq!(body["stats"]["absent"], 1);

    let sheet = body["attendance"].as_array().unwrap();
    assert_eq!(sheet[0]["full_name"], "Grace Hopper");
    assert_eq!(sheet[0]["present"], true);
    assert_eq!(sheet[0]["is_late"], true);
    assert_eq!(sheet[1]["present"], false);
    assert!(sheet[1]["timestamp"].is_null());
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn overview_classifies_against_the_calendar(pool: MySqlPool) {
    register(&pool, "Ada", "Lovelace").await;
    register(&pool, "Grace", "Hopper").await;
    let data = web::Data::new(pool.clone());

    attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-23", None))
        .await
        .unwrap();
    attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-28", Some(true)))
        .await
        .unwrap();
    // not a class day, ignored by the overview
    attendance::mark_present(data.clone(), mark("Ada", "Lovelace", "2025-10-24", None))
        .await
        .unwrap();

    let config = web::Data::new(config_with(ClassCalendar::default()));
    let resp = overview::attendance_overview(data, config).await.unwrap();
    let body = body_json(resp).await;

    assert_eq!(body["totalClasses"], 15);
    assert_eq!(body["classDates"][0], "2025-10-23");

    let students = body["students"].as_array().unwrap();
    let grace = &students[0];
    assert_eq!(grace["fullName"], "Grace Hopper");
    assert_eq!(grace["stats"]["absent"], 15);
    assert!(
        grace["attendance"]
            .as_array()
            .unwrap()
            .iter()
            .all(|c| c["status"] == "absent")
    );

    let ada = &students[1];
    assert_eq!(ada["attendance"][0]["status"], "present");
    assert_eq!(ada["attendance"][1]["status"], "late");
    assert_eq!(ada["attendance"][2]["status"], "absent");
    assert_eq!(ada["stats"]["present"], 1);
    assert_eq!(ada["stats"]["late"], 1);
    assert_eq!(ada["stats"]["absent"], 13);
    assert_eq!(ada["stats"]["total"], 15);
}

#[sqlx::test]
#[ignore = "needs a MySQL DATABASE_URL"]
async fn history_counts_per_date_newest_first(pool: MySqlPool) {
    register(&pool, "Ada", "Lovelace").await;
    register(&pool, "Grace", "Hopper").await;
    register(&pool, "Alan", "Turing").await;
    let data = web::Data::new(pool.clone());

    for (first, last, date) in [
        ("Ada", "Lovelace", "2025-10-23"),
        ("Grace", "Hopper", "2025-10-23"),
        ("Ada", "Lovelace", "2025-10-28"),
    ] {
        attendance::mark_present(data.clone(), mark(first, last, date, None))
            .await
            .unwrap();
    }

    let resp = attendance::attendance_history(data).await.unwrap();
    let body = body_json(resp).await;
    let history = body["history"].as_array().unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["attendance_date"], "2025-10-28");
    assert_eq!(history[0]["present_count"], 1);
    assert_eq!(history[1]["present_count"], 2);
    assert!(history.iter().all(|h| h["total_students"] == 3));
}
