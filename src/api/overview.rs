use std::collections::HashMap;

use crate::{
    api::response::{ApiError, ErrorBody, success},
    calendar::{ClassCalendar, DATE_FORMAT},
    config::Config,
    model::student::StudentName,
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::TryStreamExt;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};
use strum_macros::{Display, EnumString};
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

/// The subset of an attendance row the overview needs.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceMark {
    pub student_id: u64,
    pub attendance_date: NaiveDate,
    pub is_late: bool,
    pub timestamp: DateTime<Utc>,
}

impl AttendanceMark {
    fn status(&self) -> AttendanceStatus {
        if self.is_late {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}

/// Attendance rows keyed by (student, date).
#[derive(Debug, Default)]
pub struct AttendanceIndex {
    marks: HashMap<(u64, NaiveDate), AttendanceMark>,
}

impl AttendanceIndex {
    pub fn insert(&mut self, mark: AttendanceMark) {
        self.marks.insert((mark.student_id, mark.attendance_date), mark);
    }

    pub fn get(&self, student_id: u64, date: NaiveDate) -> Option<&AttendanceMark> {
        self.marks.get(&(student_id, date))
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl FromIterator<AttendanceMark> for AttendanceIndex {
    fn from_iter<I: IntoIterator<Item = AttendanceMark>>(iter: I) -> Self {
        let mut index = AttendanceIndex::default();
        for mark in iter {
            index.insert(mark);
        }
        index
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassAttendance {
    /// 1-based position in the calendar
    #[schema(example = 1)]
    pub class_number: usize,
    #[schema(example = "2025-10-23")]
    pub date: String,
    pub status: AttendanceStatus,
    #[schema(example = "2025-10-23T14:05:00Z", format = "date-time", value_type = Option<String>)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq, ToSchema)]
pub struct OverviewStats {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub total: usize,
}

impl OverviewStats {
    fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
    pub attendance: Vec<ClassAttendance>,
    pub stats: OverviewStats,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub students: Vec<StudentOverview>,
    #[schema(example = json!(["2025-10-23", "2025-10-28"]))]
    pub class_dates: Vec<String>,
    #[schema(example = 15)]
    pub total_classes: usize,
}

/// Classify every student against every calendar date, keeping both the
/// student order and the calendar order.
pub fn build_overview(
    students: Vec<StudentName>,
    index: &AttendanceIndex,
    calendar: &ClassCalendar,
) -> Vec<StudentOverview> {
    students
        .into_iter()
        .map(|student| {
            let mut stats = OverviewStats {
                total: calendar.len(),
                ..Default::default()
            };

            let attendance = calendar
                .dates()
                .iter()
                .enumerate()
                .map(|(i, date)| {
                    let mark = index.get(student.id, *date);
                    let status = mark.map_or(AttendanceStatus::Absent, AttendanceMark::status);
                    stats.record(status);

                    ClassAttendance {
                        class_number: i + 1,
                        date: date.format(DATE_FORMAT).to_string(),
                        status,
                        timestamp: mark.map(|m| m.timestamp),
                    }
                })
                .collect();

            StudentOverview {
                id: student.id,
                first_name: student.first_name,
                last_name: student.last_name,
                full_name: student.full_name,
                attendance,
                stats,
            }
        })
        .collect()
}

/// Full-term attendance matrix
#[utoipa::path(
    get,
    path = "/api/get-attendance-overview",
    responses(
        (status = 200, description = "Per-student status for every class date", body = OverviewResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn attendance_overview(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let calendar = &config.class_calendar;

    let students = sqlx::query_as::<_, StudentName>(
        r#"
        SELECT id, first_name, last_name, full_name
        FROM students
        ORDER BY last_name, first_name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch students for overview");
        ApiError::internal()
    })?;

    let placeholders = vec!["?"; calendar.len()].join(", ");
    let sql = format!(
        "SELECT student_id, attendance_date, is_late, `timestamp` \
         FROM attendance \
         WHERE attendance_date IN ({placeholders}) \
         ORDER BY attendance_date"
    );
    debug!(sql = %sql, classes = calendar.len(), "Fetching attendance for overview");

    let mut query = sqlx::query_as::<_, AttendanceMark>(&sql);
    for date in calendar.dates() {
        query = query.bind(*date);
    }

    let mut index = AttendanceIndex::default();
    let mut rows = query.fetch(pool.get_ref());
    while let Some(mark) = rows.try_next().await.map_err(|e| {
        error!(error = %e, sql = %sql, "Failed to fetch attendance for overview");
        ApiError::internal()
    })? {
        index.insert(mark);
    }

    debug!(students = students.len(), marks = index.len(), "Building overview");

    Ok(success(OverviewResponse {
        students: build_overview(students, &index, calendar),
        class_dates: calendar.date_strings(),
        total_classes: calendar.len(),
    }))
}
