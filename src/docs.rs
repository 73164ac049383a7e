use crate::api::attendance::{
    DayAttendanceResponse, DayStats, HistoryEntry, HistoryResponse, MarkAttendance, MarkedAbsent,
    MarkedPresent, StudentDayAttendance,
};
use crate::api::overview::{
    AttendanceStatus, ClassAttendance, OverviewResponse, OverviewStats, StudentOverview,
};
use crate::api::response::ErrorBody;
use crate::api::student::{DeleteStudent, RegisterStudent, RegisteredStudent, StudentListResponse};
use crate::auth::handlers::{SessionStatus, SwipeResponse};
use crate::model::attendance::AttendanceRecord;
use crate::model::student::Student;
use crate::models::CardSwipeReq;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Classroom Attendance API",
        version = "1.0.0",
        description = r#"
## Classroom Attendance

Register students from their ID card swipe and keep per-date attendance for the term.

### 🔹 Key Features
- **Students**
  - Register, list and delete students
- **Attendance**
  - Mark present, late or absent for a class date
  - Daily sheet, per-date history and a full-term overview
- **Instructor lock**
  - Unlock the classroom pages with the instructor card, valid for 8 hours

### 📦 Response Format
Every response is a JSON envelope: `{"success": true, ...}` on success,
`{"success": false, "error": "..."}` on failure.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::student::register_student,
        crate::api::student::list_students,
        crate::api::student::delete_student,

        crate::api::attendance::mark_present,
        crate::api::attendance::mark_absent,
        crate::api::attendance::get_attendance,
        crate::api::attendance::attendance_history,

        crate::api::overview::attendance_overview,

        crate::auth::handlers::card_swipe,
        crate::auth::handlers::status,
        crate::auth::handlers::logout
    ),
    components(
        schemas(
            ErrorBody,
            Student,
            RegisterStudent,
            RegisteredStudent,
            StudentListResponse,
            DeleteStudent,
            AttendanceRecord,
            MarkAttendance,
            MarkedPresent,
            MarkedAbsent,
            StudentDayAttendance,
            DayStats,
            DayAttendanceResponse,
            HistoryEntry,
            HistoryResponse,
            AttendanceStatus,
            ClassAttendance,
            OverviewStats,
            StudentOverview,
            OverviewResponse,
            CardSwipeReq,
            SwipeResponse,
            SessionStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Students", description = "Student registration"),
        (name = "Attendance", description = "Attendance tracking and reports"),
        (name = "Instructor", description = "Card-swipe instructor lock"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
