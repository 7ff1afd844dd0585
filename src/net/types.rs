//! Wire DTOs for the attendance REST API.
//!
//! DESIGN
//! ======
//! These types mirror the backend's JSON payloads field-for-field so the
//! persisted `user` record round-trips through storage unchanged.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

/// Closed set of user roles known to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username/password pair posted to `/auth/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The logged-in user as returned by `/auth/login` and persisted under `user`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Role deciding the landing page.
    pub role: Role,
    /// Date of the previous login, if any.
    #[serde(default)]
    pub last_login: Option<String>,
    /// Role-specific profile details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl User {
    /// Display name from the profile, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.profile {
            Some(Profile::Student(p)) => &p.name,
            Some(Profile::Teacher(p)) => &p.name,
            None => &self.username,
        }
    }

    /// Student profile, when the user has one.
    #[must_use]
    pub fn student_profile(&self) -> Option<&StudentProfile> {
        match &self.profile {
            Some(Profile::Student(p)) => Some(p),
            _ => None,
        }
    }
}

/// Profile attached to the user record, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Profile {
    Student(StudentProfile),
    Teacher(TeacherProfile),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub course: Option<CourseRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub teacher_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseRef {
    pub course_id: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
}

/// Successful `/auth/login` body.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// =============================================================================
// ATTENDANCE
// =============================================================================

/// Attendance status as stored by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Normal,
    Late,
    Early,
    #[serde(rename = "Late + Early")]
    LateAndEarly,
    Absent,
    Anomaly,
}

impl AttendanceStatus {
    pub const ALL: [Self; 6] = [
        Self::Normal,
        Self::Late,
        Self::Early,
        Self::LateAndEarly,
        Self::Absent,
        Self::Anomaly,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Late => "Late",
            Self::Early => "Early",
            Self::LateAndEarly => "Late + Early",
            Self::Absent => "Absent",
            Self::Anomaly => "Anomaly",
        }
    }

    /// Parse a status label, ignoring ASCII case.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course time window reported by `/attendance/today`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CourseSchedule {
    pub start: String,
    pub end: String,
}

/// Today's record for the student. All fields are absent before check-in.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TodayRecord {
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
}

/// `GET /attendance/today` body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TodayAttendance {
    pub system_time: String,
    pub course_schedule: CourseSchedule,
    #[serde(default)]
    pub attendance: TodayRecord,
}

/// `POST /attendance/check-in` body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CheckInReceipt {
    pub success: bool,
    pub time: String,
    pub status: AttendanceStatus,
}

/// `POST /attendance/check-out` body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CheckOutReceipt {
    pub success: bool,
    pub check_out_time: String,
    pub status: AttendanceStatus,
}

/// One row of a student's own attendance history.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub course_name: Option<String>,
}

/// One row of the admin report, which also names the student.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReportRecord {
    pub date: String,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    pub student_id: String,
    pub student_name: String,
    #[serde(default)]
    pub course_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub current_page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Number of pages needed to show `total` rows.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }
}

/// Paginated list envelope shared by search and report endpoints.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// `POST /admin/attendance/export` result payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExportLink {
    pub url: String,
}
