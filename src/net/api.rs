//! Typed helpers for the attendance REST endpoints.
//!
//! Every helper goes through a [`Transport`], so an expired credential is
//! surfaced as [`TransportError::Unauthenticated`] to whoever supplied it.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;

use super::transport::{ApiRequest, Transport, TransportError};
use super::types::{
    AttendanceRecord, AttendanceStatus, CheckInReceipt, CheckOutReceipt, ExportLink, Page, ReportRecord,
    TodayAttendance, User,
};

pub const LOGIN_PATH: &str = "/auth/login";
pub const TODAY_PATH: &str = "/attendance/today";
pub const CHECK_IN_PATH: &str = "/attendance/check-in";
pub const CHECK_OUT_PATH: &str = "/attendance/check-out";
pub const SEARCH_PATH: &str = "/attendance/search";
pub const REPORT_PATH: &str = "/admin/attendance";
pub const EXPORT_PATH: &str = "/admin/attendance/export";

pub const DEFAULT_SEARCH_PER_PAGE: u32 = 10;
pub const DEFAULT_REPORT_PER_PAGE: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("logged-in user has no student profile")]
    MissingProfile,

    #[error("invalid date `{0}`; expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("date range start {start} is after end {end}")]
    InvertedRange { start: String, end: String },
}

impl ApiError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Transport(e) => e.server_message().map_or_else(|| e.to_string(), str::to_owned),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_unauthenticated())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

// =============================================================================
// FILTERS
// =============================================================================

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ApiError::InvalidDate`] for anything else.
pub fn parse_date(raw: &str) -> Result<Date, ApiError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &format).map_err(|_| ApiError::InvalidDate(raw.to_owned()))
}

/// Inclusive date range. The backend ignores a range with only one end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Build a range from optional raw bounds. Returns `None` unless both are set.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is malformed or `start > end`.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, ApiError> {
        let start = start.map(parse_date).transpose()?;
        let end = end.map(parse_date).transpose()?;
        let (Some(start), Some(end)) = (start, end) else {
            if start.is_some() || end.is_some() {
                tracing::debug!("half-open date range ignored");
            }
            return Ok(None);
        };
        if start > end {
            return Err(ApiError::InvertedRange { start: start.to_string(), end: end.to_string() });
        }
        Ok(Some(Self { start, end }))
    }

    fn append_to(self, pairs: &mut Vec<(&'static str, String)>) {
        pairs.push(("start_date", self.start.to_string()));
        pairs.push(("end_date", self.end.to_string()));
    }
}

/// Filters for the student's own attendance history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub range: Option<DateRange>,
    pub status: Option<AttendanceStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchFilter {
    fn pairs(&self, student_id: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("student_id", student_id.to_owned()),
            ("page", self.page.unwrap_or(1).to_string()),
            ("per_page", self.per_page.unwrap_or(DEFAULT_SEARCH_PER_PAGE).to_string()),
        ];
        if let Some(range) = self.range {
            range.append_to(&mut pairs);
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        pairs
    }
}

/// Filters for the admin report and export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub range: Option<DateRange>,
    pub status: Option<AttendanceStatus>,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ReportFilter {
    fn criteria(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(range) = self.range {
            range.append_to(&mut pairs);
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if let Some(id) = self.student_id.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("student_id", id.trim().to_owned()));
        }
        if let Some(name) = self.student_name.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("student_name", name.trim().to_owned()));
        }
        pairs
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.unwrap_or(1).to_string()),
            ("per_page", self.per_page.unwrap_or(DEFAULT_REPORT_PER_PAGE).to_string()),
        ];
        pairs.extend(self.criteria());
        pairs
    }

    /// JSON body for the export endpoint (no paging).
    fn export_body(&self) -> Value {
        let map: Map<String, Value> = self
            .criteria()
            .into_iter()
            .map(|(k, v)| (k.to_owned(), Value::String(v)))
            .collect();
        Value::Object(map)
    }
}

fn with_pairs(mut request: ApiRequest, pairs: Vec<(&'static str, String)>) -> ApiRequest {
    for (key, value) in pairs {
        request = request.with_query(key, value);
    }
    request
}

// =============================================================================
// STUDENT ENDPOINTS
// =============================================================================

/// Student identity used by the attendance views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentIdentity {
    pub student_id: String,
    pub course_id: Option<String>,
}

impl StudentIdentity {
    /// Derive the identity from the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingProfile`] if the user has no student profile.
    pub fn from_user(user: &User) -> Result<Self, ApiError> {
        let profile = user.student_profile().ok_or(ApiError::MissingProfile)?;
        Ok(Self {
            student_id: profile.student_id.clone(),
            course_id: profile.course.as_ref().and_then(|c| c.course_id.clone()),
        })
    }
}

/// `GET /attendance/today`
///
/// # Errors
///
/// Returns an error if the request fails or the body has an unexpected shape.
pub async fn today(transport: &dyn Transport, student: &StudentIdentity) -> Result<TodayAttendance, ApiError> {
    let request = ApiRequest::get(TODAY_PATH).with_query("student_id", &student.student_id);
    decode(transport.send(request).await?)
}

/// `POST /attendance/check-in`
///
/// # Errors
///
/// Returns an error if the student has no course, the request fails, or the
/// server refuses the check-in.
pub async fn check_in(transport: &dyn Transport, student: &StudentIdentity) -> Result<CheckInReceipt, ApiError> {
    let course_id = student.course_id.as_deref().ok_or(ApiError::MissingProfile)?;
    let body = serde_json::json!({ "student_id": student.student_id, "course_id": course_id });
    decode(transport.send(ApiRequest::post(CHECK_IN_PATH, body)).await?)
}

/// `POST /attendance/check-out`
///
/// # Errors
///
/// Returns an error if the request fails or the server refuses the check-out.
pub async fn check_out(transport: &dyn Transport, student: &StudentIdentity) -> Result<CheckOutReceipt, ApiError> {
    let body = serde_json::json!({ "student_id": student.student_id });
    decode(transport.send(ApiRequest::post(CHECK_OUT_PATH, body)).await?)
}

/// `GET /attendance/search`
///
/// # Errors
///
/// Returns an error if the request fails or the body has an unexpected shape.
pub async fn search(
    transport: &dyn Transport,
    student: &StudentIdentity,
    filter: &SearchFilter,
) -> Result<Page<AttendanceRecord>, ApiError> {
    let request = with_pairs(ApiRequest::get(SEARCH_PATH), filter.pairs(&student.student_id));
    decode(transport.send(request).await?)
}

// =============================================================================
// ADMIN ENDPOINTS
// =============================================================================

/// `GET /admin/attendance`
///
/// # Errors
///
/// Returns an error if the request fails or the body has an unexpected shape.
pub async fn report(transport: &dyn Transport, filter: &ReportFilter) -> Result<Page<ReportRecord>, ApiError> {
    let request = with_pairs(ApiRequest::get(REPORT_PATH), filter.query_pairs());
    decode(transport.send(request).await?)
}

/// `POST /admin/attendance/export`: returns the spreadsheet download link.
///
/// # Errors
///
/// Returns an error if there is nothing to export, the request fails, or the
/// body has no `data.url`.
pub async fn export(transport: &dyn Transport, filter: &ReportFilter) -> Result<ExportLink, ApiError> {
    let mut body = transport.send(ApiRequest::post(EXPORT_PATH, filter.export_body())).await?;
    decode(body.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}
