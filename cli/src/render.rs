//! Plain-text rendering of API results.

use attendance::net::types::{
    AttendanceRecord, CheckInReceipt, CheckOutReceipt, Page, Pagination, Profile, ReportRecord, TodayAttendance,
    User,
};

const EMPTY_CELL: &str = "-";

fn cell(value: Option<&str>) -> String {
    value.unwrap_or(EMPTY_CELL).to_owned()
}

pub fn user(user: &User) -> String {
    let mut lines = vec![
        format!("Name:       {}", user.display_name()),
        format!("Username:   {}", user.username),
        format!("Role:       {}", user.role),
    ];
    match &user.profile {
        Some(Profile::Student(student)) => {
            lines.push(format!("Student ID: {}", student.student_id));
            if let Some(course) = &student.course {
                lines.push(format!("Course:     {}", cell(course.course_name.as_deref())));
            }
        }
        Some(Profile::Teacher(teacher)) => {
            lines.push(format!("Teacher ID: {}", teacher.teacher_id));
            let courses: Vec<&str> = teacher.courses.iter().filter_map(|c| c.course_name.as_deref()).collect();
            if !courses.is_empty() {
                lines.push(format!("Courses:    {}", courses.join(", ")));
            }
        }
        None => {}
    }
    if let Some(last_login) = &user.last_login {
        lines.push(format!("Last login: {last_login}"));
    }
    lines.join("\n")
}

pub fn today(today: &TodayAttendance) -> String {
    let record = &today.attendance;
    [
        format!("System time: {}", today.system_time),
        format!("Course:      {} - {}", today.course_schedule.start, today.course_schedule.end),
        format!("Check-in:    {}", cell(record.check_in.as_deref())),
        format!("Check-out:   {}", cell(record.check_out.as_deref())),
        format!("Status:      {}", record.status.map_or(EMPTY_CELL, |s| s.as_str())),
    ]
    .join("\n")
}

pub fn check_in(receipt: &CheckInReceipt) -> String {
    format!("Checked in at {} ({})", receipt.time, receipt.status)
}

pub fn check_out(receipt: &CheckOutReceipt) -> String {
    format!("Checked out at {} ({})", receipt.check_out_time, receipt.status)
}

pub fn records(page: &Page<AttendanceRecord>) -> String {
    let rows = page
        .data
        .iter()
        .map(|r| {
            vec![
                r.date.clone(),
                cell(r.course_name.as_deref()),
                cell(r.check_in.as_deref()),
                cell(r.check_out.as_deref()),
                r.status.to_string(),
            ]
        })
        .collect();
    with_footer(table(&["Date", "Course", "Check-in", "Check-out", "Status"], rows), &page.pagination)
}

pub fn report(page: &Page<ReportRecord>) -> String {
    let rows = page
        .data
        .iter()
        .map(|r| {
            vec![
                r.date.clone(),
                r.student_id.clone(),
                r.student_name.clone(),
                cell(r.course_name.as_deref()),
                cell(r.check_in.as_deref()),
                cell(r.check_out.as_deref()),
                r.status.to_string(),
            ]
        })
        .collect();
    with_footer(
        table(&["Date", "Student ID", "Name", "Course", "Check-in", "Check-out", "Status"], rows),
        &page.pagination,
    )
}

fn with_footer(body: String, pagination: &Pagination) -> String {
    format!(
        "{body}\nPage {} of {} ({} records)",
        pagination.current_page,
        pagination.page_count().max(1),
        pagination.total
    )
}

/// Left-aligned columns sized to the widest cell. Empty input renders a notice.
pub fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No records.".to_owned();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![line(headers.to_vec()), line(rule.iter().map(String::as_str).collect())];
    out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    out.join("\n")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
