use crate::calc::round_off_1_decimal;
use crate::ipc::error::ok;
use crate::ipc::helpers::{bad_params, get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use serde_json::json;

fn parse_status(raw: &str) -> Result<AttendanceStatus, HandlerErr> {
    match raw {
        "Present" => Ok(AttendanceStatus::Present),
        "Absent" => Ok(AttendanceStatus::Absent),
        "OD" => Ok(AttendanceStatus::OnDuty),
        _ => Err(bad_params("status must be Present, Absent or OD")),
    }
}

/// Stages one student's status for a date. Staging is idempotent per
/// (date, student); re-marking overwrites.
fn mark(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    let student_id = get_required_str(params, "studentId")?;
    let status = parse_status(&get_required_str(params, "status")?)?;

    if state.registry.find_student(&student_id).is_none() {
        return Err(HandlerErr::new("not_found", "student not found"));
    }
    state
        .registry
        .daily_attendance
        .entry(date)
        .or_default()
        .insert(student_id, status);
    Ok(json!({ "ok": true }))
}

fn day(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    let log = state
        .registry
        .daily_attendance
        .get(&date)
        .cloned()
        .unwrap_or_default();
    let log = serde_json::to_value(&log)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "log": log }))
}

/// Folds a day's staged statuses into the running percentages: presence
/// (including on-duty) adds 0.1, absence subtracts 0.5, clamped to 0..100
/// and rounded to one decimal. Students without a staged status for the
/// date are untouched.
fn publish(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    let Some(log) = state.registry.daily_attendance.get(&date).cloned() else {
        return Ok(json!({ "updated": 0 }));
    };
    let mut updated = 0i64;
    for student in &mut state.registry.students {
        let Some(status) = log.get(&student.id) else {
            continue;
        };
        let current = match status {
            AttendanceStatus::Present | AttendanceStatus::OnDuty => {
                (student.attendance_percentage + 0.1).min(100.0)
            }
            AttendanceStatus::Absent => (student.attendance_percentage - 0.5).max(0.0),
        };
        student.attendance_percentage = round_off_1_decimal(current);
        updated += 1;
    }
    log::info!("event=attendance_published date={} updated={}", date, updated);
    Ok(json!({ "updated": updated }))
}

fn dispatch(
    state: &mut AppState,
    req: &Request,
    op: fn(&mut AppState, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    match op(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(dispatch(state, req, mark)),
        "attendance.day" => Some(dispatch(state, req, day)),
        "attendance.publish" => Some(dispatch(state, req, publish)),
        _ => None,
    }
}
