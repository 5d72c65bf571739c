use crate::ipc::error::ok;
use crate::ipc::helpers::{bad_params, get_optional_str, get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::ExamResult;
use serde_json::json;
use std::collections::BTreeMap;

/// Subject staff entering a CAT component. Scores clamp into 0..=100 and
/// land in the first-semester pair; the second-semester pair is reserved
/// for the next term's entry round.
fn update_cat(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let subject = get_required_str(params, "subject")?;
    let field = get_required_str(params, "field")?;
    let value = params
        .get("value")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| bad_params("value must be an integer"))?;
    let value = value.clamp(0, 100);

    if field != "cat1" && field != "cat2" {
        return Err(bad_params("field must be cat1 or cat2"));
    }
    let Some(student) = state.registry.find_student_mut(&student_id) else {
        return Err(HandlerErr::new("not_found", "student not found"));
    };
    let marks = student
        .subject_marks
        .get_or_insert_with(BTreeMap::new)
        .entry(subject)
        .or_default();
    if field == "cat1" {
        marks.semester1.cat1 = value;
    } else {
        marks.semester1.cat2 = value;
    }
    Ok(json!({ "ok": true }))
}

fn set_assignment_flag(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let subject = get_required_str(params, "subject")?;
    let student_id = get_required_str(params, "studentId")?;
    let flag = get_required_str(params, "flag")?;
    let done = params
        .get("done")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| bad_params("done must be boolean"))?;

    if flag != "a1" && flag != "a2" {
        return Err(bad_params("flag must be a1 or a2"));
    }
    if state.registry.find_student(&student_id).is_none() {
        return Err(HandlerErr::new("not_found", "student not found"));
    }
    let entry = state
        .registry
        .assignment_tracker
        .entry(subject)
        .or_default()
        .entry(student_id)
        .or_default();
    if flag == "a1" {
        entry.a1 = done;
    } else {
        entry.a2 = done;
    }
    Ok(json!({ "ok": true }))
}

/// Per-subject completion flags for one student, as shown on the student
/// desk.
fn assignment_status(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let mut status = serde_json::Map::new();
    for (subject, per_student) in &state.registry.assignment_tracker {
        if let Some(flags) = per_student.get(&student_id) {
            status.insert(
                subject.clone(),
                serde_json::to_value(flags)
                    .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?,
            );
        }
    }
    Ok(json!({ "status": status }))
}

fn record_exam_result(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let subject_code = get_required_str(params, "subjectCode")?;
    let grade = get_required_str(params, "grade")?;
    let marks = params
        .get("marks")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| bad_params("marks must be an integer"))?;

    if state.registry.find_student(&student_id).is_none() {
        return Err(HandlerErr::new("not_found", "student not found"));
    }
    state.registry.exam_results.push(ExamResult {
        student_id,
        subject_code,
        marks,
        grade,
    });
    Ok(json!({ "ok": true }))
}

fn list_exam_results(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_optional_str(params, "studentId");
    let rows: Vec<&ExamResult> = state
        .registry
        .exam_results
        .iter()
        .filter(|r| {
            student_id
                .as_ref()
                .map(|s| r.student_id.eq_ignore_ascii_case(s))
                .unwrap_or(true)
        })
        .collect();
    let rows = serde_json::to_value(&rows)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "results": rows }))
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
        "marks.updateCat" => Some(dispatch(state, req, update_cat)),
        "marks.setAssignmentFlag" => Some(dispatch(state, req, set_assignment_flag)),
        "marks.assignmentStatus" => Some(dispatch(state, req, assignment_status)),
        "marks.recordExamResult" => Some(dispatch(state, req, record_exam_result)),
        "marks.listExamResults" => Some(dispatch(state, req, list_exam_results)),
        _ => None,
    }
}
