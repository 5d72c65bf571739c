use crate::ipc::error::ok;
use crate::ipc::helpers::{
    bad_params, get_optional_str, get_required_str, require_confirm, scoped_students, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{SemesterResult, Student, SubjectGrade};
use serde_json::json;
use std::collections::BTreeMap;

const DOCUMENT_KINDS: [&str; 4] = ["aadhar", "community", "firstGraduate", "passbook"];

/// Enrollment by an advisor (or the admin surface). Credential fields stay
/// absent until the student's first login completes.
fn enroll(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let name = get_required_str(params, "name")?;
    let dob = get_required_str(params, "dob")?;
    let dept_id = get_required_str(params, "deptId")?;
    let year = get_required_str(params, "year")?;
    let section = get_required_str(params, "section")?;

    if state.registry.find_student(&id).is_some() {
        return Err(HandlerErr::new("duplicate_roll", "Roll No exists"));
    }

    state.registry.students.push(Student {
        id: id.clone(),
        name,
        dob,
        // Stored upper-cased, the way enrollment has always written it;
        // scoping matches it case-insensitively anyway.
        department: dept_id.to_uppercase(),
        year,
        section,
        grade: "O".to_string(),
        attendance_percentage: 100.0,
        blood_group: String::new(),
        home_address: String::new(),
        student_phone: String::new(),
        parent_phone: String::new(),
        email: None,
        password: None,
        documents: None,
        subject_marks: None,
        semester_result: None,
    });
    log::info!("event=student_enrolled roll={}", id);
    Ok(json!({ "id": id }))
}

fn remove(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_confirm(params)?;
    let id = get_required_str(params, "id")?;
    let before = state.registry.students.len();
    state
        .registry
        .students
        .retain(|s| !s.id.eq_ignore_ascii_case(&id));
    Ok(json!({ "changed": state.registry.students.len() != before }))
}

fn list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let mut hits = scoped_students(&state.registry.students, &state.registry.departments, params)?;
    hits.sort_by(|a, b| a.name.cmp(&b.name));
    let students = serde_json::to_value(&hits)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "students": students }))
}

fn update_profile(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let name = get_optional_str(params, "name");
    let email = get_optional_str(params, "email");
    let dob = get_optional_str(params, "dob");
    let home_address = get_optional_str(params, "homeAddress");
    let blood_group = get_optional_str(params, "bloodGroup");
    let student_phone = get_optional_str(params, "studentPhone");
    let parent_phone = get_optional_str(params, "parentPhone");

    let Some(student) = state.registry.find_student_mut(&id) else {
        return Err(HandlerErr::new("not_found", "student not found"));
    };
    if let Some(v) = name {
        student.name = v;
    }
    if let Some(v) = email {
        student.email = Some(v);
    }
    if let Some(v) = dob {
        student.dob = v;
    }
    if let Some(v) = home_address {
        student.home_address = v;
    }
    if let Some(v) = blood_group {
        student.blood_group = v;
    }
    if let Some(v) = student_phone {
        student.student_phone = v;
    }
    if let Some(v) = parent_phone {
        student.parent_phone = v;
    }
    Ok(json!({ "ok": true }))
}

fn set_document(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let kind = get_required_str(params, "kind")?;
    let data = get_required_str(params, "data")?;
    if !DOCUMENT_KINDS.contains(&kind.as_str()) {
        return Err(bad_params(format!(
            "kind must be one of: {}",
            DOCUMENT_KINDS.join(", ")
        )));
    }
    let Some(student) = state.registry.find_student_mut(&id) else {
        return Err(HandlerErr::new("not_found", "student not found"));
    };
    student
        .documents
        .get_or_insert_with(BTreeMap::new)
        .insert(kind, data);
    Ok(json!({ "ok": true }))
}

/// Student-entered detailed result. Rows with a blank subject are dropped,
/// matching how the entry form submits trailing empty rows.
fn submit_result(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "id")?;
    let gpa = get_required_str(params, "gpa")?;
    let cgpa = get_required_str(params, "cgpa")?;
    let subjects: Vec<SubjectGrade> = params
        .get("subjects")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| bad_params(format!("subjects: {}", e)))?
        .unwrap_or_default();

    let Some(student) = state.registry.find_student_mut(&id) else {
        return Err(HandlerErr::new("not_found", "student not found"));
    };
    student.semester_result = Some(SemesterResult {
        subjects: subjects
            .into_iter()
            .filter(|row| !row.subject.trim().is_empty())
            .collect(),
        gpa,
        cgpa,
    });
    Ok(json!({ "ok": true }))
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
        "students.enroll" => Some(dispatch(state, req, enroll)),
        "students.remove" => Some(dispatch(state, req, remove)),
        "students.list" => Some(dispatch(state, req, list)),
        "students.updateProfile" => Some(dispatch(state, req, update_profile)),
        "students.setDocument" => Some(dispatch(state, req, set_document)),
        "students.submitResult" => Some(dispatch(state, req, submit_result)),
        _ => None,
    }
}
