use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, scoped_students, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::scope;
use serde_json::json;

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))
}

fn summary(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let students = scoped_students(&state.registry.students, &state.registry.departments, params)?;
    to_value(&calc::result_summary(&students, &state.calc_config))
}

fn grade_histogram(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let students = scoped_students(&state.registry.students, &state.registry.departments, params)?;
    let histogram = to_value(&calc::grade_histogram(&students))?;
    Ok(json!({ "histogram": histogram }))
}

fn department_performance(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let rows = calc::department_performance(
        &state.registry.departments,
        &state.registry.students,
        &state.calc_config,
    );
    let rows = to_value(&rows)?;
    Ok(json!({ "departments": rows }))
}

fn subject_cat(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let subject = get_required_str(params, "subject")?;
    // The subject in the params puts this behind the Staff role.
    let students = scoped_students(&state.registry.students, &state.registry.departments, params)?;
    to_value(&calc::subject_cat_summary(&students, &subject, &state.calc_config))
}

/// Advisor overview: pass rates for every subject taught in the
/// department, computed over the advisor's class section.
fn subject_pass_rates(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let dept_id = get_required_str(params, "deptId")?;
    // The overview only makes sense for one class section.
    get_required_str(params, "year")?;
    get_required_str(params, "section")?;

    let mut subjects: Vec<String> = Vec::new();
    for sa in &state.registry.staff_assignments {
        if sa.department_id == dept_id && !subjects.contains(&sa.subject) {
            subjects.push(sa.subject.clone());
        }
    }
    let students = scoped_students(&state.registry.students, &state.registry.departments, params)?;
    let rates = calc::subject_pass_rates(&students, &subjects, &state.calc_config);
    let rates = to_value(&rates)?;
    Ok(json!({ "subjects": rates }))
}

fn hod_overview(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let dept_id = get_required_str(params, "deptId")?;
    let Some(department) = state
        .registry
        .departments
        .iter()
        .find(|d| d.id == dept_id)
    else {
        return Err(HandlerErr::new("unknown_department", dept_id));
    };
    let students = scope::department_students(
        &state.registry.students,
        &state.registry.departments,
        &dept_id,
    );
    let overview = to_value(&calc::hod_overview(&students))?;
    let strength = to_value(&calc::year_strength(department, &students))?;
    Ok(json!({ "overview": overview, "yearStrength": strength }))
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
        "analytics.summary" => Some(dispatch(state, req, summary)),
        "analytics.gradeHistogram" => Some(dispatch(state, req, grade_histogram)),
        "analytics.departmentPerformance" => Some(dispatch(state, req, department_performance)),
        "analytics.subjectCat" => Some(dispatch(state, req, subject_cat)),
        "analytics.subjectPassRates" => Some(dispatch(state, req, subject_pass_rates)),
        "analytics.hodOverview" => Some(dispatch(state, req, hod_overview)),
        _ => None,
    }
}
