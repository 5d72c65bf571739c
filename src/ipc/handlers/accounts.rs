use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_optional_str, get_required_str, require_admin, require_confirm, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AdvisorAccount, HodAccount, Registry, StaffAssignment, HOD_SENTINEL};
use serde_json::json;
use uuid::Uuid;

fn dept_exists(registry: &Registry, dept_id: &str) -> bool {
    registry.departments.iter().any(|d| d.id == dept_id)
}

fn year_exists(registry: &Registry, dept_id: &str, year: &str) -> bool {
    registry
        .departments
        .iter()
        .find(|d| d.id == dept_id)
        .map(|d| {
            d.sub_modules
                .iter()
                .any(|sm| sm.name != HOD_SENTINEL && sm.name == year)
        })
        .unwrap_or(false)
}

fn section_exists(registry: &Registry, dept_id: &str, year: &str, section: &str) -> bool {
    registry
        .departments
        .iter()
        .find(|d| d.id == dept_id)
        .and_then(|d| d.sub_modules.iter().find(|sm| sm.name == year))
        .and_then(|sm| sm.sections.as_ref())
        .map(|secs| secs.iter().any(|s| s == section))
        .unwrap_or(false)
}

/// Account creation is the one place hierarchy references are validated;
/// student records tolerate dangling coordinates, accounts do not.
fn check_coordinate(
    registry: &Registry,
    dept_id: &str,
    year: Option<&str>,
    section: Option<&str>,
) -> Result<(), HandlerErr> {
    if !dept_exists(registry, dept_id) {
        return Err(HandlerErr::new("unknown_department", dept_id.to_string()));
    }
    if let Some(year) = year {
        if !year_exists(registry, dept_id, year) {
            return Err(HandlerErr::new("unknown_year", year.to_string()));
        }
        if let Some(section) = section {
            if !section_exists(registry, dept_id, year, section) {
                return Err(HandlerErr::new("unknown_section", section.to_string()));
            }
        }
    }
    Ok(())
}

fn account_id(prefix: &str, email: &str) -> String {
    if email.is_empty() {
        format!("{}-{}", prefix, Uuid::new_v4())
    } else {
        email.to_string()
    }
}

fn add_hod(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let name = get_required_str(params, "name")?;
    let email = get_required_str(params, "email")?;
    let password = get_required_str(params, "password")?;
    let dept_id = get_required_str(params, "deptId")?;
    check_coordinate(&state.registry, &dept_id, None, None)?;

    let id = account_id("hod", &email);
    state.registry.hod_accounts.push(HodAccount {
        id: id.clone(),
        name,
        email,
        password,
        dept_id,
    });
    Ok(json!({ "id": id }))
}

fn remove_hod(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    require_confirm(params)?;
    let email = get_required_str(params, "email")?;
    let before = state.registry.hod_accounts.len();
    state.registry.hod_accounts.retain(|h| h.email != email);
    Ok(json!({ "changed": state.registry.hod_accounts.len() != before }))
}

fn list_hods(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let hods = serde_json::to_value(&state.registry.hod_accounts)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "hods": hods }))
}

fn add_advisor(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let name = get_required_str(params, "name")?;
    let email = get_required_str(params, "email")?;
    let password = get_required_str(params, "password")?;
    let dept_id = get_required_str(params, "deptId")?;
    let year = get_required_str(params, "year")?;
    let section = get_required_str(params, "section")?;
    check_coordinate(&state.registry, &dept_id, Some(&year), Some(&section))?;

    let id = account_id("fa", &email);
    state.registry.advisor_accounts.push(AdvisorAccount {
        id: id.clone(),
        name,
        email,
        password,
        dept_id,
        year,
        section,
    });
    Ok(json!({ "id": id }))
}

fn remove_advisor(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    require_confirm(params)?;
    let email = get_required_str(params, "email")?;
    let before = state.registry.advisor_accounts.len();
    state.registry.advisor_accounts.retain(|fa| fa.email != email);
    Ok(json!({ "changed": state.registry.advisor_accounts.len() != before }))
}

fn list_advisors(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let advisors = serde_json::to_value(&state.registry.advisor_accounts)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "advisors": advisors }))
}

/// Department-head surface: one staff member teaching one subject to one
/// section. Gated by the role login the UI already performed, not by the
/// administrator flag.
fn assign_staff(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let dept_id = get_required_str(params, "deptId")?;
    let year = get_required_str(params, "year")?;
    let section = get_required_str(params, "section")?;
    let staff_name = get_required_str(params, "staffName")?;
    let email = get_required_str(params, "email")?;
    let password = get_required_str(params, "password")?;
    let subject = get_required_str(params, "subject")?;
    let subject_code = get_required_str(params, "subjectCode")?;
    let semester = get_required_str(params, "semester")?;
    check_coordinate(&state.registry, &dept_id, Some(&year), Some(&section))?;

    let id = format!("staff-{}", Uuid::new_v4());
    state.registry.staff_assignments.push(StaffAssignment {
        id: id.clone(),
        department_id: dept_id,
        year,
        section,
        staff_name,
        email,
        password,
        subject,
        subject_code,
        semester,
    });
    Ok(json!({ "id": id }))
}

fn revoke_staff(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_confirm(params)?;
    let id = get_required_str(params, "id")?;
    let before = state.registry.staff_assignments.len();
    state.registry.staff_assignments.retain(|sa| sa.id != id);
    Ok(json!({ "changed": state.registry.staff_assignments.len() != before }))
}

/// Open listing: the subject-selection step of the staff login needs the
/// assignments for a department/section before anyone is authenticated.
fn list_staff(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let dept_id = get_optional_str(params, "deptId");
    let year = get_optional_str(params, "year");
    let section = get_optional_str(params, "section");
    let hits: Vec<&StaffAssignment> = state
        .registry
        .staff_assignments
        .iter()
        .filter(|sa| {
            dept_id
                .as_ref()
                .map(|d| sa.department_id == *d)
                .unwrap_or(true)
                && year.as_ref().map(|y| sa.year == *y).unwrap_or(true)
                && section.as_ref().map(|s| sa.section == *s).unwrap_or(true)
        })
        .collect();
    let assignments = serde_json::to_value(&hits)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "assignments": assignments }))
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
        "accounts.addHod" => Some(dispatch(state, req, add_hod)),
        "accounts.removeHod" => Some(dispatch(state, req, remove_hod)),
        "accounts.listHods" => Some(dispatch(state, req, list_hods)),
        "accounts.addAdvisor" => Some(dispatch(state, req, add_advisor)),
        "accounts.removeAdvisor" => Some(dispatch(state, req, remove_advisor)),
        "accounts.listAdvisors" => Some(dispatch(state, req, list_advisors)),
        "accounts.assignStaff" => Some(dispatch(state, req, assign_staff)),
        "accounts.revokeStaff" => Some(dispatch(state, req, revoke_staff)),
        "accounts.listStaff" => Some(dispatch(state, req, list_staff)),
        _ => None,
    }
}
