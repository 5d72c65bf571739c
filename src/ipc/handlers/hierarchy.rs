use crate::hierarchy;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_admin, require_confirm, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Department;
use serde_json::json;

/// Commands funnel through the copy-on-write functions: `None` means the
/// edit was a no-op (empty name or unknown target) and is reported as
/// unchanged rather than as an error, since the UI guard is assumed.
fn apply(state: &mut AppState, next: Option<Vec<Department>>) -> serde_json::Value {
    match next {
        Some(departments) => {
            state.registry.departments = departments;
            json!({ "changed": true })
        }
        None => json!({ "changed": false }),
    }
}

fn list(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let departments = serde_json::to_value(&state.registry.departments)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "departments": departments }))
}

fn add_department(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let name = get_required_str(params, "name")?;
    let next = hierarchy::add_department(&state.registry.departments, &name);
    Ok(apply(state, next))
}

fn add_year(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let dept_id = get_required_str(params, "deptId")?;
    let name = get_required_str(params, "name")?;
    let next = hierarchy::add_year(&state.registry.departments, &dept_id, &name);
    Ok(apply(state, next))
}

fn add_section(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let dept_id = get_required_str(params, "deptId")?;
    let sub_module_id = get_required_str(params, "subModuleId")?;
    let name = get_required_str(params, "name")?;
    let next = hierarchy::add_section(&state.registry.departments, &dept_id, &sub_module_id, &name);
    Ok(apply(state, next))
}

fn remove_department(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    require_confirm(params)?;
    let dept_id = get_required_str(params, "deptId")?;
    let next = hierarchy::remove_department(&state.registry.departments, &dept_id);
    Ok(apply(state, next))
}

fn remove_year(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    require_confirm(params)?;
    let dept_id = get_required_str(params, "deptId")?;
    let sub_module_id = get_required_str(params, "subModuleId")?;
    let next = hierarchy::remove_year(&state.registry.departments, &dept_id, &sub_module_id);
    Ok(apply(state, next))
}

fn remove_section(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    require_confirm(params)?;
    let dept_id = get_required_str(params, "deptId")?;
    let sub_module_id = get_required_str(params, "subModuleId")?;
    let name = get_required_str(params, "name")?;
    let next =
        hierarchy::remove_section(&state.registry.departments, &dept_id, &sub_module_id, &name);
    Ok(apply(state, next))
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
        "hierarchy.list" => Some(dispatch(state, req, list)),
        "hierarchy.addDepartment" => Some(dispatch(state, req, add_department)),
        "hierarchy.addYear" => Some(dispatch(state, req, add_year)),
        "hierarchy.addSection" => Some(dispatch(state, req, add_section)),
        "hierarchy.removeDepartment" => Some(dispatch(state, req, remove_department)),
        "hierarchy.removeYear" => Some(dispatch(state, req, remove_year)),
        "hierarchy.removeSection" => Some(dispatch(state, req, remove_section)),
        _ => None,
    }
}
