use crate::cycle;
use crate::ipc::error::ok;
use crate::ipc::helpers::{bad_params, get_required_str, require_admin, require_confirm, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// The whole-institution term transition. Admin-only, confirmation-gated,
/// and atomic with respect to the request loop.
fn advance(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    require_confirm(params)?;
    let new_year = get_required_str(params, "newYear")?;
    let new_semester = get_required_str(params, "newSemester")?;
    if new_year.trim().is_empty() {
        return Err(bad_params("newYear must not be empty"));
    }
    if new_semester != "1st" && new_semester != "2nd" {
        return Err(bad_params("newSemester must be 1st or 2nd"));
    }

    let summary = cycle::advance(&mut state.registry, &new_year, &new_semester);
    log::info!(
        "event=cycle_advanced from={}/{} to={}/{} archived_students={}",
        summary.archived_year,
        summary.archived_semester,
        new_year,
        new_semester,
        summary.archived_students
    );
    serde_json::to_value(&summary).map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))
}

fn list_archives(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let rows: Vec<serde_json::Value> = state
        .registry
        .archives
        .iter()
        .map(|arc| {
            json!({
                "year": arc.year,
                "semester": arc.semester,
                "archivedAt": arc.archived_at,
                "studentCount": arc.data.students.len(),
            })
        })
        .collect();
    Ok(json!({ "archives": rows }))
}

fn get_archive(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let index = params
        .get("index")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| bad_params("missing index"))? as usize;
    let Some(archive) = state.registry.archives.get(index) else {
        return Err(HandlerErr::new("not_found", "no archive at index"));
    };
    serde_json::to_value(archive).map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))
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
        "cycle.advance" => Some(dispatch(state, req, advance)),
        "archives.list" => Some(dispatch(state, req, list_archives)),
        "archives.get" => Some(dispatch(state, req, get_archive)),
        _ => None,
    }
}
