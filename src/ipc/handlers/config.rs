use crate::ipc::error::ok;
use crate::ipc::helpers::{bad_params, get_optional_str, require_admin, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn get(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(&state.registry.config)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))
}

/// Patches the institutional identity fields. The current year and
/// semester labels change only through cycle.advance.
fn update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let Some(obj) = params.as_object() else {
        return Err(bad_params("params must be an object"));
    };
    for key in obj.keys() {
        match key.as_str() {
            "collegeName" | "logoLeft" | "logoRight" => {}
            other => return Err(bad_params(format!("unknown config field: {}", other))),
        }
    }
    if let Some(name) = get_optional_str(params, "collegeName") {
        state.registry.config.college_name = name;
    }
    if let Some(logo) = get_optional_str(params, "logoLeft") {
        state.registry.config.logo_left = logo;
    }
    if let Some(logo) = get_optional_str(params, "logoRight") {
        state.registry.config.logo_right = logo;
    }
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
        "config.get" => Some(dispatch(state, req, get)),
        "config.update" => Some(dispatch(state, req, update)),
        _ => None,
    }
}
