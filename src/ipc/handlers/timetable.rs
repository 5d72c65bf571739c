use crate::ipc::error::ok;
use crate::ipc::helpers::{bad_params, get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{TimetableEntry, TIMETABLE_DAYS, TIMETABLE_PERIODS};
use serde_json::json;
use std::collections::BTreeMap;

fn normalize_row(raw: Option<&serde_json::Value>) -> Result<Vec<String>, HandlerErr> {
    let mut slots: Vec<String> = match raw {
        None => Vec::new(),
        Some(value) => {
            let arr = value
                .as_array()
                .ok_or_else(|| bad_params("schedule rows must be arrays"))?;
            arr.iter()
                .map(|slot| {
                    slot.as_str()
                        .map(|s| s.to_string())
                        .ok_or_else(|| bad_params("schedule slots must be strings"))
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    // Fixed period count per day: short rows pad out, long rows truncate.
    if slots.len() < TIMETABLE_PERIODS {
        slots.resize(TIMETABLE_PERIODS, String::new());
    } else {
        slots.truncate(TIMETABLE_PERIODS);
    }
    Ok(slots)
}

fn empty_week() -> BTreeMap<String, Vec<String>> {
    TIMETABLE_DAYS
        .iter()
        .map(|day| (day.to_string(), vec![String::new(); TIMETABLE_PERIODS]))
        .collect()
}

/// Publishing replaces whatever was previously published for the triple;
/// the derived id makes that a plain replace-by-id.
fn publish(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let dept_id = get_required_str(params, "deptId")?;
    let year = get_required_str(params, "year")?;
    let section = get_required_str(params, "section")?;
    let raw_schedule = params
        .get("schedule")
        .and_then(|v| v.as_object())
        .ok_or_else(|| bad_params("missing schedule object"))?;

    let mut schedule = BTreeMap::new();
    for day in TIMETABLE_DAYS {
        schedule.insert(day.to_string(), normalize_row(raw_schedule.get(day))?);
    }

    let id = TimetableEntry::derive_id(&dept_id, &year, &section);
    state.registry.timetables.retain(|t| t.id != id);
    state.registry.timetables.push(TimetableEntry {
        id: id.clone(),
        department_id: dept_id,
        year,
        section,
        schedule,
    });
    Ok(json!({ "id": id }))
}

fn get(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let dept_id = get_required_str(params, "deptId")?;
    let year = get_required_str(params, "year")?;
    let section = get_required_str(params, "section")?;
    let id = TimetableEntry::derive_id(&dept_id, &year, &section);

    let schedule = state
        .registry
        .timetables
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.schedule.clone())
        .unwrap_or_else(empty_week);
    let schedule = serde_json::to_value(&schedule)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "id": id, "schedule": schedule }))
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
        "timetable.publish" => Some(dispatch(state, req, publish)),
        "timetable.get" => Some(dispatch(state, req, get)),
        _ => None,
    }
}
