use super::error::err;
use super::types::AppState;
use crate::model::{Department, Student};
use crate::scope::{self, Role};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        HandlerErr {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn bad_params(message: impl Into<String>) -> HandlerErr {
    HandlerErr::new("bad_params", message)
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Destructive methods carry an explicit operator confirmation; declining
/// leaves all state unchanged.
pub fn require_confirm(params: &serde_json::Value) -> Result<(), HandlerErr> {
    if params.get("confirm").and_then(|v| v.as_bool()) == Some(true) {
        Ok(())
    } else {
        Err(HandlerErr::new(
            "confirmation_required",
            "set confirm=true to proceed",
        ))
    }
}

pub fn require_admin(state: &AppState) -> Result<(), HandlerErr> {
    if state.admin_authenticated {
        Ok(())
    } else {
        Err(HandlerErr::new(
            "admin_required",
            "administrator authentication required",
        ))
    }
}

/// Maps the scope params shared by student and analytics queries onto a
/// role: no scope is the administrator view, a roll number is the
/// student's own record, a department id alone is the head's view, and a
/// full coordinate is an advisor (or, with a subject, subject staff).
pub fn role_from_scope(params: &serde_json::Value) -> Result<Role, HandlerErr> {
    let roll = get_optional_str(params, "roll");
    let dept_id = get_optional_str(params, "deptId");
    let year = get_optional_str(params, "year");
    let section = get_optional_str(params, "section");
    let subject = get_optional_str(params, "subject");

    match (roll, dept_id, year, section) {
        (Some(roll), None, None, None) => Ok(Role::Student { roll }),
        (None, None, None, None) => Ok(Role::Administrator),
        (None, Some(dept_id), None, None) => Ok(Role::Hod { dept_id }),
        (None, Some(dept_id), Some(year), Some(section)) => Ok(match subject {
            Some(subject) => Role::Staff {
                dept_id,
                year,
                section,
                subject,
            },
            None => Role::Advisor {
                dept_id,
                year,
                section,
            },
        }),
        _ => Err(bad_params(
            "scope must be empty, roll, deptId alone, or deptId+year+section",
        )),
    }
}

pub fn scoped_students<'a>(
    students: &'a [Student],
    departments: &[Department],
    params: &serde_json::Value,
) -> Result<Vec<&'a Student>, HandlerErr> {
    let role = role_from_scope(params)?;
    Ok(scope::visible_students(&role, students, departments))
}
