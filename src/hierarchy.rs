//! Command functions over the department tree. Each command takes the
//! current department slice and returns a fresh vector (copy-on-write at
//! the department/sub-module level); `None` means the command was a no-op
//! (empty input or unknown target) and the caller keeps its snapshot.

use crate::model::{Department, SubModule, HOD_SENTINEL};
use uuid::Uuid;

/// Department ids are the display name lowercased with whitespace runs
/// collapsed to single dashes.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub fn add_department(departments: &[Department], name: &str) -> Option<Vec<Department>> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let id = slugify(name);
    let mut next = departments.to_vec();
    next.push(Department {
        id: id.clone(),
        name: name.to_string(),
        sub_modules: vec![SubModule {
            id: format!("{}-hod", id),
            name: HOD_SENTINEL.to_string(),
            sections: None,
        }],
    });
    Some(next)
}

pub fn add_year(departments: &[Department], dept_id: &str, name: &str) -> Option<Vec<Department>> {
    let name = name.trim();
    if name.is_empty() || !departments.iter().any(|d| d.id == dept_id) {
        return None;
    }
    Some(
        departments
            .iter()
            .map(|d| {
                if d.id != dept_id {
                    return d.clone();
                }
                let mut sub_modules = d.sub_modules.clone();
                sub_modules.push(SubModule {
                    id: format!("{}-y-{}", dept_id, Uuid::new_v4()),
                    name: name.to_string(),
                    sections: Some(Vec::new()),
                });
                Department {
                    sub_modules,
                    ..d.clone()
                }
            })
            .collect(),
    )
}

/// Appends a section name to a year sub-module. Duplicates are not
/// detected; the caller is expected to avoid them.
pub fn add_section(
    departments: &[Department],
    dept_id: &str,
    sub_module_id: &str,
    name: &str,
) -> Option<Vec<Department>> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let target = departments
        .iter()
        .find(|d| d.id == dept_id)
        .and_then(|d| d.sub_modules.iter().find(|sm| sm.id == sub_module_id));
    target?;
    Some(
        departments
            .iter()
            .map(|d| {
                if d.id != dept_id {
                    return d.clone();
                }
                let sub_modules = d
                    .sub_modules
                    .iter()
                    .map(|sm| {
                        if sm.id != sub_module_id {
                            return sm.clone();
                        }
                        let mut sections = sm.sections.clone().unwrap_or_default();
                        sections.push(name.to_string());
                        SubModule {
                            sections: Some(sections),
                            ..sm.clone()
                        }
                    })
                    .collect();
                Department {
                    sub_modules,
                    ..d.clone()
                }
            })
            .collect(),
    )
}

/// Cascading: drops the department with all its sub-modules and sections.
/// Student and staff records keep their references and simply stop
/// matching during scoping.
pub fn remove_department(departments: &[Department], dept_id: &str) -> Option<Vec<Department>> {
    if !departments.iter().any(|d| d.id == dept_id) {
        return None;
    }
    Some(
        departments
            .iter()
            .filter(|d| d.id != dept_id)
            .cloned()
            .collect(),
    )
}

pub fn remove_year(
    departments: &[Department],
    dept_id: &str,
    sub_module_id: &str,
) -> Option<Vec<Department>> {
    let exists = departments
        .iter()
        .find(|d| d.id == dept_id)
        .map(|d| d.sub_modules.iter().any(|sm| sm.id == sub_module_id))
        .unwrap_or(false);
    if !exists {
        return None;
    }
    Some(
        departments
            .iter()
            .map(|d| {
                if d.id != dept_id {
                    return d.clone();
                }
                Department {
                    sub_modules: d
                        .sub_modules
                        .iter()
                        .filter(|sm| sm.id != sub_module_id)
                        .cloned()
                        .collect(),
                    ..d.clone()
                }
            })
            .collect(),
    )
}

pub fn remove_section(
    departments: &[Department],
    dept_id: &str,
    sub_module_id: &str,
    name: &str,
) -> Option<Vec<Department>> {
    let exists = departments
        .iter()
        .find(|d| d.id == dept_id)
        .and_then(|d| d.sub_modules.iter().find(|sm| sm.id == sub_module_id))
        .map(|sm| {
            sm.sections
                .as_ref()
                .map(|s| s.iter().any(|sec| sec == name))
                .unwrap_or(false)
        })
        .unwrap_or(false);
    if !exists {
        return None;
    }
    Some(
        departments
            .iter()
            .map(|d| {
                if d.id != dept_id {
                    return d.clone();
                }
                let sub_modules = d
                    .sub_modules
                    .iter()
                    .map(|sm| {
                        if sm.id != sub_module_id {
                            return sm.clone();
                        }
                        SubModule {
                            sections: sm.sections.as_ref().map(|secs| {
                                secs.iter().filter(|s| *s != name).cloned().collect()
                            }),
                            ..sm.clone()
                        }
                    })
                    .collect();
                Department {
                    sub_modules,
                    ..d.clone()
                }
            })
            .collect(),
    )
}
