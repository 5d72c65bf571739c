//! Role-scoped visibility over the student collection. Department
//! references are normalized at creation time, so they match
//! case-insensitively against either the department id or its display
//! name; year and section labels are free text propagated verbatim into
//! student records and match byte-exact.

use crate::model::{Department, Student};

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Administrator,
    Hod {
        dept_id: String,
    },
    Advisor {
        dept_id: String,
        year: String,
        section: String,
    },
    Staff {
        dept_id: String,
        year: String,
        section: String,
        subject: String,
    },
    Student {
        roll: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub department_id: String,
    pub year: String,
    pub section: String,
}

pub fn department_matches(
    student_department: &str,
    dept_id: &str,
    departments: &[Department],
) -> bool {
    if student_department.eq_ignore_ascii_case(dept_id) {
        return true;
    }
    departments
        .iter()
        .find(|d| d.id.eq_ignore_ascii_case(dept_id))
        .map(|d| student_department.eq_ignore_ascii_case(&d.name))
        .unwrap_or(false)
}

/// All students at a coordinate. Absence of a match is an empty set,
/// never an error.
pub fn students_at<'a>(
    students: &'a [Student],
    departments: &[Department],
    coordinate: &Coordinate,
) -> Vec<&'a Student> {
    students
        .iter()
        .filter(|s| {
            department_matches(&s.department, &coordinate.department_id, departments)
                && s.year == coordinate.year
                && s.section == coordinate.section
        })
        .collect()
}

/// All students in a department, any year or section.
pub fn department_students<'a>(
    students: &'a [Student],
    departments: &[Department],
    dept_id: &str,
) -> Vec<&'a Student> {
    students
        .iter()
        .filter(|s| department_matches(&s.department, dept_id, departments))
        .collect()
}

/// The subset of the student collection the given role may observe.
/// Administrator bypasses scoping entirely.
pub fn visible_students<'a>(
    role: &Role,
    students: &'a [Student],
    departments: &[Department],
) -> Vec<&'a Student> {
    match role {
        Role::Administrator => students.iter().collect(),
        Role::Hod { dept_id } => department_students(students, departments, dept_id),
        Role::Advisor {
            dept_id,
            year,
            section,
        }
        | Role::Staff {
            dept_id,
            year,
            section,
            ..
        } => students_at(
            students,
            departments,
            &Coordinate {
                department_id: dept_id.clone(),
                year: year.clone(),
                section: section.clone(),
            },
        ),
        Role::Student { roll } => students
            .iter()
            .filter(|s| s.id.eq_ignore_ascii_case(roll))
            .collect(),
    }
}
