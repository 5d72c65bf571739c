//! Archive-then-reset transition between academic terms. The defining
//! invariant: student records and every per-student transactional tracker
//! are wiped, while hierarchy, accounts, timetables, and the archive
//! history survive.

use crate::model::{AcademicArchive, ArchiveData, Registry};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceSummary {
    pub archived_year: String,
    pub archived_semester: String,
    pub archived_students: i64,
    pub archived_at: String,
}

/// Rolls the institution to a new term as one atomic logical step. The
/// archive owns a deep, independent copy of the outgoing term's students
/// and hierarchy; later mutation of the live collections cannot reach it.
pub fn advance(registry: &mut Registry, new_year: &str, new_semester: &str) -> AdvanceSummary {
    let archived_at = Utc::now().to_rfc3339();
    let archive = AcademicArchive {
        year: registry.config.current_year.clone(),
        semester: registry.config.current_semester.clone(),
        archived_at: archived_at.clone(),
        data: ArchiveData {
            students: registry.students.clone(),
            departments: registry.departments.clone(),
        },
    };
    let summary = AdvanceSummary {
        archived_year: archive.year.clone(),
        archived_semester: archive.semester.clone(),
        archived_students: archive.data.students.len() as i64,
        archived_at,
    };

    // Most-recent-first.
    registry.archives.insert(0, archive);

    registry.config.current_year = new_year.to_string();
    registry.config.current_semester = new_semester.to_string();

    registry.students.clear();
    registry.exam_results.clear();
    registry.assignment_tracker.clear();
    registry.daily_attendance.clear();

    summary
}
