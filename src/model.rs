use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubModule {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
}

/// Sentinel sub-module name reserved for the department head slot.
/// Every department carries exactly one sub-module with this name.
pub const HOD_SENTINEL: &str = "HOD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub sub_modules: Vec<SubModule>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatPair {
    pub cat1: i64,
    pub cat2: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMarks {
    pub semester1: CatPair,
    pub semester2: CatPair,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGrade {
    pub subject: String,
    pub grade: String,
}

/// Detailed semester result as uploaded by the student. The GPA and CGPA
/// fields are free text from the results portal; `calc` parses the GPA
/// leniently and treats anything unparsable as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemesterResult {
    pub subjects: Vec<SubjectGrade>,
    pub gpa: String,
    pub cgpa: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub dob: String,
    /// Free-form department reference; matched case-insensitively against
    /// either a department id or its display name.
    pub department: String,
    pub year: String,
    pub section: String,
    pub grade: String,
    pub attendance_percentage: f64,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub home_address: String,
    #[serde(default)]
    pub student_phone: String,
    #[serde(default)]
    pub parent_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_marks: Option<BTreeMap<String, SubjectMarks>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_result: Option<SemesterResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub id: String,
    pub department_id: String,
    pub year: String,
    pub section: String,
    pub staff_name: String,
    pub email: String,
    pub password: String,
    pub subject: String,
    pub subject_code: String,
    pub semester: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HodAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub dept_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub dept_id: String,
    pub year: String,
    pub section: String,
}

pub const TIMETABLE_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
pub const TIMETABLE_PERIODS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub department_id: String,
    pub year: String,
    pub section: String,
    /// Weekday name -> exactly TIMETABLE_PERIODS subject slots ("" = free).
    pub schedule: BTreeMap<String, Vec<String>>,
}

impl TimetableEntry {
    /// One entry may exist per (department, year, section) triple, so the
    /// id is derived from the triple rather than generated.
    pub fn derive_id(department_id: &str, year: &str, section: &str) -> String {
        format!("tt-{}-{}-{}", department_id, year, section)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub student_id: String,
    pub subject_code: String,
    pub marks: i64,
    pub grade: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFlags {
    pub a1: bool,
    pub a2: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "OD")]
    OnDuty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveData {
    pub students: Vec<Student>,
    pub departments: Vec<Department>,
}

/// Frozen snapshot of one academic term. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcademicArchive {
    pub year: String,
    pub semester: String,
    pub archived_at: String,
    pub data: ArchiveData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub college_name: String,
    pub logo_left: String,
    pub logo_right: String,
    pub current_year: String,
    pub current_semester: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            college_name: String::new(),
            logo_left: String::new(),
            logo_right: String::new(),
            current_year: "2025-2026".to_string(),
            current_semester: "1st".to_string(),
        }
    }
}

/// Process-wide state. Every collection is owned here; components borrow.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub departments: Vec<Department>,
    pub students: Vec<Student>,
    pub staff_assignments: Vec<StaffAssignment>,
    pub hod_accounts: Vec<HodAccount>,
    pub advisor_accounts: Vec<AdvisorAccount>,
    pub timetables: Vec<TimetableEntry>,
    pub exam_results: Vec<ExamResult>,
    /// subject -> student id -> completion flags. Transactional; wiped on
    /// cycle advance.
    pub assignment_tracker: BTreeMap<String, BTreeMap<String, AssignmentFlags>>,
    /// date (YYYY-MM-DD) -> student id -> status. Staging records folded
    /// into attendance_percentage by attendance.publish.
    pub daily_attendance: BTreeMap<String, BTreeMap<String, AttendanceStatus>>,
    /// Most-recent-first.
    pub archives: Vec<AcademicArchive>,
    pub config: SystemConfig,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn find_student(&self, roll: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id.eq_ignore_ascii_case(roll))
    }

    pub fn find_student_mut(&mut self, roll: &str) -> Option<&mut Student> {
        self.students
            .iter_mut()
            .find(|s| s.id.eq_ignore_ascii_case(roll))
    }
}
