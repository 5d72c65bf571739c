use crate::model::{Department, Student};
use crate::scope;
use serde::Serialize;

/// VB6-compatible 1-decimal rounding kept from the legacy mark engine:
/// `Int(10*x + 0.5) / 10`. Used for attendance adjustments.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn round_i64(x: f64) -> i64 {
    x.round() as i64
}

/// Domain policy constants. The defaults are institutional policy carried
/// over from the source deployment, not derivable from anything else.
#[derive(Debug, Clone, Copy)]
pub struct CalcConfig {
    /// GPA at or above which a semester result counts as a pass.
    pub pass_gpa: f64,
    /// Weight of the pass rate in the performance index.
    pub pass_weight: f64,
    /// Weight of the attendance average in the performance index.
    pub attendance_weight: f64,
    /// CAT score at or above which a subject component counts as a pass.
    pub cat_pass_mark: i64,
}

impl Default for CalcConfig {
    fn default() -> Self {
        CalcConfig {
            pass_gpa: 5.0,
            pass_weight: 0.6,
            attendance_weight: 0.4,
            cat_pass_mark: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Pass,
    Arrear,
    ReArrear,
}

/// A populated result with an unparsable or missing GPA reads as zero,
/// which lands in ReArrear.
pub fn classify_gpa(raw_gpa: &str, config: &CalcConfig) -> ResultClass {
    let gpa = raw_gpa.trim().parse::<f64>().unwrap_or(0.0);
    if gpa >= config.pass_gpa {
        ResultClass::Pass
    } else if gpa > 0.0 {
        ResultClass::Arrear
    } else {
        ResultClass::ReArrear
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub total_students: i64,
    pub result_entered: i64,
    pub pass: i64,
    pub arrear: i64,
    pub ra: i64,
    /// Each percentage is rounded independently against the result-entered
    /// count; the three need not sum to 100.
    pub pass_perc: i64,
    pub arrear_perc: i64,
    pub ra_perc: i64,
    /// Mean over the full scoped population, result entered or not.
    pub avg_attendance: i64,
}

pub fn result_summary(students: &[&Student], config: &CalcConfig) -> ResultSummary {
    let total = students.len();
    if total == 0 {
        return ResultSummary::default();
    }

    let mut pass = 0i64;
    let mut arrear = 0i64;
    let mut ra = 0i64;
    let mut result_entered = 0i64;
    let mut attendance_sum = 0.0f64;

    for s in students {
        attendance_sum += s.attendance_percentage;
        if let Some(res) = &s.semester_result {
            result_entered += 1;
            match classify_gpa(&res.gpa, config) {
                ResultClass::Pass => pass += 1,
                ResultClass::Arrear => arrear += 1,
                ResultClass::ReArrear => ra += 1,
            }
        }
    }

    let perc = |count: i64| {
        if result_entered > 0 {
            round_i64(count as f64 / result_entered as f64 * 100.0)
        } else {
            0
        }
    };

    ResultSummary {
        total_students: total as i64,
        result_entered,
        pass,
        arrear,
        ra,
        pass_perc: perc(pass),
        arrear_perc: perc(arrear),
        ra_perc: perc(ra),
        avg_attendance: round_i64(attendance_sum / total as f64),
    }
}

pub const GRADE_LETTERS: [&str; 8] = ["O", "A+", "A", "B+", "B", "C", "U", "RA"];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeCount {
    pub name: String,
    pub count: i64,
}

/// Frequency of each grade letter, in the fixed GRADE_LETTERS order. The
/// most recent grade is the first subject of the detailed result when one
/// exists, else the coarse grade field. Unrecognized letters are dropped.
pub fn grade_histogram(students: &[&Student]) -> Vec<GradeCount> {
    let mut counts = [0i64; GRADE_LETTERS.len()];
    for s in students {
        let latest = match &s.semester_result {
            Some(res) => res
                .subjects
                .first()
                .map(|row| row.grade.as_str())
                .unwrap_or(s.grade.as_str()),
            None => s.grade.as_str(),
        };
        if let Some(idx) = GRADE_LETTERS.iter().position(|g| *g == latest) {
            counts[idx] += 1;
        }
    }
    GRADE_LETTERS
        .iter()
        .zip(counts)
        .map(|(name, count)| GradeCount {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// Weighted performance index for one organizational unit: pass rate over
/// students with a populated result, blended with the attendance mean over
/// all of the unit's students. An empty unit scores 0.
pub fn performance_index(students: &[&Student], config: &CalcConfig) -> i64 {
    if students.is_empty() {
        return 0;
    }
    let with_results: Vec<&&Student> = students
        .iter()
        .filter(|s| s.semester_result.is_some())
        .collect();
    let pass_count = with_results
        .iter()
        .filter(|s| match &s.semester_result {
            Some(res) => classify_gpa(&res.gpa, config) == ResultClass::Pass,
            None => false,
        })
        .count();
    let pass_rate = if with_results.is_empty() {
        0.0
    } else {
        pass_count as f64 / with_results.len() as f64 * 100.0
    };
    let avg_attendance = students
        .iter()
        .map(|s| s.attendance_percentage)
        .sum::<f64>()
        / students.len() as f64;
    round_i64(pass_rate * config.pass_weight + avg_attendance * config.attendance_weight)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPerformance {
    pub name: String,
    pub performance: i64,
    pub attendance: i64,
}

pub fn department_performance(
    departments: &[Department],
    students: &[Student],
    config: &CalcConfig,
) -> Vec<DepartmentPerformance> {
    departments
        .iter()
        .map(|dept| {
            let dept_students = scope::department_students(students, departments, &dept.id);
            if dept_students.is_empty() {
                return DepartmentPerformance {
                    name: dept.name.clone(),
                    performance: 0,
                    attendance: 0,
                };
            }
            let avg_attendance = dept_students
                .iter()
                .map(|s| s.attendance_percentage)
                .sum::<f64>()
                / dept_students.len() as f64;
            DepartmentPerformance {
                name: dept.name.clone(),
                performance: performance_index(&dept_students, config),
                attendance: round_i64(avg_attendance),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatSummary {
    pub subject: String,
    pub total: i64,
    pub cat1_pass: i64,
    pub cat2_pass: i64,
    pub cat1_perc: i64,
    pub cat2_perc: i64,
}

/// First-semester CAT pass counts for one subject over a (pre-scoped)
/// class. Students with no mark row for the subject count as failing.
pub fn subject_cat_summary(
    students: &[&Student],
    subject: &str,
    config: &CalcConfig,
) -> CatSummary {
    let total = students.len() as i64;
    let mut cat1_pass = 0i64;
    let mut cat2_pass = 0i64;
    for s in students {
        let marks = s
            .subject_marks
            .as_ref()
            .and_then(|m| m.get(subject))
            .map(|m| m.semester1)
            .unwrap_or_default();
        if marks.cat1 >= config.cat_pass_mark {
            cat1_pass += 1;
        }
        if marks.cat2 >= config.cat_pass_mark {
            cat2_pass += 1;
        }
    }
    let perc = |count: i64| {
        if total > 0 {
            round_i64(count as f64 / total as f64 * 100.0)
        } else {
            0
        }
    };
    CatSummary {
        subject: subject.to_string(),
        total,
        cat1_pass,
        cat2_pass,
        cat1_perc: perc(cat1_pass),
        cat2_perc: perc(cat2_pass),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPassRate {
    pub subject: String,
    pub pass_rate: i64,
}

/// Advisor overview: per taught subject, the share of students whose
/// first-semester CAT 1 clears the pass mark, among students who have any
/// marks for the subject at all.
pub fn subject_pass_rates(
    students: &[&Student],
    subjects: &[String],
    config: &CalcConfig,
) -> Vec<SubjectPassRate> {
    subjects
        .iter()
        .map(|subject| {
            let with_marks: Vec<&&Student> = students
                .iter()
                .filter(|s| {
                    s.subject_marks
                        .as_ref()
                        .map(|m| m.contains_key(subject))
                        .unwrap_or(false)
                })
                .collect();
            let pass = with_marks
                .iter()
                .filter(|s| {
                    s.subject_marks
                        .as_ref()
                        .and_then(|m| m.get(subject))
                        .map(|m| m.semester1.cat1 >= config.cat_pass_mark)
                        .unwrap_or(false)
                })
                .count();
            let pass_rate = if with_marks.is_empty() {
                0
            } else {
                round_i64(pass as f64 / with_marks.len() as f64 * 100.0)
            };
            SubjectPassRate {
                subject: subject.clone(),
                pass_rate,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HodOverview {
    pub grade_data: Vec<GradeCount>,
    pub pass_subjects: i64,
    pub arrear_subjects: i64,
}

/// Department-head overview: per-subject-row tallies over students with a
/// non-empty detailed result. Grades U and RA count as arrear rows.
pub fn hod_overview(students: &[&Student]) -> HodOverview {
    let mut counts = [0i64; GRADE_LETTERS.len()];
    let mut pass_subjects = 0i64;
    let mut arrear_subjects = 0i64;
    for s in students {
        let Some(res) = &s.semester_result else {
            continue;
        };
        for row in &res.subjects {
            if let Some(idx) = GRADE_LETTERS.iter().position(|g| *g == row.grade) {
                counts[idx] += 1;
            }
            if row.grade == "RA" || row.grade == "U" {
                arrear_subjects += 1;
            } else {
                pass_subjects += 1;
            }
        }
    }
    HodOverview {
        grade_data: GRADE_LETTERS
            .iter()
            .zip(counts)
            .map(|(name, count)| GradeCount {
                name: name.to_string(),
                count,
            })
            .collect(),
        pass_subjects,
        arrear_subjects,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearStrength {
    pub name: String,
    pub students: i64,
}

/// Head-count per year sub-module of a department (HOD slot excluded).
pub fn year_strength(department: &Department, students: &[&Student]) -> Vec<YearStrength> {
    department
        .sub_modules
        .iter()
        .filter(|sm| sm.name != crate::model::HOD_SENTINEL)
        .map(|sm| YearStrength {
            name: sm.name.clone(),
            students: students.iter().filter(|s| s.year == sm.name).count() as i64,
        })
        .collect()
}
