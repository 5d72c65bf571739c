use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_campusd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn campusd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn enroll(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, roll: &str) {
    request_ok(
        stdin,
        reader,
        &format!("enroll-{}", roll),
        "students.enroll",
        json!({
            "id": roll,
            "name": roll,
            "dob": "2004-01-01",
            "deptId": "cse",
            "year": "I Year",
            "section": "Section A",
        }),
    );
}

fn submit_result(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    roll: &str,
    gpa: &str,
    first_grade: &str,
) {
    request_ok(
        stdin,
        reader,
        &format!("result-{}", roll),
        "students.submitResult",
        json!({
            "id": roll,
            "subjects": [
                { "subject": "Data Structures", "grade": first_grade },
                { "subject": "", "grade": "O" },
            ],
            "gpa": gpa,
            "cgpa": gpa,
        }),
    );
}

#[test]
fn classification_thresholds_and_denominators() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    for roll in ["R1", "R2", "R3", "R4"] {
        enroll(&mut stdin, &mut reader, roll);
    }
    // GPA exactly at the threshold passes; just below is an arrear; an
    // unparsable GPA reads as zero and lands in RA. R4 never submits.
    submit_result(&mut stdin, &mut reader, "R1", "5.0", "A");
    submit_result(&mut stdin, &mut reader, "R2", "4.99", "B+");
    submit_result(&mut stdin, &mut reader, "R3", "pending", "RA");

    let summary = request_ok(&mut stdin, &mut reader, "s", "analytics.summary", json!({}));
    assert_eq!(summary["totalStudents"], 4);
    assert_eq!(summary["resultEntered"], 3);
    assert_eq!(summary["pass"], 1);
    assert_eq!(summary["arrear"], 1);
    assert_eq!(summary["ra"], 1);
    // Percentages are each rounded against resultEntered (3) and are
    // allowed not to sum to 100.
    assert_eq!(summary["passPerc"], 33);
    assert_eq!(summary["arrearPerc"], 33);
    assert_eq!(summary["raPerc"], 33);
    // The attendance mean still divides by all four students.
    assert_eq!(summary["avgAttendance"], 100);

    let histogram = request_ok(
        &mut stdin,
        &mut reader,
        "h",
        "analytics.gradeHistogram",
        json!({}),
    );
    let buckets = histogram["histogram"].as_array().expect("histogram");
    let count = |letter: &str| {
        buckets
            .iter()
            .find(|b| b["name"] == letter)
            .map(|b| b["count"].as_i64().expect("count"))
            .expect("bucket")
    };
    // R1/R2/R3 report their first detailed subject grade; R4 falls back
    // to the coarse enrollment grade.
    assert_eq!(count("A"), 1);
    assert_eq!(count("B+"), 1);
    assert_eq!(count("RA"), 1);
    assert_eq!(count("O"), 1);

    let _ = child.kill();
}

#[test]
fn empty_population_reports_zero_percentages() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let summary = request_ok(&mut stdin, &mut reader, "1", "analytics.summary", json!({}));
    assert_eq!(summary["totalStudents"], 0);
    assert_eq!(summary["passPerc"], 0);
    assert_eq!(summary["avgAttendance"], 0);

    let _ = child.kill();
}

#[test]
fn department_performance_blends_results_and_attendance() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "auth.adminLogin",
        json!({ "identity": "admin@gmail.com", "secret": "12345" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "hierarchy.addDepartment",
        json!({ "name": "CSE" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "hierarchy.addDepartment",
        json!({ "name": "Mech" }),
    );

    enroll(&mut stdin, &mut reader, "R1");
    enroll(&mut stdin, &mut reader, "R2");
    submit_result(&mut stdin, &mut reader, "R1", "6", "A");
    submit_result(&mut stdin, &mut reader, "R2", "3", "C");

    let rows = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "analytics.departmentPerformance",
        json!({}),
    );
    let rows = rows["departments"].as_array().expect("rows");
    let cse = rows.iter().find(|r| r["name"] == "CSE").expect("cse row");
    // passRate 50, attendance 100 -> round(50*0.6 + 100*0.4) = 70.
    assert_eq!(cse["performance"], 70);
    assert_eq!(cse["attendance"], 100);

    // A department with no students reports zeros, not an error.
    let mech = rows.iter().find(|r| r["name"] == "Mech").expect("mech row");
    assert_eq!(mech["performance"], 0);
    assert_eq!(mech["attendance"], 0);

    let _ = child.kill();
}
