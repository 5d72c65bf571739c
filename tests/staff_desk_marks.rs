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

fn request(
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
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value["error"]["code"].as_str().expect("error code").to_string()
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
            "year": "II Year",
            "section": "Section A",
        }),
    );
}

fn fetch_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    roll: &str,
) -> serde_json::Value {
    let result = request_ok(stdin, reader, id, "students.list", json!({}));
    result["students"]
        .as_array()
        .expect("students")
        .iter()
        .find(|s| s["id"] == roll)
        .cloned()
        .expect("student present")
}

#[test]
fn cat_marks_clamp_and_feed_the_subject_summary() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    enroll(&mut stdin, &mut reader, "R1");
    enroll(&mut stdin, &mut reader, "R2");

    // Out-of-range entries clamp instead of failing.
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.updateCat",
        json!({ "studentId": "R1", "subject": "Data Structures", "field": "cat1", "value": 150 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "marks.updateCat",
        json!({ "studentId": "R1", "subject": "Data Structures", "field": "cat2", "value": -5 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "marks.updateCat",
        json!({ "studentId": "R2", "subject": "Data Structures", "field": "cat1", "value": 42 }),
    );

    let student = fetch_student(&mut stdin, &mut reader, "4", "R1");
    assert_eq!(student["subjectMarks"]["Data Structures"]["semester1"]["cat1"], 100);
    assert_eq!(student["subjectMarks"]["Data Structures"]["semester1"]["cat2"], 0);

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "analytics.subjectCat",
        json!({
            "deptId": "cse",
            "year": "II Year",
            "section": "Section A",
            "subject": "Data Structures",
        }),
    );
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["cat1Pass"], 1);
    assert_eq!(summary["cat2Pass"], 0);
    assert_eq!(summary["cat1Perc"], 50);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "marks.updateCat",
        json!({ "studentId": "R1", "subject": "Data Structures", "field": "cat3", "value": 10 }),
    );
    assert_eq!(code, "bad_params");

    let _ = child.kill();
}

#[test]
fn assignment_flags_track_per_subject_and_student() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    enroll(&mut stdin, &mut reader, "R1");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.setAssignmentFlag",
        json!({ "subject": "Data Structures", "studentId": "R1", "flag": "a1", "done": true }),
    );
    let status = request_ok(
        &mut stdin,
        &mut reader,
        "1b",
        "marks.assignmentStatus",
        json!({ "studentId": "R1" }),
    );
    assert_eq!(status["status"]["Data Structures"]["a1"], true);
    assert_eq!(status["status"]["Data Structures"]["a2"], false);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "marks.setAssignmentFlag",
        json!({ "subject": "Data Structures", "studentId": "GHOST", "flag": "a1", "done": true }),
    );
    assert_eq!(code, "not_found");

    let _ = child.kill();
}

#[test]
fn profile_and_document_vault_updates() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    enroll(&mut stdin, &mut reader, "R1");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.updateProfile",
        json!({
            "id": "R1",
            "bloodGroup": "O+",
            "homeAddress": "123, Anna Nagar, Chennai",
            "studentPhone": "9876543210",
        }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.setDocument",
        json!({ "id": "R1", "kind": "aadhar", "data": "blob:aadhar-ref" }),
    );
    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "students.setDocument",
        json!({ "id": "R1", "kind": "diploma", "data": "blob:x" }),
    );
    assert_eq!(code, "bad_params");

    let student = fetch_student(&mut stdin, &mut reader, "4", "R1");
    assert_eq!(student["bloodGroup"], "O+");
    assert_eq!(student["homeAddress"], "123, Anna Nagar, Chennai");
    assert_eq!(student["documents"]["aadhar"], "blob:aadhar-ref");
    // Untouched fields keep their enrollment defaults.
    assert_eq!(student["parentPhone"], "");

    // Duplicate enrollment on the same roll is refused.
    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "students.enroll",
        json!({
            "id": "r1",
            "name": "Shadow",
            "dob": "2004-01-01",
            "deptId": "cse",
            "year": "II Year",
            "section": "Section A",
        }),
    );
    assert_eq!(code, "duplicate_roll");

    let _ = child.kill();
}
