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

fn enroll(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    roll: &str,
    dept: &str,
    year: &str,
    section: &str,
) {
    request_ok(
        stdin,
        reader,
        &format!("enroll-{}", roll),
        "students.enroll",
        json!({
            "id": roll,
            "name": roll,
            "dob": "2004-01-01",
            "deptId": dept,
            "year": year,
            "section": section,
        }),
    );
}

fn listed_rolls(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    params: serde_json::Value,
) -> Vec<String> {
    let result = request_ok(stdin, reader, id, "students.list", params);
    result["students"]
        .as_array()
        .expect("students array")
        .iter()
        .map(|s| s["id"].as_str().expect("roll").to_string())
        .collect()
}

#[test]
fn department_is_case_insensitive_year_and_section_are_not() {
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
        json!({ "name": "Computer Science" }),
    );

    // Enrollment upper-cases the department reference, so these records
    // carry "COMPUTER-SCIENCE" and "COMPUTER SCIENCE" respectively; the
    // second only matches through the display name.
    enroll(&mut stdin, &mut reader, "R1", "computer-science", "I Year", "Section A");
    enroll(&mut stdin, &mut reader, "R2", "Computer Science", "I Year", "Section A");
    // Wrong section case and wrong year case: never visible at the
    // canonical coordinate.
    enroll(&mut stdin, &mut reader, "R3", "computer-science", "I Year", "Section a");
    enroll(&mut stdin, &mut reader, "R4", "computer-science", "i year", "Section A");

    let rolls = listed_rolls(
        &mut stdin,
        &mut reader,
        "3",
        json!({ "deptId": "computer-science", "year": "I Year", "section": "Section A" }),
    );
    assert_eq!(rolls, vec!["R1", "R2"]);

    // The coordinate's own department spelling is also free.
    let rolls = listed_rolls(
        &mut stdin,
        &mut reader,
        "4",
        json!({ "deptId": "COMPUTER-SCIENCE", "year": "I Year", "section": "Section A" }),
    );
    assert_eq!(rolls, vec!["R1", "R2"]);

    // Unknown coordinates yield empty sets, not errors.
    let rolls = listed_rolls(
        &mut stdin,
        &mut reader,
        "5",
        json!({ "deptId": "mech", "year": "I Year", "section": "Section A" }),
    );
    assert!(rolls.is_empty());

    // Department-only scope (the head's view) spans years and sections.
    let rolls = listed_rolls(
        &mut stdin,
        &mut reader,
        "6",
        json!({ "deptId": "computer-science" }),
    );
    assert_eq!(rolls.len(), 4);

    // No scope at all is the administrator view.
    let rolls = listed_rolls(&mut stdin, &mut reader, "7", json!({}));
    assert_eq!(rolls.len(), 4);

    // A roll scope is the student's own record, matched case-insensitively.
    let rolls = listed_rolls(&mut stdin, &mut reader, "8", json!({ "roll": "r1" }));
    assert_eq!(rolls, vec!["R1"]);

    let _ = child.kill();
}
