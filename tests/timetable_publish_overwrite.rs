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

#[test]
fn publishing_replaces_the_entry_for_the_triple() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let coordinate = json!({
        "deptId": "cse",
        "year": "I Year",
        "section": "Section A",
    });

    // First publish: a short Monday row pads out to the fixed 8 periods.
    let mut params = coordinate.clone();
    params["schedule"] = json!({ "Monday": ["Maths", "Physics"] });
    let published = request_ok(&mut stdin, &mut reader, "1", "timetable.publish", params);
    let id = published["id"].as_str().expect("id").to_string();
    assert_eq!(id, "tt-cse-I Year-Section A");

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.get",
        coordinate.clone(),
    );
    let monday = fetched["schedule"]["Monday"].as_array().expect("monday");
    assert_eq!(monday.len(), 8);
    assert_eq!(monday[0], "Maths");
    assert_eq!(monday[1], "Physics");
    assert_eq!(monday[2], "");
    // Unsupplied days come back as empty 8-slot rows.
    assert_eq!(
        fetched["schedule"]["Friday"].as_array().expect("friday").len(),
        8
    );

    // Second publish for the same triple overwrites, never duplicates.
    let mut params = coordinate.clone();
    params["schedule"] = json!({ "Monday": ["Chemistry"] });
    let republished = request_ok(&mut stdin, &mut reader, "3", "timetable.publish", params);
    assert_eq!(republished["id"].as_str().expect("id"), id);

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "timetable.get",
        coordinate.clone(),
    );
    assert_eq!(fetched["schedule"]["Monday"][0], "Chemistry");
    assert_eq!(fetched["schedule"]["Monday"][1], "");

    // A different section is a different entry.
    let mut params = coordinate.clone();
    params["section"] = json!("Section B");
    params["schedule"] = json!({ "Tuesday": ["Lab"] });
    request_ok(&mut stdin, &mut reader, "5", "timetable.publish", params);

    let mut lookup = coordinate;
    lookup["section"] = json!("Section B");
    let fetched = request_ok(&mut stdin, &mut reader, "6", "timetable.get", lookup);
    assert_eq!(fetched["schedule"]["Tuesday"][0], "Lab");
    assert_eq!(fetched["schedule"]["Monday"][0], "");

    let _ = child.kill();
}

#[test]
fn missing_timetable_reads_as_an_empty_week() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.get",
        json!({ "deptId": "ece", "year": "I Year", "section": "Section A" }),
    );
    for day in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"] {
        let row = fetched["schedule"][day].as_array().expect("row");
        assert_eq!(row.len(), 8);
        assert!(row.iter().all(|slot| slot == ""));
    }

    let _ = child.kill();
}
