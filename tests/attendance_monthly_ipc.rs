use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_daemon() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_presenced");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn presenced");
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
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn create_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    name: &str,
) -> i64 {
    let resp = request(stdin, reader, "c", "students.create", json!({ "name": name }));
    assert_eq!(resp["ok"], json!(true), "create {}: {}", name, resp);
    resp["result"]["student"]["id"].as_i64().expect("student id")
}

#[test]
fn marking_same_date_twice_keeps_one_record() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();
    let id = create_student(&mut stdin, &mut reader, "Ahmed Benali");

    for (i, present) in [true, false].iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("m{}", i),
            "attendance.mark",
            json!({ "studentId": id, "date": "2025-06-02", "present": present }),
        );
        assert_eq!(resp["ok"], json!(true));
    }

    // The grid shows a single marked cell, now absent.
    let month = request(
        &mut stdin,
        &mut reader,
        "open",
        "attendance.monthOpen",
        json!({ "month": "2025-06" }),
    );
    let cells = month["result"]["rows"][0]["cells"].as_array().expect("cells");
    assert_eq!(cells.len(), 30);
    let marked: Vec<&serde_json::Value> = cells.iter().filter(|c| !c.is_null()).collect();
    assert_eq!(marked.len(), 1);
    assert_eq!(cells[1], json!(false)); // day 2

    // And the month counts exactly one day.
    let report = request(
        &mut stdin,
        &mut reader,
        "r",
        "reports.monthly",
        json!({ "month": "2025-06" }),
    );
    assert_eq!(report["result"]["students"][0]["totalDays"], json!(1));
    assert_eq!(report["result"]["students"][0]["absences"], json!(1));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn month_open_layout_and_flags() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();
    let _ = create_student(&mut stdin, &mut reader, "Fatima Zahra");

    // Leap-year February.
    let feb = request(
        &mut stdin,
        &mut reader,
        "feb",
        "attendance.monthOpen",
        json!({ "month": "2024-02" }),
    );
    assert_eq!(feb["result"]["daysInMonth"], json!(29));
    assert_eq!(feb["result"]["firstWeekday"], json!(4)); // jeudi

    // June 2025 starts on a Sunday; day 1 is a weekend, day 2 is not.
    let june = request(
        &mut stdin,
        &mut reader,
        "june",
        "attendance.monthOpen",
        json!({ "month": "2025-06" }),
    );
    assert_eq!(june["result"]["monthName"], json!("Juin"));
    assert_eq!(june["result"]["firstWeekday"], json!(0));
    let days = june["result"]["days"].as_array().expect("days");
    assert_eq!(days[0]["date"], json!("2025-06-01"));
    assert_eq!(days[0]["weekday"], json!("Dim"));
    assert_eq!(days[0]["weekend"], json!(true));
    assert_eq!(days[1]["weekend"], json!(false));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn marking_unknown_student_or_bad_date_is_an_error() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();
    let id = create_student(&mut stdin, &mut reader, "Ahmed");

    let missing = request(
        &mut stdin,
        &mut reader,
        "x1",
        "attendance.mark",
        json!({ "studentId": 999, "date": "2025-06-02", "present": true }),
    );
    assert_eq!(missing["ok"], json!(false));
    assert_eq!(missing["error"]["code"], json!("not_found"));

    let bad_date = request(
        &mut stdin,
        &mut reader,
        "x2",
        "attendance.mark",
        json!({ "studentId": id, "date": "02/06/2025", "present": true }),
    );
    assert_eq!(bad_date["ok"], json!(false));
    assert_eq!(bad_date["error"]["code"], json!("bad_params"));

    // The failures changed nothing.
    let month = request(
        &mut stdin,
        &mut reader,
        "x3",
        "attendance.monthOpen",
        json!({ "month": "2025-06" }),
    );
    let cells = month["result"]["rows"][0]["cells"].as_array().expect("cells");
    assert!(cells.iter().all(|c| c.is_null()));

    drop(stdin);
    let _ = child.wait();
}
