//! End-to-end tests for the `stub-match` binary.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn stub_match(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stub-match"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("STUB_MATCH_CONFIG")
        .env_remove("STUB_MATCH_ARRAY_MATCHING")
        .output()
        .expect("failed to run stub-match")
}

const STUBS: &str = r#"[
    {
        "fullMethod": "/shop.Orders/GetOrder",
        "request": {"match": "partial", "content": {"id": 5}},
        "response": {"type": "success", "content": {"id": 5, "status": "SHIPPED"}}
    },
    {
        "fullMethod": "/shop.Orders/GetOrder",
        "request": {"match": "partial", "content": { "id" : 5 }},
        "response": {"type": "success", "content": {"duplicate": true}}
    }
]"#;

#[test]
fn test_compare_subset_and_strict() {
    let output = stub_match(&["compare", "-p", r#"{"id": 5}"#, "-t", r#"{"id": 5, "name": "x"}"#]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("match"));

    let output = stub_match(&[
        "compare",
        "--strict",
        "-p",
        r#"{"id": 5}"#,
        "-t",
        r#"{"id": 5, "name": "x"}"#,
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("expected 1 field(s), found 2"));
}

#[test]
fn test_compare_array_matching_flag() {
    let args = |policy: &'static str| {
        vec![
            "--array-matching",
            policy,
            "compare",
            "-p",
            r#"{"ids": [1, 1]}"#,
            "-t",
            r#"{"ids": [1, 2]}"#,
        ]
    };
    assert_eq!(stub_match(&args("reusable")).status.code(), Some(0));
    assert_eq!(stub_match(&args("exclusive")).status.code(), Some(1));
}

#[test]
fn test_compare_malformed_input_is_an_error() {
    let output = stub_match(&["compare", "-p", r#"{"id": "#, "-t", "{}"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not interpret pattern"));
}

#[test]
fn test_lookup() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(STUBS.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap();

    let output = stub_match(&[
        "lookup",
        "--stubs",
        path,
        "-m",
        "/shop.Orders/GetOrder",
        "-r",
        r#"{"id": 5, "verbose": true}"#,
    ]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SHIPPED"));
    assert!(!stdout.contains("duplicate"));

    let output = stub_match(&[
        "lookup",
        "--stubs",
        path,
        "-m",
        "/shop.Orders/GetOrder",
        "-r",
        r#"{"id": 6}"#,
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("no stub configured"));
}
