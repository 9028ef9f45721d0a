use taskgraph::exec::lint::{count_findings, format_findings, parse_report};

const REPORT: &str = r#"[
  {"filePath": "/p/src/js/app.js", "messages": [
    {"ruleId": "semi", "severity": 2, "message": "Missing semicolon.", "line": 3, "column": 14},
    {"ruleId": "no-unused-vars", "severity": 1, "message": "'x' is defined but never used.", "line": 1, "column": 5}
  ], "errorCount": 1, "warningCount": 1},
  {"filePath": "/p/src/js/ok.js", "messages": [], "errorCount": 0, "warningCount": 0}
]"#;

#[test]
fn counts_errors_and_warnings() {
    let reports = parse_report(REPORT).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(count_findings(&reports), 2);
}

#[test]
fn empty_output_is_clean() {
    assert_eq!(count_findings(&parse_report("  \n").unwrap()), 0);
    assert_eq!(count_findings(&parse_report("[]").unwrap()), 0);
}

#[test]
fn formats_only_files_with_findings() {
    let reports = parse_report(REPORT).unwrap();
    let text = format_findings(&reports);

    assert!(text.contains("/p/src/js/app.js"));
    assert!(text.contains("3:14  error  Missing semicolon.  semi"));
    assert!(text.contains("1:5  warning"));
    assert!(!text.contains("ok.js"));
}

#[test]
fn garbage_is_rejected() {
    assert!(parse_report("eslint: command not found").is_err());
}
