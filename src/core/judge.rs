use crate::core::domain::{CaseReport, ExecutionResult, TestCase, Verdict};

/// A case passes only when the program exited cleanly and its trimmed stdout
/// equals the trimmed expected output byte for byte.
pub fn is_passed(result: &ExecutionResult, expected_output: &str) -> bool {
    result.success() && result.output().trim() == expected_output.trim()
}

/// Output shown to the user: stdout, followed by the error text if there is one.
pub fn displayed_output(result: &ExecutionResult) -> String {
    let actual = result.output().trim();
    let error = result.error();
    let error = error.trim();

    match (actual.is_empty(), error.is_empty()) {
        (_, true) => actual.to_string(),
        (true, false) => error.to_string(),
        (false, false) => format!("{actual}\nError: {error}"),
    }
}

pub fn report(index: usize, case: &TestCase, result: &ExecutionResult) -> CaseReport {
    CaseReport {
        index,
        passed: is_passed(result, &case.expected_output),
        stdin: case.stdin.clone(),
        expected: case.expected_output.trim().to_string(),
        actual: displayed_output(result),
        is_sample: case.is_sample,
        failure_kind: result.failure_kind(),
    }
}

pub fn verdict(passed: usize, total: usize) -> Verdict {
    match (passed, total) {
        (_, 0) => Verdict::NoTests,
        (p, t) if p == t => Verdict::Accepted,
        (0, _) => Verdict::Failed,
        _ => Verdict::Partial,
    }
}
