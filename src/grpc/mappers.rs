use crate::core::domain;
use crate::grpc::models::{self, Empty, submission};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },
    #[error("Code too long: {length} characters, at most {max} allowed")]
    CodeTooLong { length: usize, max: usize },
}

/// Rejects requests the executor should never see.
pub fn validate_source(
    language: &str,
    code: &str,
    max_code_length: usize,
) -> Result<(), ConversionError> {
    if language.trim().is_empty() {
        return Err(ConversionError::MissingField {
            field: "language".to_string(),
        });
    }
    if code.is_empty() {
        return Err(ConversionError::MissingField {
            field: "code".to_string(),
        });
    }

    let length = code.chars().count();
    if length > max_code_length {
        return Err(ConversionError::CodeTooLong {
            length,
            max: max_code_length,
        });
    }
    Ok(())
}

impl From<models::JudgeRequest> for domain::Submission {
    fn from(req: models::JudgeRequest) -> Self {
        let mode = req.mode().into();
        domain::Submission::new(
            req.language,
            req.code,
            mode,
            req.test_cases.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<models::TestCase> for domain::TestCase {
    fn from(case: models::TestCase) -> Self {
        Self {
            stdin: case.stdin,
            expected_output: case.expected_output,
            is_sample: case.is_sample,
        }
    }
}

impl From<models::RunMode> for domain::RunMode {
    fn from(mode: models::RunMode) -> Self {
        match mode {
            models::RunMode::Run => domain::RunMode::Run,
            models::RunMode::Submit => domain::RunMode::Submit,
        }
    }
}

impl From<Option<domain::FailureKind>> for models::FailureKind {
    fn from(kind: Option<domain::FailureKind>) -> Self {
        let Some(kind) = kind else {
            return models::FailureKind::None;
        };
        match kind {
            domain::FailureKind::UnsupportedLanguage => models::FailureKind::UnsupportedLanguage,
            domain::FailureKind::CompilationFailed => models::FailureKind::CompilationFailed,
            domain::FailureKind::CompilationTimeout => models::FailureKind::CompilationTimeout,
            domain::FailureKind::RuntimeError => models::FailureKind::RuntimeError,
            domain::FailureKind::TimeLimitExceeded => models::FailureKind::TimeLimitExceeded,
            domain::FailureKind::ToolchainMissing => models::FailureKind::ToolchainMissing,
            domain::FailureKind::Internal => models::FailureKind::Internal,
        }
    }
}

impl From<domain::ExecutionResult> for models::ExecuteResponse {
    fn from(result: domain::ExecutionResult) -> Self {
        Self {
            success: result.success(),
            error: result.error(),
            failure_kind: models::FailureKind::from(result.failure_kind()) as i32,
            output: result.stdout,
            execution_time_ms: 0,
        }
    }
}

impl From<domain::Verdict> for models::Verdict {
    fn from(verdict: domain::Verdict) -> Self {
        match verdict {
            domain::Verdict::NoTests => models::Verdict::NoTests,
            domain::Verdict::Accepted => models::Verdict::Accepted,
            domain::Verdict::Partial => models::Verdict::Partial,
            domain::Verdict::Failed => models::Verdict::Failed,
        }
    }
}

impl From<domain::CaseReport> for models::CaseReport {
    fn from(report: domain::CaseReport) -> Self {
        Self {
            index: report.index as u32,
            passed: report.passed,
            stdin: report.stdin,
            expected: report.expected,
            actual: report.actual,
            is_sample: report.is_sample,
            failure_kind: models::FailureKind::from(report.failure_kind) as i32,
        }
    }
}

impl From<domain::SubmissionState> for submission::State {
    fn from(state: domain::SubmissionState) -> Self {
        match state {
            domain::SubmissionState::Pending => submission::State::Pending(Empty {}),
            domain::SubmissionState::Judging { reports, total } => {
                submission::State::Judging(models::Judging {
                    reports: reports.into_iter().map(Into::into).collect(),
                    total: total as u32,
                })
            }
            domain::SubmissionState::Done {
                passed,
                total,
                verdict,
                reports,
                execution_time_ms,
            } => submission::State::Done(models::Done {
                passed: passed as u32,
                total: total as u32,
                verdict: models::Verdict::from(verdict) as i32,
                reports: reports.into_iter().map(Into::into).collect(),
                execution_time_ms,
            }),
        }
    }
}

impl From<domain::Submission> for models::Submission {
    fn from(submission: domain::Submission) -> Self {
        Self {
            id: submission.id.to_string(),
            created_at: Some(models::chrono_to_prost(submission.created_at)),
            updated_at: Some(models::chrono_to_prost(submission.updated_at)),
            language: submission.language,
            state: Some(submission.state.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source() {
        assert!(validate_source("c", "int main() {}", 100).is_ok());
        assert!(matches!(
            validate_source(" ", "int main() {}", 100),
            Err(ConversionError::MissingField { field }) if field == "language"
        ));
        assert!(matches!(
            validate_source("c", "", 100),
            Err(ConversionError::MissingField { field }) if field == "code"
        ));
        assert!(matches!(
            validate_source("c", &"x".repeat(101), 100),
            Err(ConversionError::CodeTooLong { length: 101, max: 100 })
        ));
        // Length is counted in characters, not bytes.
        assert!(validate_source("python", &"é".repeat(100), 100).is_ok());
    }

    #[test]
    fn test_judge_request_into_submission() {
        let req = models::JudgeRequest {
            language: "python".to_string(),
            code: "print(1)".to_string(),
            mode: models::RunMode::Run as i32,
            test_cases: vec![models::TestCase {
                stdin: "".to_string(),
                expected_output: "1".to_string(),
                is_sample: true,
            }],
        };

        let submission: domain::Submission = req.into();

        assert_eq!(submission.mode, domain::RunMode::Run);
        assert_eq!(submission.state, domain::SubmissionState::Pending);
        assert_eq!(submission.test_cases.len(), 1);
        assert_eq!(submission.test_cases[0].expected_output, "1");
    }

    #[test]
    fn test_execution_result_into_response() {
        let result = domain::ExecutionResult {
            stdout: "partial".to_string(),
            failure: Some(domain::Failure::RuntimeError {
                status: Some(1),
                stderr: "boom".to_string(),
            }),
        };

        let response: models::ExecuteResponse = result.into();

        assert!(!response.success);
        assert_eq!(response.output, "partial");
        assert_eq!(response.error, "boom");
        assert_eq!(response.failure_kind(), models::FailureKind::RuntimeError);
    }

    #[test]
    fn test_done_state_into_grpc() {
        let state = domain::SubmissionState::Done {
            passed: 1,
            total: 2,
            verdict: domain::Verdict::Partial,
            reports: Vec::new(),
            execution_time_ms: 42,
        };

        let submission::State::Done(done) = state.into() else {
            panic!("Expected Done state");
        };
        assert_eq!((done.passed, done.total), (1, 2));
        assert_eq!(done.verdict(), models::Verdict::Partial);
        assert_eq!(done.execution_time_ms, 42);
    }
}
