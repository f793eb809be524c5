use std::{fmt, str::FromStr, time::Duration};

use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
}

impl Language {
    pub fn tag(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "python" => Ok(Language::Python),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Why an execution did not succeed.
///
/// The `Display` text is what callers show to users in place of stderr.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("{diagnostics}")]
    CompilationFailed { diagnostics: String },

    #[error("Compilation timed out after {}s", .limit.as_secs_f64())]
    CompilationTimeout { limit: Duration },

    #[error("{stderr}")]
    RuntimeError { status: Option<i32>, stderr: String },

    #[error("Execution timed out after {}s", .limit.as_secs_f64())]
    TimeLimitExceeded { limit: Duration },

    #[error("Toolchain not found: `{program}` is not installed or not on PATH")]
    ToolchainMissing { program: String },

    #[error("Execution error: {msg}")]
    Internal { msg: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    UnsupportedLanguage,
    CompilationFailed,
    CompilationTimeout,
    RuntimeError,
    TimeLimitExceeded,
    ToolchainMissing,
    Internal,
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::UnsupportedLanguage { .. } => FailureKind::UnsupportedLanguage,
            Failure::CompilationFailed { .. } => FailureKind::CompilationFailed,
            Failure::CompilationTimeout { .. } => FailureKind::CompilationTimeout,
            Failure::RuntimeError { .. } => FailureKind::RuntimeError,
            Failure::TimeLimitExceeded { .. } => FailureKind::TimeLimitExceeded,
            Failure::ToolchainMissing { .. } => FailureKind::ToolchainMissing,
            Failure::Internal { .. } => FailureKind::Internal,
        }
    }
}

/// Outcome of a single `execute` call.
///
/// `stdout` is kept even when the run failed, so callers can show partial output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub failure: Option<Failure>,
}

impl ExecutionResult {
    pub fn succeeded(stdout: String) -> Self {
        Self {
            stdout,
            failure: None,
        }
    }

    pub fn failed(failure: Failure) -> Self {
        Self {
            stdout: String::new(),
            failure: Some(failure),
        }
    }

    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn output(&self) -> &str {
        &self.stdout
    }

    pub fn error(&self) -> String {
        self.failure
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(Failure::kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    pub stdin: String,
    pub expected_output: String,
    pub is_sample: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Judge against sample test cases only.
    Run,
    #[default]
    Submit,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CaseReport {
    pub index: usize,
    pub passed: bool,
    pub stdin: String,
    pub expected: String,
    pub actual: String,
    pub is_sample: bool,
    pub failure_kind: Option<FailureKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    NoTests,
    Accepted,
    Partial,
    Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Pending,
    Judging {
        reports: Vec<CaseReport>,
        total: usize,
    },
    Done {
        passed: usize,
        total: usize,
        verdict: Verdict,
        reports: Vec<CaseReport>,
        execution_time_ms: u64,
    },
}

#[derive(Clone, Debug)]
pub struct Submission {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub language: String,
    pub code: String,
    pub mode: RunMode,
    pub test_cases: Vec<TestCase>,
    pub state: SubmissionState,
}

impl Submission {
    pub fn new(language: String, code: String, mode: RunMode, test_cases: Vec<TestCase>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            language,
            code,
            mode,
            test_cases,
            state: SubmissionState::default(),
        }
    }

    pub fn change_state(&self, new_state: SubmissionState) -> Self {
        Self {
            state: new_state,
            updated_at: chrono::Utc::now(),
            ..self.clone()
        }
    }

    /// Test cases judged in this submission's mode, with their original indices.
    pub fn selected_cases(&self) -> Vec<(usize, &TestCase)> {
        self.test_cases
            .iter()
            .enumerate()
            .filter(|(_, case)| self.mode == RunMode::Submit || case.is_sample)
            .collect()
    }
}
