use std::time::Duration;

pub const SUBMISSION_TX_ERR: &str = "Failed to send submission to the result channel";
pub const JUDGE_TX_ERR: &str = "Failed to send submission to the judging channel";
pub const STREAM_TX_ERR: &str = "Failed to send submission to the response stream";

/// Compilation is bounded independently of the configurable run timeout.
pub const COMPILE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(10);

/// Time between SIGTERM and SIGKILL for a timed out process group.
pub const KILL_GRACE_PERIOD: Duration = Duration::from_millis(100);

pub const DEFAULT_MAX_CODE_LENGTH: usize = 100_000;
pub const DEFAULT_ADDR: &str = "[::1]:50051";

/// Test cases of one submission executed at the same time.
pub const MAX_CONCURRENT_CASES: usize = 4;

/// Captured bytes per stream; anything beyond is read and dropped.
pub const MAX_OUTPUT_BYTES: u64 = 8 * 1024 * 1024;
