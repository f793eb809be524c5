use crate::core::domain::ExecutionResult;

/// Runs untrusted source code once.
///
/// Implementations never fail the call itself: every problem, including a
/// misconfigured host, is reported through [`ExecutionResult::failure`].
#[mockall::automock]
#[async_trait::async_trait]
pub trait Executor: std::fmt::Debug + Send + Sync {
    async fn execute(&self, language: &str, code: &str, stdin: &str) -> ExecutionResult;
}
