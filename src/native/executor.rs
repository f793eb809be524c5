use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;

use crate::{
    config::ExecutorConfig,
    constants::COMPILE_TIMEOUT,
    core::{
        domain::{ExecutionResult, Failure, Language, UnknownLanguage},
        traits::executor::Executor,
    },
    native::{
        process::{self, ProcessError},
        toolchain::{ToolchainAdapter, adapter_for},
        workspace::Workspace,
    },
};

/// Executes submissions directly on the host, one fresh workspace per call.
///
/// Isolation is limited to the workspace directory and the time limits: the
/// program can still touch the rest of the filesystem, the network and as
/// much memory as the host grants it.
#[derive(Clone, Debug)]
pub struct NativeExecutor {
    config: Arc<ExecutorConfig>,
}

impl NativeExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        NativeExecutor {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    async fn execute_with(
        &self,
        adapter: &dyn ToolchainAdapter,
        code: &str,
        stdin: &str,
    ) -> Result<ExecutionResult, Failure> {
        let workspace = Workspace::create(&self.config.base_dir)
            .await
            .map_err(|e| Failure::Internal {
                msg: format!("Failed to create workspace: {e}"),
            })?;

        let source_path = workspace
            .write_file(&adapter.source_file_name(code), code)
            .await
            .map_err(|e| Failure::Internal {
                msg: format!("Failed to write source file: {e}"),
            })?;

        if let Some(compile) = adapter.compile_command(&workspace, &source_path) {
            let output = process::run(&compile, workspace.path(), "", COMPILE_TIMEOUT)
                .await
                .map_err(|e| match e {
                    ProcessError::TimedOut { .. } => Failure::CompilationTimeout {
                        limit: COMPILE_TIMEOUT,
                    },
                    e => toolchain_failure(e),
                })?;

            if !output.status.success() {
                return Err(Failure::CompilationFailed {
                    diagnostics: output.stderr,
                });
            }
            tracing::debug!(elapsed = ?output.elapsed, "Compilation finished");
        }

        let run = adapter.run_command(&workspace, code);
        let output = process::run(&run, workspace.path(), stdin, self.config.run_timeout)
            .await
            .map_err(|e| match e {
                ProcessError::TimedOut { .. } => Failure::TimeLimitExceeded {
                    limit: self.config.run_timeout,
                },
                // Only a build artifact lives in the workspace; anything else is a toolchain.
                ProcessError::NotFound { program }
                    if run.program.starts_with(workspace.path()) =>
                {
                    Failure::Internal {
                        msg: format!("Compiled program `{program}` is missing"),
                    }
                }
                e => toolchain_failure(e),
            })?;
        tracing::debug!(elapsed = ?output.elapsed, status = ?output.status, "Run finished");

        if output.status.success() {
            return Ok(ExecutionResult::succeeded(output.stdout));
        }

        Ok(ExecutionResult {
            stdout: output.stdout,
            failure: Some(Failure::RuntimeError {
                status: output.status.code(),
                stderr: output.stderr,
            }),
        })
    }
}

#[async_trait::async_trait]
impl Executor for NativeExecutor {
    #[tracing::instrument(skip(self, code, stdin), fields(code_len = code.len()))]
    async fn execute(&self, language: &str, code: &str, stdin: &str) -> ExecutionResult {
        let language: Language = match language.parse() {
            Ok(language) => language,
            Err(UnknownLanguage(language)) => {
                tracing::info!(%language, "Rejected unsupported language");
                return ExecutionResult::failed(Failure::UnsupportedLanguage { language });
            }
        };
        let adapter = adapter_for(language, &self.config.toolchains);
        tracing::debug!(language = %adapter.language(), "Toolchain selected");

        // Last line of defence: a panic anywhere below still yields a result,
        // and unwinding drops the workspace guard on the way out.
        let execution = AssertUnwindSafe(self.execute_with(adapter.as_ref(), code, stdin))
            .catch_unwind()
            .await;

        let result = match execution {
            Ok(Ok(result)) => result,
            Ok(Err(failure)) => ExecutionResult::failed(failure),
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(%msg, "Execution panicked");
                ExecutionResult::failed(Failure::Internal { msg })
            }
        };

        match &result.failure {
            None => tracing::debug!("Execution succeeded"),
            Some(failure @ (Failure::Internal { .. } | Failure::ToolchainMissing { .. })) => {
                tracing::error!(%failure, "Execution could not be carried out")
            }
            Some(failure) => tracing::info!(kind = ?failure.kind(), "Execution failed"),
        }
        result
    }
}

fn toolchain_failure(error: ProcessError) -> Failure {
    match error {
        ProcessError::NotFound { program } => Failure::ToolchainMissing { program },
        e => Failure::Internal { msg: e.to_string() },
    }
}
