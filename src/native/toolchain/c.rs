use std::path::{Path, PathBuf};

use crate::{
    core::domain::Language,
    native::{
        process::CommandSpec,
        toolchain::{ToolchainAdapter, executable_name},
        workspace::Workspace,
    },
};

#[derive(Debug, Clone)]
pub struct CAdapter {
    compiler: PathBuf,
}

impl CAdapter {
    pub fn new<P: AsRef<Path>>(compiler: P) -> Self {
        Self {
            compiler: compiler.as_ref().into(),
        }
    }
}

impl ToolchainAdapter for CAdapter {
    fn language(&self) -> Language {
        Language::C
    }

    fn source_file_name(&self, _source: &str) -> String {
        "program.c".to_string()
    }

    fn compile_command(&self, workspace: &Workspace, source_path: &Path) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&self.compiler)
                .arg(source_path)
                .arg("-o")
                .arg(workspace.join(executable_name()))
                .arg("-lm")
                .arg("-std=c11"),
        )
    }

    fn run_command(&self, workspace: &Workspace, _source: &str) -> CommandSpec {
        CommandSpec::new(workspace.join(executable_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_commands() {
        let base = std::env::temp_dir().join(format!("polyrunner_test_{}", Uuid::new_v4()));
        let workspace = Workspace::create(&base).await.unwrap();
        let adapter = CAdapter::new("/usr/bin/gcc");
        let source = workspace.join(adapter.source_file_name(""));
        assert!(source.ends_with("program.c"));

        let compile = adapter.compile_command(&workspace, &source).unwrap();
        assert_eq!(compile.program, PathBuf::from("/usr/bin/gcc"));
        assert_eq!(
            compile.args,
            vec![
                source.clone().into_os_string(),
                "-o".into(),
                workspace.join(executable_name()).into_os_string(),
                "-lm".into(),
                "-std=c11".into(),
            ]
        );

        let run = adapter.run_command(&workspace, "");
        assert_eq!(run.program, workspace.join(executable_name()));
        assert!(run.args.is_empty());

        drop(workspace);
        std::fs::remove_dir_all(base).unwrap();
    }
}
