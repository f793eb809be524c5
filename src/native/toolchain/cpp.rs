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
pub struct CppAdapter {
    compiler: PathBuf,
}

impl CppAdapter {
    pub fn new<P: AsRef<Path>>(compiler: P) -> Self {
        Self {
            compiler: compiler.as_ref().into(),
        }
    }
}

impl ToolchainAdapter for CppAdapter {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_file_name(&self, _source: &str) -> String {
        "program.cpp".to_string()
    }

    fn compile_command(&self, workspace: &Workspace, source_path: &Path) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&self.compiler)
                .arg(source_path)
                .arg("-o")
                .arg(workspace.join(executable_name()))
                .arg("-std=c++17"),
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
        let adapter = CppAdapter::new("/usr/bin/g++");
        let source = workspace.join("program.cpp");

        let compile = adapter.compile_command(&workspace, &source).unwrap();
        assert_eq!(compile.program, PathBuf::from("/usr/bin/g++"));
        assert_eq!(
            compile.args,
            vec![
                source.clone().into_os_string(),
                "-o".into(),
                workspace.join(executable_name()).into_os_string(),
                "-std=c++17".into(),
            ]
        );

        let run = adapter.run_command(&workspace, "");
        assert_eq!(run.program, workspace.join(executable_name()));
        assert!(run.args.is_empty());

        drop(workspace);
        std::fs::remove_dir_all(base).unwrap();
    }
}
