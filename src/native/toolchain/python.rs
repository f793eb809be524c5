use std::path::{Path, PathBuf};

use crate::{
    core::domain::Language,
    native::{process::CommandSpec, toolchain::ToolchainAdapter, workspace::Workspace},
};

const SOURCE_FILE: &str = "program.py";

#[derive(Debug, Clone)]
pub struct PythonAdapter {
    interpreter: PathBuf,
}

impl PythonAdapter {
    pub fn new<P: AsRef<Path>>(interpreter: P) -> Self {
        Self {
            interpreter: interpreter.as_ref().into(),
        }
    }
}

impl ToolchainAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_file_name(&self, _source: &str) -> String {
        SOURCE_FILE.to_string()
    }

    fn compile_command(&self, _workspace: &Workspace, _source_path: &Path) -> Option<CommandSpec> {
        None
    }

    fn run_command(&self, workspace: &Workspace, _source: &str) -> CommandSpec {
        CommandSpec::new(&self.interpreter).arg(workspace.join(SOURCE_FILE))
    }
}
