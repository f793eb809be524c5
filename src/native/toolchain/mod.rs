//! Toolchain adapters.
//!
//! The executor stays language-agnostic. Each adapter names the source file and
//! builds the compile and run commands for one language.

pub mod c;
pub mod cpp;
pub mod java;
pub mod python;

use std::path::Path;

use crate::{
    config::Toolchains,
    core::domain::Language,
    native::{process::CommandSpec, workspace::Workspace},
};

pub trait ToolchainAdapter: std::fmt::Debug + Send + Sync {
    fn language(&self) -> Language;

    /// File the submitted source is written to, relative to the workspace.
    fn source_file_name(&self, source: &str) -> String;

    /// `None` for interpreted languages.
    fn compile_command(&self, workspace: &Workspace, source_path: &Path) -> Option<CommandSpec>;

    fn run_command(&self, workspace: &Workspace, source: &str) -> CommandSpec;
}

pub fn adapter_for(language: Language, toolchains: &Toolchains) -> Box<dyn ToolchainAdapter> {
    match language {
        Language::C => Box::new(c::CAdapter::new(&toolchains.c_compiler)),
        Language::Cpp => Box::new(cpp::CppAdapter::new(&toolchains.cpp_compiler)),
        Language::Java => Box::new(java::JavaAdapter::new(&toolchains.javac, &toolchains.java)),
        Language::Python => Box::new(python::PythonAdapter::new(&toolchains.python)),
    }
}

/// Name of the binary produced by native compilers.
pub fn executable_name() -> &'static str {
    if cfg!(windows) { "program.exe" } else { "program" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_for_every_language() {
        let toolchains = Toolchains::default();
        for language in [Language::C, Language::Cpp, Language::Java, Language::Python] {
            assert_eq!(adapter_for(language, &toolchains).language(), language);
        }
    }
}
