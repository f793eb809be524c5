use std::path::{Path, PathBuf};

use crate::{
    core::domain::Language,
    native::{process::CommandSpec, toolchain::ToolchainAdapter, workspace::Workspace},
};

const DEFAULT_CLASS: &str = "Main";

#[derive(Debug, Clone)]
pub struct JavaAdapter {
    javac: PathBuf,
    java: PathBuf,
}

impl JavaAdapter {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(javac: P, java: Q) -> Self {
        Self {
            javac: javac.as_ref().into(),
            java: java.as_ref().into(),
        }
    }
}

/// Best-effort guess of the class to run, by a token scan rather than a parse.
///
/// The first line containing both `class` and `{` whose whitespace-separated
/// tokens include a bare `class` followed by another token decides the name: that
/// token up to its first `{`. Falls back to `Main` when there is no such line or
/// when the candidate is not a Java identifier. Comments and string literals are
/// not recognised, so `// the class below {` yields `below`, and a source whose
/// class is not found this way fails to compile.
///
/// The result names a file in the workspace, so it never contains a path separator.
pub fn java_class_name(source: &str) -> String {
    source
        .lines()
        .filter(|line| line.contains("class") && line.contains('{'))
        .find_map(|line| {
            let mut tokens = line.split_whitespace().skip_while(|token| *token != "class");
            tokens.next()?;
            let name = tokens.next()?.split('{').next().unwrap_or_default().trim();
            Some(name.to_string())
        })
        .filter(|name| is_identifier(name))
        .unwrap_or_else(|| DEFAULT_CLASS.to_string())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let is_part = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

    is_part(first) && !first.is_ascii_digit() && chars.all(is_part)
}

impl ToolchainAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn source_file_name(&self, source: &str) -> String {
        format!("{}.java", java_class_name(source))
    }

    fn compile_command(&self, _workspace: &Workspace, source_path: &Path) -> Option<CommandSpec> {
        Some(CommandSpec::new(&self.javac).arg(source_path))
    }

    fn run_command(&self, workspace: &Workspace, source: &str) -> CommandSpec {
        CommandSpec::new(&self.java)
            .arg("-cp")
            .arg(workspace.path())
            .arg(java_class_name(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_class() {
        let source = "import java.util.*;\n\npublic class Solution {\n    public static void main(String[] a) {}\n}\n";
        assert_eq!(java_class_name(source), "Solution");
    }

    #[test]
    fn test_brace_attached_to_name() {
        assert_eq!(java_class_name("class Foo{\n}"), "Foo");
        assert_eq!(java_class_name("final class Bar extends Base {"), "Bar");
    }

    #[test]
    fn test_no_class_falls_back_to_main() {
        assert_eq!(java_class_name("interface Runner { void run(); }"), "Main");
        assert_eq!(java_class_name(""), "Main");
    }

    #[test]
    fn test_class_without_brace_on_same_line_is_skipped() {
        let source = "public class Solution\n{\n}\n";
        assert_eq!(java_class_name(source), "Main");
    }

    #[test]
    fn test_first_class_wins() {
        let source = "class Helper {\n}\npublic class Solution {\n}\n";
        assert_eq!(java_class_name(source), "Helper");
    }

    #[test]
    fn test_nested_class_after_outer() {
        let source = "public class Outer {\n    static class Inner {\n    }\n}\n";
        assert_eq!(java_class_name(source), "Outer");
    }

    #[test]
    fn test_comment_mentioning_class_can_win() {
        // Documented limitation of the token scan.
        let source = "// the class below { is the answer\npublic class Solution {\n}\n";
        assert_eq!(java_class_name(source), "below");
    }

    #[test]
    fn test_substring_class_is_not_a_token() {
        let source = "// subclass { note\npublic class Solution {\n}\n";
        assert_eq!(java_class_name(source), "Solution");
    }

    #[test]
    fn test_empty_candidate_falls_back_to_main() {
        // The first matching line decides, even when it yields nothing usable.
        let source = "class {\n}\nclass Real {\n}\n";
        assert_eq!(java_class_name(source), "Main");
    }

    #[test]
    fn test_non_identifier_candidates_fall_back_to_main() {
        let sources = [
            "public class /tmp/escape {\n}\n",
            "class ../../escape {\n}\n",
            "class ..\\escape {\n}\n",
            "class a.b {\n}\n",
            "class 1Solution {\n}\n",
            "class Sol-ution {\n}\n",
        ];
        for source in sources {
            assert_eq!(java_class_name(source), "Main", "source: {source:?}");
        }
    }

    #[test]
    fn test_identifier_characters_are_kept() {
        assert_eq!(java_class_name("class $Solution_2 {"), "$Solution_2");
        assert_eq!(java_class_name("class _Main {"), "_Main");
    }

    #[test]
    fn test_source_file_name() {
        let adapter = JavaAdapter::new("javac", "java");
        assert_eq!(
            adapter.source_file_name("public class Solution {}"),
            "Solution.java"
        );
        assert_eq!(adapter.source_file_name("no classes here"), "Main.java");
    }
}
