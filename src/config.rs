use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use uuid::Uuid;

use crate::constants::{DEFAULT_ADDR, DEFAULT_MAX_CODE_LENGTH, DEFAULT_RUN_TIMEOUT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
    #[error("Failed to create execution directory {}: {source}", .path.display())]
    ExecutionDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Names or paths of the programs each adapter spawns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchains {
    pub c_compiler: PathBuf,
    pub cpp_compiler: PathBuf,
    pub javac: PathBuf,
    pub java: PathBuf,
    pub python: PathBuf,
}

impl Default for Toolchains {
    fn default() -> Self {
        let python = if cfg!(windows) { "python" } else { "python3" };
        Self {
            c_compiler: "gcc".into(),
            cpp_compiler: "g++".into(),
            javac: "javac".into(),
            java: "java".into(),
            python: python.into(),
        }
    }
}

impl Toolchains {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            c_compiler: path_var("POLYRUNNER_CC").unwrap_or(defaults.c_compiler),
            cpp_compiler: path_var("POLYRUNNER_CXX").unwrap_or(defaults.cpp_compiler),
            javac: path_var("POLYRUNNER_JAVAC").unwrap_or(defaults.javac),
            java: path_var("POLYRUNNER_JAVA").unwrap_or(defaults.java),
            python: path_var("POLYRUNNER_PYTHON").unwrap_or(defaults.python),
        }
    }
}

/// Settings fixed at executor construction and shared read-only by every call.
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    pub run_timeout: Duration,
    /// Parent of every per-call workspace.
    pub base_dir: PathBuf,
    pub toolchains: Toolchains,
}

impl ExecutorConfig {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            run_timeout: DEFAULT_RUN_TIMEOUT,
            base_dir: base_dir.as_ref().into(),
            toolchains: Toolchains::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let run_timeout = parse_var::<u64>("POLYRUNNER_RUN_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RUN_TIMEOUT);
        if run_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: "POLYRUNNER_RUN_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "run timeout must be positive".to_string(),
            });
        }

        let base_dir = match path_var("POLYRUNNER_EXECUTION_DIR") {
            Some(dir) => {
                std::fs::create_dir_all(&dir).map_err(|source| ConfigError::ExecutionDir {
                    path: dir.clone(),
                    source,
                })?;
                dir
            }
            None => fresh_base_dir()?,
        };

        Ok(Self {
            run_timeout,
            toolchains: Toolchains::from_env(),
            ..Self::new(base_dir)
        })
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Longest accepted source, in characters.
    pub max_code_length: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = match parse_var::<SocketAddr>("POLYRUNNER_ADDR")? {
            Some(addr) => addr,
            None => DEFAULT_ADDR
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                    var: "POLYRUNNER_ADDR".to_string(),
                    value: DEFAULT_ADDR.to_string(),
                    reason: e.to_string(),
                })?,
        };

        Ok(Self {
            addr,
            max_code_length: parse_var("POLYRUNNER_MAX_CODE_LENGTH")?
                .unwrap_or(DEFAULT_MAX_CODE_LENGTH),
        })
    }
}

fn fresh_base_dir() -> Result<PathBuf, ConfigError> {
    let path = env::temp_dir().join(format!("polyrunner_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&path).map_err(|source| ConfigError::ExecutionDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn path_var(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn parse_var<T>(var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var: var.to_string(),
                value,
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolchains() {
        let toolchains = Toolchains::default();
        assert_eq!(toolchains.c_compiler, PathBuf::from("gcc"));
        assert_eq!(toolchains.cpp_compiler, PathBuf::from("g++"));
        assert_eq!(toolchains.javac, PathBuf::from("javac"));
        assert_eq!(toolchains.java, PathBuf::from("java"));
    }

    #[test]
    fn test_fresh_base_dir_is_created_and_unique() {
        let first = fresh_base_dir().unwrap();
        let second = fresh_base_dir().unwrap();

        assert!(first.is_dir());
        assert!(second.is_dir());
        assert_ne!(first, second);

        std::fs::remove_dir_all(first).unwrap();
        std::fs::remove_dir_all(second).unwrap();
    }

    #[test]
    fn test_parse_unset_var() {
        let value: Option<u64> = parse_var("POLYRUNNER_TEST_SURELY_UNSET_VAR").unwrap();
        assert_eq!(value, None);
    }
}
