/// Native module runs submissions directly on the host with the installed
/// toolchains, without containers, using per-call workspaces and process
/// groups for cleanup.
pub mod executor;
pub mod process;
pub mod toolchain;
pub mod workspace;
