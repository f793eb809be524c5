use std::panic;
use std::sync::Arc;

use tonic::transport::Server;
use tracing_subscriber::EnvFilter;

use crate::config::{ExecutorConfig, ServerConfig};
use crate::grpc::models::execution_service_server::ExecutionServiceServer;
use crate::grpc::services::ExecutionServiceImpl;
use crate::native::executor::NativeExecutor;

mod config;
mod constants;
mod core;
mod grpc;
mod native;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_panic_hook();

    let server_config = ServerConfig::from_env()?;
    let executor = NativeExecutor::new(ExecutorConfig::from_env()?);
    tracing::info!(
        base_dir = %executor.config().base_dir.display(),
        run_timeout = ?executor.config().run_timeout,
        toolchains = ?executor.config().toolchains,
        "Executor configured"
    );

    let execution_service =
        ExecutionServiceImpl::new(Arc::new(executor), server_config.max_code_length);
    let service = ExecutionServiceServer::new(execution_service);

    tracing::info!("gRPC server listening on {}", server_config.addr);
    Server::builder()
        .add_service(service)
        .serve(server_config.addr)
        .await?;

    Ok(())
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
