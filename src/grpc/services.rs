use std::sync::Arc;

use tokio::{
    sync::mpsc::{Receiver, Sender, channel},
    time::Instant,
};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

use crate::{
    constants::{JUDGE_TX_ERR, STREAM_TX_ERR},
    core::{domain, pipeline::judging::handle_judging, traits::executor::Executor},
    grpc::{
        mappers::validate_source,
        models::{
            ExecuteRequest, ExecuteResponse, JudgeRequest, Submission as GrpcSubmission,
            execution_service_server::ExecutionService,
        },
    },
};

#[derive(Clone, Debug)]
pub struct ExecutionServiceImpl {
    executor: Arc<dyn Executor>,
    max_code_length: usize,
}

#[tonic::async_trait]
impl ExecutionService for ExecutionServiceImpl {
    type JudgeStream = ReceiverStream<Result<GrpcSubmission, Status>>;

    #[tracing::instrument(skip_all, fields(language = %request.get_ref().language))]
    async fn execute(
        &self,
        request: Request<ExecuteRequest>,
    ) -> Result<Response<ExecuteResponse>, Status> {
        let req = request.into_inner();
        validate_source(&req.language, &req.code, self.max_code_length)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        let started = Instant::now();
        let result = self
            .executor
            .execute(&req.language, &req.code, &req.stdin)
            .await;
        let execution_time_ms = started.elapsed().as_millis() as u64;
        tracing::info!(success = result.success(), execution_time_ms, "Executed code");

        Ok(Response::new(ExecuteResponse {
            execution_time_ms,
            ..result.into()
        }))
    }

    #[tracing::instrument(skip_all, fields(language = %request.get_ref().language))]
    async fn judge(
        &self,
        request: Request<JudgeRequest>,
    ) -> Result<Response<Self::JudgeStream>, Status> {
        let req = request.into_inner();
        validate_source(&req.language, &req.code, self.max_code_length)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        tracing::info!(test_cases = req.test_cases.len(), "Received judge request");

        let (stream_tx, stream_rx) = channel::<Result<GrpcSubmission, Status>>(128);
        let (res_tx, res_rx) = channel::<domain::Submission>(128);
        let (judge_tx, judge_rx) = channel::<domain::Submission>(128);

        handle_judging(res_tx, judge_rx, self.executor.clone());

        self.process_valid_request(req.into(), stream_tx, judge_tx, res_rx)
            .await;

        Ok(Response::new(ReceiverStream::new(stream_rx)))
    }
}

impl ExecutionServiceImpl {
    pub fn new(executor: Arc<dyn Executor>, max_code_length: usize) -> Self {
        Self {
            executor,
            max_code_length,
        }
    }

    async fn process_valid_request(
        &self,
        submission: domain::Submission,
        stream_tx: Sender<Result<GrpcSubmission, Status>>,
        judge_tx: Sender<domain::Submission>,
        mut res_rx: Receiver<domain::Submission>,
    ) {
        stream_tx
            .send(Ok(submission.clone().into()))
            .await
            .expect(STREAM_TX_ERR);

        judge_tx.send(submission).await.expect(JUDGE_TX_ERR);

        tokio::spawn(async move {
            while let Some(submission) = res_rx.recv().await {
                tracing::debug!(id = %submission.id, "Send new state of submission");
                // Keep draining after a disconnect so the judging stage never blocks.
                if stream_tx.send(Ok(submission.into())).await.is_err() {
                    tracing::debug!("Client disconnected");
                }
            }
        });
    }
}
