use std::sync::Arc;

use futures::{StreamExt, stream};
use itertools::Itertools;
use tokio::{
    sync::mpsc::{Receiver, Sender},
    time::Instant,
};

use crate::{
    constants::{MAX_CONCURRENT_CASES, SUBMISSION_TX_ERR},
    core::{
        domain::{CaseReport, ExecutionResult, Submission, SubmissionState, TestCase},
        judge,
        traits::executor::Executor,
    },
};

#[tracing::instrument(skip_all)]
pub fn handle_judging(
    res_tx: Sender<Submission>,
    mut judge_rx: Receiver<Submission>,
    executor: Arc<dyn Executor>,
) {
    tokio::spawn(async move {
        while let Some(submission) = judge_rx.recv().await {
            process_submission(submission, &res_tx, &executor).await;
        }
    });
}

/// Judges every selected test case of a submission and streams each state change.
async fn process_submission(
    submission: Submission,
    res_tx: &Sender<Submission>,
    executor: &Arc<dyn Executor>,
) {
    tracing::debug!(id = %submission.id, language = %submission.language, "Judging submission");

    let SubmissionState::Pending = submission.state else {
        tracing::error!(id = %submission.id, "Submission is not pending");
        return;
    };

    let started = Instant::now();
    let cases: Vec<(usize, TestCase)> = submission
        .selected_cases()
        .into_iter()
        .map(|(idx, case)| (idx, case.clone()))
        .collect();
    let total = cases.len();

    let mut reports: Vec<CaseReport> = Vec::with_capacity(total);
    let submission = submission.change_state(SubmissionState::Judging {
        reports: reports.clone(),
        total,
    });
    res_tx.send(submission.clone()).await.expect(SUBMISSION_TX_ERR);

    let mut results = stream::iter(cases.into_iter().map(|(idx, case)| {
        let executor = executor.clone();
        let language = submission.language.clone();
        let code = submission.code.clone();
        async move {
            let result = executor.execute(&language, &code, &case.stdin).await;
            (idx, case, result)
        }
    }))
    .buffer_unordered(MAX_CONCURRENT_CASES);

    while let Some((idx, case, result)) = results.next().await {
        log_case(&submission, idx, &result);
        reports.push(judge::report(idx, &case, &result));

        let update = submission.change_state(SubmissionState::Judging {
            reports: ordered(&reports),
            total,
        });
        res_tx.send(update).await.expect(SUBMISSION_TX_ERR);
    }

    let passed = reports.iter().filter(|report| report.passed).count();
    let submission = submission.change_state(SubmissionState::Done {
        passed,
        total,
        verdict: judge::verdict(passed, total),
        reports: ordered(&reports),
        execution_time_ms: started.elapsed().as_millis() as u64,
    });
    tracing::info!(id = %submission.id, passed, total, "Submission judged");
    res_tx.send(submission).await.expect(SUBMISSION_TX_ERR);
}

fn ordered(reports: &[CaseReport]) -> Vec<CaseReport> {
    reports
        .iter()
        .cloned()
        .sorted_by_key(|report| report.index)
        .collect_vec()
}

fn log_case(submission: &Submission, idx: usize, result: &ExecutionResult) {
    match &result.failure {
        None => tracing::debug!(id = %submission.id, case = idx, "Case executed"),
        Some(failure) => tracing::debug!(
            id = %submission.id,
            case = idx,
            kind = ?failure.kind(),
            "Case failed"
        ),
    }
}
