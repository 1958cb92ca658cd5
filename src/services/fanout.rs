use std::future::Future;

use crate::error::{AppError, AppResult};

/// Runs every future as its own task and waits for all of them
///
/// Each outcome is kept in input order. A task that panics or is cancelled
/// becomes an `Err` entry; one failure never aborts its siblings.
pub async fn settle_all<T, F>(futures: impl IntoIterator<Item = F>) -> Vec<AppResult<T>>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let tasks: Vec<_> = futures.into_iter().map(tokio::spawn).collect();

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                results.push(Err(AppError::Internal(e.to_string())));
            }
        }
    }

    results
}

/// Keeps the successful outcomes, logging each failure with `what` as context
pub fn keep_successes<T>(results: Vec<AppResult<T>>, what: &'static str) -> Vec<T> {
    let total = results.len();
    let successes: Vec<T> = results
        .into_iter()
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    network = e.is_network(),
                    what,
                    "Lookup failed, omitting from results"
                );
                None
            }
        })
        .collect();

    if successes.len() < total {
        tracing::warn!(
            what,
            success_count = successes.len(),
            error_count = total - successes.len(),
            "Partial fetch failure"
        );
    }

    successes
}
