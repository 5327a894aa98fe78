//! Bounded-concurrency batches of per-row requests.

use futures::stream::{self, StreamExt};
use std::future::Future;
use tablescope_core::{Error, Result};
use tracing::warn;

/// Runs `op` for every item with at most `concurrency` requests in flight.
///
/// Every request runs to completion. Returns the number of items on success;
/// if any request failed, returns one [`Error::Batch`] carrying the failure
/// count and the first failure in input order. Completed requests stay
/// applied.
pub async fn run_batch<T, F, Fut>(
    action: &str,
    items: Vec<T>,
    concurrency: usize,
    op: F,
) -> Result<usize>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let total = items.len();
    let mut outcomes: Vec<(usize, Result<()>)> = stream::iter(
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let request = op(item);
                async move { (i, request.await) }
            }),
    )
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;
    outcomes.sort_by_key(|(i, _)| *i);

    let mut failed = 0;
    let mut first = None;
    for (i, outcome) in outcomes {
        if let Err(err) = outcome {
            warn!(action, item = i, error = %err, "batch request failed");
            failed += 1;
            first.get_or_insert(err);
        }
    }
    match first {
        None => Ok(total),
        Some(first) => Err(Error::batch(failed, total, first)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_all_requests_run() {
        let seen = RefCell::new(Vec::new());
        let result = run_batch("test", vec![1, 2, 3], 2, |n| {
            seen.borrow_mut().push(n);
            async move { Ok(()) }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_failures_aggregate() {
        let result = run_batch("test", vec![1, 2, 3, 4], 0, |n| async move {
            if n % 2 == 0 {
                Err(Error::not_found("t", n.to_string()))
            } else {
                Ok(())
            }
        })
        .await;
        match result {
            Err(Error::Batch { failed, total, first }) => {
                assert_eq!((failed, total), (2, 4));
                assert!(matches!(*first, Error::NotFound { ref key, .. } if key == "2"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let result = run_batch("test", Vec::<u8>::new(), 4, |_| async { Ok(()) }).await;
        assert_eq!(result.unwrap(), 0);
    }
}
