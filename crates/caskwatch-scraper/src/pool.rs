//! Bounded fan-out used by sources that poll one request per product.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};

/// Runs `task` once per input with at most `max_concurrent` in flight.
///
/// A permit is acquired before each spawn, so dispatch itself blocks at the
/// ceiling. Each task sleeps `task_delay` before starting its work. Results
/// come back through a channel sized to the input count, in completion
/// order. The call returns once every dispatched task has reported; a task
/// that panics is logged and missing from the output.
pub(crate) async fn run_bounded<I, O, F, Fut>(
    inputs: Vec<I>,
    max_concurrent: usize,
    task_delay: Duration,
    task: F,
) -> Vec<O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = O> + Send + 'static,
{
    let total = inputs.len();
    if total == 0 {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let (tx, mut rx) = mpsc::channel::<O>(total);
    let task = Arc::new(task);
    let mut dispatched = 0usize;

    for input in inputs {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            tracing::error!("worker semaphore closed; stopping dispatch");
            break;
        };
        let tx = tx.clone();
        let task = Arc::clone(&task);

        tokio::spawn(async move {
            let _permit = permit;
            if !task_delay.is_zero() {
                tokio::time::sleep(task_delay).await;
            }
            let output = task(input).await;
            // Capacity equals the task count, so this never waits.
            let _ = tx.send(output).await;
        });
        dispatched += 1;
    }
    drop(tx);

    let mut results = Vec::with_capacity(dispatched);
    while results.len() < dispatched {
        match rx.recv().await {
            Some(output) => results.push(output),
            None => {
                tracing::error!(
                    dispatched,
                    received = results.len(),
                    "worker tasks exited without reporting"
                );
                break;
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn empty_input_returns_immediately() {
        let out: Vec<u32> = run_bounded(Vec::<u32>::new(), 4, Duration::ZERO, |n| async move { n })
            .await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn never_exceeds_ceiling_and_collects_every_result() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let inputs: Vec<usize> = (0..20).collect();
        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let results = run_bounded(inputs, 15, Duration::ZERO, move |n| {
            let in_flight = Arc::clone(&f);
            let peak = Arc::clone(&p);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                if n % 3 == 0 {
                    Err(format!("task {n} failed"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(results.len(), 20, "every dispatched task must report");
        assert!(peak.load(Ordering::SeqCst) <= 15, "ceiling exceeded");
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 7);
    }

    #[tokio::test]
    async fn ceiling_of_one_serializes_tasks() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));

        let results = run_bounded((0..5).collect(), 1, Duration::ZERO, move |n: u32| {
            let in_flight = Arc::clone(&f);
            let peak = Arc::clone(&p);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n
            }
        })
        .await;

        assert_eq!(results.len(), 5);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_task_does_not_hang_collection() {
        let results = run_bounded((0..4).collect(), 2, Duration::ZERO, |n: u32| async move {
            assert!(n != 2, "boom");
            n
        })
        .await;
        assert_eq!(results.len(), 3);
        assert!(!results.contains(&2));
    }
}
