use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Run `f` over every item with at most `limit` in flight. Slot `i` holds item `i`'s result,
/// or `None` if its task panicked.
pub async fn gather_ordered<I, T, F, Fut>(items: Vec<I>, limit: usize, f: F) -> Vec<Option<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let total = items.len();
    let limit = limit.max(1);
    let semaphore = Arc::new(Semaphore::new(limit));
    let pb = progress_bar(total);

    // Workers send (index, result); the receive loop fills slots in whatever order they land
    let (tx, mut rx) = mpsc::channel::<(usize, T)>(limit * 2);

    for (idx, item) in items.into_iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let fut = f(item);

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let out = fut.await;
            let _ = tx.send((idx, out)).await;
        });
    }

    drop(tx);

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some((idx, out)) = rx.recv().await {
        slots[idx] = Some(out);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let lost = slots.iter().filter(|s| s.is_none()).count();
    if lost > 0 {
        warn!("{} of {} tasks ended without a result", lost, total);
    }
    slots
}

pub struct BatchReport<T> {
    pub results: Vec<Option<T>>,
    pub batches: usize,
    pub pauses: usize,
}

/// Run `f` over items in input order, `batch_size` at a time. Every batch that fills up is
/// followed by `pause`; a trailing partial batch is not.
pub async fn run_in_batches<I, T, F, Fut>(
    items: Vec<I>,
    batch_size: usize,
    pause: Duration,
    f: F,
) -> BatchReport<T>
where
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let batch_size = batch_size.max(1);
    let pb = progress_bar(items.len());
    let mut results = Vec::with_capacity(items.len());
    let mut handles = Vec::with_capacity(batch_size);
    let mut batches = 0;
    let mut pauses = 0;

    for item in items {
        handles.push(tokio::spawn(f(item)));

        if handles.len() >= batch_size {
            drain(&mut handles, &mut results, &pb).await;
            batches += 1;
            info!("Batch completed. Sleeping {:.1} sec...", pause.as_secs_f64());
            tokio::time::sleep(pause).await;
            pauses += 1;
        }
    }

    if !handles.is_empty() {
        drain(&mut handles, &mut results, &pb).await;
        batches += 1;
    }
    pb.finish_and_clear();

    BatchReport {
        results,
        batches,
        pauses,
    }
}

async fn drain<T>(handles: &mut Vec<JoinHandle<T>>, results: &mut Vec<Option<T>>, pb: &ProgressBar) {
    for handle in handles.drain(..) {
        match handle.await {
            Ok(out) => results.push(Some(out)),
            Err(e) => {
                warn!("Task failed: {}", e);
                results.push(None);
            }
        }
        pb.inc(1);
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})",
    )
    .map(|s| s.progress_chars("=> "))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn gather_keeps_input_order() {
        // Later items finish first
        let items: Vec<u64> = (0..8).collect();
        let out = gather_ordered(items, 8, |i| async move {
            tokio::time::sleep(Duration::from_millis(100 * (8 - i))).await;
            i * 10
        })
        .await;
        let values: Vec<u64> = out.into_iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[tokio::test(start_paused = true)]
    async fn gather_respects_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let out = gather_ordered((0..20).collect::<Vec<usize>>(), 3, |i| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                i
            }
        })
        .await;
        assert_eq!(out.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gather_panicking_task_leaves_empty_slot() {
        let out = gather_ordered(vec![1, 2, 3], 2, |i| async move {
            if i == 2 {
                panic!("boom");
            }
            i
        })
        .await;
        assert_eq!(out, vec![Some(1), None, Some(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn gather_empty() {
        let out: Vec<Option<u8>> = gather_ordered(Vec::<u8>::new(), 4, |i| async move { i }).await;
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn seven_rows_two_batches_one_pause() {
        let start = Instant::now();
        let report = run_in_batches((0..7).collect(), 5, Duration::from_secs(2), |i: i32| async move {
            i + 100
        })
        .await;
        assert_eq!(report.batches, 2);
        assert_eq!(report.pauses, 1);
        let values: Vec<i32> = report.results.into_iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![100, 101, 102, 103, 104, 105, 106]);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn full_final_batch_still_pauses() {
        let report = run_in_batches((0..10).collect(), 5, Duration::from_secs(2), |i: i32| async move { i })
            .await;
        assert_eq!(report.batches, 2);
        assert_eq!(report.pauses, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn batches_keep_order_under_uneven_latency() {
        let report = run_in_batches((0..6).collect(), 3, Duration::from_millis(10), |i: u64| async move {
            tokio::time::sleep(Duration::from_millis(60 - i * 10)).await;
            i
        })
        .await;
        let values: Vec<u64> = report.results.into_iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_members_run_concurrently() {
        let start = Instant::now();
        let report = run_in_batches((0..4).collect(), 4, Duration::from_secs(2), |_: u8| async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
        })
        .await;
        assert_eq!(report.batches, 1);
        // one second of work, not four, plus the pause after the full batch
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn no_items_no_batches() {
        let report = run_in_batches(Vec::<u8>::new(), 5, Duration::from_secs(2), |i| async move { i }).await;
        assert_eq!(report.batches, 0);
        assert_eq!(report.pauses, 0);
        assert!(report.results.is_empty());
    }
}
