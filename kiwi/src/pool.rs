//! `AnalyzerPool`: a fixed-size worker pool over `Analyzer::analyze`,
//! using a `BinaryHeap`-backed priority queue to reorder results back
//! into submission order. Plain std `mpsc` + `std::thread`, no async
//! runtime.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::analyzer::Analyzer;
use crate::error::KiwiResult;
use crate::options::{AnalyzeRequest, MatchOptions};
use crate::token::OwnedToken;

struct Job {
    index: usize,
    text: String,
    top_n: usize,
    match_options: MatchOptions,
}

struct ResultEntry {
    index: usize,
    result: KiwiResult<Vec<OwnedToken>>,
}

impl PartialEq for ResultEntry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl Eq for ResultEntry {}
impl PartialOrd for ResultEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ResultEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

pub struct AnalyzerPool {
    job_tx: Option<mpsc::Sender<Job>>,
    result_rx: mpsc::Receiver<ResultEntry>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl AnalyzerPool {
    /// Spawns `num_workers` threads, each sharing `analyzer` and pulling
    /// jobs off one mutex-guarded receiver (the standard "shared
    /// receiver" thread-pool idiom, since `mpsc::Receiver` has exactly
    /// one consumer).
    pub fn new(analyzer: Arc<Analyzer>, num_workers: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, result_rx) = mpsc::channel();

        let mut workers = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let analyzer = Arc::clone(&analyzer);
            let handle = thread::spawn(move || loop {
                let job = {
                    let rx = job_rx.lock().expect("job queue mutex poisoned");
                    rx.recv()
                };
                let job = match job {
                    Ok(job) => job,
                    Err(_) => break,
                };
                let mut request = AnalyzeRequest::new(&job.text);
                request.top_n = job.top_n;
                request.match_options = job.match_options;
                let result = analyzer.analyze(&request).map(|analyses| {
                    analyses
                        .into_iter()
                        .next()
                        .map(|a| a.tokens.into_iter().map(OwnedToken::from).collect())
                        .unwrap_or_default()
                });
                if result_tx.send(ResultEntry { index: job.index, result }).is_err() {
                    break;
                }
            });
            workers.push(handle);
        }

        AnalyzerPool {
            job_tx: Some(job_tx),
            result_rx,
            workers,
        }
    }

    /// Analyzes every text in `texts`, returning results in the same
    /// order as the input even though worker threads may finish out of
    /// order. Buffers early arrivals in a min-heap keyed by input index
    /// and drains it as soon as the next expected index is available,
    /// rather than waiting for the whole batch.
    pub fn analyze_in_order(
        &self,
        texts: Vec<String>,
        top_n: usize,
        match_options: MatchOptions,
    ) -> Vec<KiwiResult<Vec<OwnedToken>>> {
        let n = texts.len();
        let tx = self.job_tx.as_ref().expect("pool not yet shut down");
        for (index, text) in texts.into_iter().enumerate() {
            tx.send(Job { index, text, top_n, match_options })
                .expect("worker threads alive");
        }

        let mut heap: BinaryHeap<std::cmp::Reverse<ResultEntry>> = BinaryHeap::new();
        let mut next_expected = 0;
        let mut ordered: Vec<Option<KiwiResult<Vec<OwnedToken>>>> = (0..n).map(|_| None).collect();
        let mut filled = 0;

        while filled < n {
            if let Some(std::cmp::Reverse(entry)) = heap.peek() {
                if entry.index == next_expected {
                    let std::cmp::Reverse(entry) = heap.pop().unwrap();
                    ordered[entry.index] = Some(entry.result);
                    next_expected += 1;
                    filled += 1;
                    continue;
                }
            }
            let entry = self.result_rx.recv().expect("worker thread alive");
            if entry.index == next_expected {
                ordered[entry.index] = Some(entry.result);
                next_expected += 1;
                filled += 1;
            } else {
                heap.push(std::cmp::Reverse(entry));
            }
        }

        ordered.into_iter().map(|o| o.expect("every index filled")).collect()
    }
}

impl Drop for AnalyzerPool {
    fn drop(&mut self) {
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_entry_orders_by_index_only() {
        let a = ResultEntry { index: 5, result: Ok(Vec::new()) };
        let b = ResultEntry { index: 2, result: Ok(Vec::new()) };
        assert!(b < a);
    }
}
