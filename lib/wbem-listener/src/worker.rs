/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use crate::ListenerError;
use crate::serve::ServeContext;

const SEND_WAIT: Duration = Duration::from_millis(100);

pub(crate) struct Job {
    pub(crate) stream: TcpStream,
    pub(crate) peer: SocketAddr,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerPoolStats {
    pub workers: usize,
    pub idle: usize,
    pub busy: usize,
    pub queued: usize,
}

struct Shared {
    min: usize,
    max: usize,
    idle_timeout: Duration,
    receiver: Receiver<Job>,
    context: ServeContext,
    total: AtomicUsize,
    idle: AtomicUsize,
    next_id: AtomicUsize,
    next_job: AtomicUsize,
    /// Sockets being served, shut down if still there after the grace period
    in_flight: Mutex<HashMap<usize, TcpStream>>,
}

impl Shared {
    fn in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<usize, TcpStream>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reserve a worker slot if below the max
    fn try_grow(&self) -> bool {
        self.total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max).then_some(n + 1)
            })
            .is_ok()
    }

    /// Release a worker slot if above the min
    fn try_shrink(&self) -> bool {
        self.total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n > self.min).then_some(n - 1)
            })
            .is_ok()
    }
}

/// A bounded set of worker threads fed from the dispatcher queue.
///
/// Workers are spawned when a job arrives and none is idle, and exit after
/// staying idle for a while as long as more than the min are running.
pub(crate) struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    pub(crate) fn new(
        min: usize,
        max: usize,
        idle_timeout: Duration,
        queue_capacity: usize,
        context: ServeContext,
    ) -> Result<Self, ListenerError> {
        let (sender, receiver) = flume::bounded::<Job>(queue_capacity);
        let shared = Arc::new(Shared {
            min,
            max,
            idle_timeout,
            receiver,
            context,
            total: AtomicUsize::new(0),
            idle: AtomicUsize::new(0),
            next_id: AtomicUsize::new(0),
            next_job: AtomicUsize::new(0),
            in_flight: Mutex::new(HashMap::new()),
        });
        let pool = WorkerPool {
            sender: Mutex::new(Some(sender)),
            shared,
        };
        for _ in 0..min {
            if pool.shared.try_grow() {
                pool.spawn_worker()?;
            }
        }
        Ok(pool)
    }

    fn spawn_worker(&self) -> Result<(), ListenerError> {
        let shared = self.shared.clone();
        let id = shared.next_id.fetch_add(1, Ordering::Relaxed);
        let r = std::thread::Builder::new()
            .name(format!("wbem-worker#{id}"))
            .spawn(move || {
                log::debug!("worker {id} started");
                run_worker(&shared);
                log::debug!("worker {id} exited");
            });
        match r {
            Ok(_detached) => Ok(()),
            Err(e) => {
                self.shared.total.fetch_sub(1, Ordering::AcqRel);
                Err(ListenerError::SpawnFailed(e))
            }
        }
    }

    /// Queue an accepted socket, waiting while the queue is full.
    ///
    /// The socket is dropped if the pool is shut down in the mean time.
    pub(crate) fn dispatch(&self, mut job: Job, is_stopping: impl Fn() -> bool) {
        let Some(sender) = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        else {
            return;
        };

        if (self.shared.idle.load(Ordering::Acquire) == 0
            || self.shared.total.load(Ordering::Acquire) == 0)
            && self.shared.try_grow()
            && let Err(e) = self.spawn_worker()
        {
            log::warn!("{e}");
        }

        loop {
            match sender.send_timeout(job, SEND_WAIT) {
                Ok(_) => return,
                Err(SendTimeoutError::Timeout(j)) => {
                    if is_stopping() {
                        return;
                    }
                    job = j;
                }
                Err(SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }

    pub(crate) fn stats(&self) -> WorkerPoolStats {
        let workers = self.shared.total.load(Ordering::Acquire);
        let idle = self.shared.idle.load(Ordering::Acquire);
        WorkerPoolStats {
            workers,
            idle,
            busy: self.shared.in_flight().len(),
            queued: self.shared.receiver.len(),
        }
    }

    /// Stop taking jobs, wait up to `grace` for the workers and then
    /// close every socket still in use.
    ///
    /// Return true if all workers exited in time.
    pub(crate) fn shutdown(&self, grace: Duration) -> bool {
        drop(self.sender.lock().unwrap_or_else(|e| e.into_inner()).take());

        let deadline = Instant::now() + grace;
        while self.shared.total.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        let mut dropped = 0;
        while let Ok(job) = self.shared.receiver.try_recv() {
            let _ = job.stream.shutdown(Shutdown::Both);
            dropped += 1;
        }
        let in_flight: Vec<TcpStream> = self.shared.in_flight().drain().map(|(_, s)| s).collect();
        for stream in &in_flight {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if dropped > 0 || !in_flight.is_empty() {
            log::warn!(
                "{dropped} queued and {} in flight connections closed at shutdown",
                in_flight.len()
            );
            return false;
        }
        self.shared.total.load(Ordering::Acquire) == 0
    }
}

fn run_worker(shared: &Shared) {
    loop {
        shared.idle.fetch_add(1, Ordering::AcqRel);
        let r = shared.receiver.recv_timeout(shared.idle_timeout);
        shared.idle.fetch_sub(1, Ordering::AcqRel);

        match r {
            Ok(job) => {
                let key = shared.next_job.fetch_add(1, Ordering::Relaxed);
                if let Ok(s) = job.stream.try_clone() {
                    shared.in_flight().insert(key, s);
                }
                log::debug!("serve connection from {}", job.peer);
                shared.context.serve(job.stream, job.peer);
                shared.in_flight().remove(&key);
            }
            Err(RecvTimeoutError::Timeout) => {
                if shared.try_shrink() && (shared.receiver.is_empty() || !shared.try_grow()) {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                shared.total.fetch_sub(1, Ordering::AcqRel);
                return;
            }
        }
    }
}
