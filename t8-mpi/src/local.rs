//! `LocalProcessGroup`: one OS thread per simulated rank, wired together
//! with `crossbeam-channel` mailboxes and a `std::sync::Barrier` for the
//! collectives. Exists to exercise the balance driver and ghost exchange
//! against something that actually crosses thread boundaries, without
//! depending on a real MPI installation.

use std::sync::{Arc, Barrier, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::errors::MpiError;
use crate::group::ProcessGroup;

type Envelope = (i32, Vec<u8>);

struct Shared {
    barrier: Barrier,
    and_buf: Mutex<Vec<Option<bool>>>,
    sum_buf: Mutex<Vec<Option<usize>>>,
}

/// A handle held by one simulated rank's thread.
pub struct LocalProcessGroup {
    rank: i32,
    size: i32,
    shared: Arc<Shared>,
    senders: Vec<Sender<Envelope>>,
    receiver: Receiver<Envelope>,
}

impl LocalProcessGroup {
    /// Spawns `num_ranks` threads, each running `body` with its own
    /// `LocalProcessGroup` handle, and waits for all of them to finish.
    /// `body` runs the same logic on every rank, the way a real MPI job is
    /// one program executed once per rank.
    pub fn run<F>(num_ranks: usize, body: F)
    where
        F: Fn(LocalProcessGroup) + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            barrier: Barrier::new(num_ranks),
            and_buf: Mutex::new(vec![None; num_ranks]),
            sum_buf: Mutex::new(vec![None; num_ranks]),
        });

        let mut senders: Vec<Sender<Envelope>> = Vec::with_capacity(num_ranks);
        let mut receivers: Vec<Receiver<Envelope>> = Vec::with_capacity(num_ranks);
        for _ in 0..num_ranks {
            let (tx, rx) = unbounded();
            senders.push(tx);
            receivers.push(rx);
        }

        let body = Arc::new(body);
        let mut handles = Vec::with_capacity(num_ranks);
        for (rank, receiver) in receivers.into_iter().enumerate() {
            let group = LocalProcessGroup {
                rank: rank as i32,
                size: num_ranks as i32,
                shared: Arc::clone(&shared),
                senders: senders.clone(),
                receiver,
            };
            let body = Arc::clone(&body);
            handles.push(std::thread::spawn(move || body(group)));
        }
        for h in handles {
            h.join().expect("rank thread panicked");
        }
    }

    fn reduce<T: Copy>(&self, buf: &Mutex<Vec<Option<T>>>, local: T, combine: impl FnOnce(&[T]) -> T) -> T {
        {
            let mut g = buf.lock().unwrap();
            g[self.rank as usize] = Some(local);
        }
        self.shared.barrier.wait();
        let result = {
            let g = buf.lock().unwrap();
            let values: Vec<T> = g.iter().map(|v| v.expect("every rank posts before the barrier releases")).collect();
            combine(&values)
        };
        self.shared.barrier.wait();
        {
            let mut g = buf.lock().unwrap();
            g[self.rank as usize] = None;
        }
        self.shared.barrier.wait();
        result
    }
}

impl ProcessGroup for LocalProcessGroup {
    fn rank(&self) -> i32 {
        self.rank
    }

    fn size(&self) -> i32 {
        self.size
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }

    fn all_reduce_and(&self, local: bool) -> bool {
        self.reduce(&self.shared.and_buf, local, |vals| vals.iter().all(|&v| v))
    }

    fn all_reduce_sum_usize(&self, local: usize) -> usize {
        self.reduce(&self.shared.sum_buf, local, |vals| vals.iter().sum())
    }

    fn exchange(&self, sends: &[(i32, Vec<u8>)]) -> Result<Vec<(i32, Vec<u8>)>, MpiError> {
        // synchronizes with every rank having fully drained the previous
        // round before any rank posts this round's sends.
        self.shared.barrier.wait();
        for (dst, bytes) in sends {
            if *dst < 0 || *dst >= self.size {
                return Err(MpiError::RankOutOfRange { rank: *dst, size: self.size });
            }
            self.senders[*dst as usize]
                .send((self.rank, bytes.clone()))
                .map_err(|_| MpiError::PeerUnreachable { rank: *dst })?;
        }
        self.shared.barrier.wait();
        let mut out = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            out.push(msg);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn barrier_releases_every_rank() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        LocalProcessGroup::run(4, move |group: LocalProcessGroup| {
            c.fetch_add(1, Ordering::SeqCst);
            group.barrier();
            assert_eq!(c.load(Ordering::SeqCst), 4);
        });
    }

    #[test]
    fn all_reduce_and_is_false_if_any_rank_disagrees() {
        LocalProcessGroup::run(3, |group: LocalProcessGroup| {
            let local = group.rank() != 1;
            let result = group.all_reduce_and(local);
            assert!(!result);
        });
    }

    #[test]
    fn all_reduce_and_true_when_unanimous() {
        LocalProcessGroup::run(3, |group: LocalProcessGroup| {
            let result = group.all_reduce_and(true);
            assert!(result);
        });
    }

    #[test]
    fn all_reduce_sum_adds_every_rank() {
        LocalProcessGroup::run(4, |group: LocalProcessGroup| {
            let result = group.all_reduce_sum_usize(1);
            assert_eq!(result, 4);
        });
    }

    #[test]
    fn exchange_delivers_point_to_point() {
        LocalProcessGroup::run(3, |group: LocalProcessGroup| {
            let next = (group.rank() + 1) % group.size();
            let payload = format!("from-{}", group.rank()).into_bytes();
            let received = group.exchange(&[(next, payload)]).unwrap();
            let prev = (group.rank() + group.size() - 1) % group.size();
            assert_eq!(received, vec![(prev, format!("from-{}", prev).into_bytes())]);
        });
    }

    #[test]
    fn exchange_rejects_out_of_range_destination() {
        // every rank hits the same invalid destination in the same round,
        // so none of them blocks waiting on a barrier the others never reach.
        LocalProcessGroup::run(2, |group: LocalProcessGroup| {
            let result = group.exchange(&[(99, vec![1, 2, 3])]);
            assert!(matches!(result, Err(MpiError::RankOutOfRange { rank: 99, size: 2 })));
        });
    }

    #[test]
    fn repeated_exchange_rounds_do_not_mix_messages() {
        LocalProcessGroup::run(2, |group: LocalProcessGroup| {
            let other = 1 - group.rank();
            for round in 0..5u8 {
                let received = group.exchange(&[(other, vec![round])]).unwrap();
                assert_eq!(received, vec![(other, vec![round])]);
            }
        });
    }
}
