use log::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::active_notes::{self, ActiveNotes, NoteClaim};
use crate::{midi::NoteOutputPort, Finger};

/// A chord waiting out its sustain before its notes are released.
#[derive(Debug)]
pub struct PendingRelease {
    pub finger: Finger,
    pub deadline: Instant,
    pub claims: Vec<NoteClaim>,
}

#[derive(Debug)]
pub enum SchedulerMessage {
    Schedule(PendingRelease),
    Shutdown,
}

#[derive(Debug)]
struct Scheduled {
    sequence: u64,
    release: PendingRelease,
}

impl Scheduled {
    fn key(&self) -> (Instant, u64) {
        (self.release.deadline, self.sequence)
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Releases ordered by deadline, ties broken by scheduling order.
#[derive(Debug, Default)]
pub struct PendingReleases {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_sequence: u64,
}

impl PendingReleases {
    pub fn push(&mut self, release: PendingRelease) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Scheduled { sequence, release }));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap
            .peek()
            .map(|Reverse(scheduled)| scheduled.release.deadline)
    }

    pub fn pop_due(&mut self, now: Instant) -> Vec<PendingRelease> {
        let mut due = Vec::new();
        while self
            .next_deadline()
            .map_or(false, |deadline| deadline <= now)
        {
            if let Some(Reverse(scheduled)) = self.heap.pop() {
                due.push(scheduled.release);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Fires pending releases once their deadline passes, on a thread of its own.
pub struct ReleaseScheduler<TPort> {
    receiver: Receiver<SchedulerMessage>,
    active_notes: Arc<Mutex<ActiveNotes<TPort>>>,
    pending: PendingReleases,
}

impl<TPort: NoteOutputPort + 'static> ReleaseScheduler<TPort> {
    pub fn new(active_notes: Arc<Mutex<ActiveNotes<TPort>>>) -> (Self, Sender<SchedulerMessage>) {
        let (sender, receiver) = mpsc::channel();

        let release_scheduler = Self {
            receiver,
            active_notes,
            pending: PendingReleases::default(),
        };

        (release_scheduler, sender)
    }

    pub fn listen(mut self) -> JoinHandle<()> {
        thread::spawn(move || loop {
            let message = match self.pending.next_deadline() {
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match self.receiver.recv_timeout(timeout) {
                        Ok(message) => Some(message),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.receiver.recv() {
                    Ok(message) => Some(message),
                    Err(_) => break,
                },
            };

            match message {
                Some(SchedulerMessage::Schedule(release)) => {
                    debug!(
                        "Scheduled release of {} chord, {} pending",
                        release.finger,
                        self.pending.len() + 1
                    );
                    self.pending.push(release);
                }
                Some(SchedulerMessage::Shutdown) => {
                    debug!("Dropping {} pending releases", self.pending.len());
                    break;
                }
                None => (),
            }

            self.fire_due();
        })
    }

    fn fire_due(&mut self) {
        let due = self.pending.pop_due(Instant::now());
        if due.is_empty() {
            return;
        }

        let mut active_notes = active_notes::lock(&self.active_notes);
        for release in due {
            let released = active_notes.release(&release.claims);
            debug!(
                "Fired release of {} chord, {} of {} notes turned off",
                release.finger,
                released,
                release.claims.len()
            );
        }
    }
}
