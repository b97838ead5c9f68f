//! Turns per-frame finger states into chord on/off commands.
//!
//! A rising edge plays the finger's chord right away, on the frame thread.
//! A falling edge lets go of the chord's notes and hands a
//! [`PendingRelease`] to the [`ReleaseScheduler`] thread, which turns the
//! notes off once the sustain has passed, unless something reclaimed them
//! in the meantime.

mod active_notes;
mod release_scheduler;

pub use active_notes::{ActiveNotes, NoteClaim};
pub use release_scheduler::PendingRelease;

use release_scheduler::{ReleaseScheduler, SchedulerMessage};

use log::*;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;
use wmidi::Note;

use crate::{
    midi::{NoteOutputPort, VELOCITY},
    ChordMapping, Finger, GestureState,
};

pub struct ChordLifecycleController<TPort: NoteOutputPort + 'static> {
    mapping: ChordMapping,
    sustain: Duration,
    previous: GestureState,
    active_notes: Arc<Mutex<ActiveNotes<TPort>>>,
    scheduler: Option<(Sender<SchedulerMessage>, JoinHandle<()>)>,
}

impl<TPort: NoteOutputPort + 'static> ChordLifecycleController<TPort> {
    pub fn new(mapping: ChordMapping, sustain: Duration, port: TPort) -> Self {
        let active_notes = Arc::new(Mutex::new(ActiveNotes::new(port, VELOCITY)));
        let (release_scheduler, sender) = ReleaseScheduler::new(Arc::clone(&active_notes));
        let handle = release_scheduler.listen();

        Self {
            mapping,
            sustain,
            previous: GestureState::released(),
            active_notes,
            scheduler: Some((sender, handle)),
        }
    }

    /// Feeds one frame's gestures. Must be called once per frame, in order.
    pub fn update(&mut self, current: GestureState) {
        for finger in Finger::iter() {
            match (self.previous[finger], current[finger]) {
                (false, true) => self.play_chord(finger),
                (true, false) => self.schedule_release(finger),
                _ => (),
            }
        }
        self.previous = current;
    }

    fn play_chord(&self, finger: Finger) {
        debug!("{} up: playing {}", finger, self.mapping.name(finger));
        active_notes::lock(&self.active_notes).play_chord(finger, self.mapping.chord(finger));
    }

    fn schedule_release(&self, finger: Finger) {
        let claims =
            active_notes::lock(&self.active_notes).unhold_chord(finger, self.mapping.chord(finger));
        let release = PendingRelease {
            finger,
            deadline: Instant::now() + self.sustain,
            claims,
        };

        match &self.scheduler {
            Some((sender, _)) => {
                if sender.send(SchedulerMessage::Schedule(release)).is_err() {
                    warn!(
                        "Release scheduler is gone, {} will sound until shutdown",
                        self.mapping.name(finger)
                    );
                }
            }
            None => warn!("Release of {} after shutdown", self.mapping.name(finger)),
        }
    }

    pub fn active_notes(&self) -> Vec<Note> {
        active_notes::lock(&self.active_notes).sounding()
    }

    /// Fingers that were extended on the last frame.
    pub fn held_fingers(&self) -> Vec<Finger> {
        self.previous.extended_fingers().collect()
    }

    pub fn mapping(&self) -> &ChordMapping {
        &self.mapping
    }

    pub fn sustain(&self) -> Duration {
        self.sustain
    }

    /// Stops the release scheduler, dropping whatever it still had pending,
    /// and turns off every note that is still sounding.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some((sender, handle)) = self.scheduler.take() {
            // A send error means the thread already exited.
            let _ = sender.send(SchedulerMessage::Shutdown);
            if handle.join().is_err() {
                error!("Release scheduler panicked");
            }

            let mut active_notes = active_notes::lock(&self.active_notes);
            let remaining = active_notes.sounding().len();
            if remaining > 0 {
                info!("Flushing {} sounding notes", remaining);
            }
            active_notes.flush();
        }
    }
}

impl<TPort: NoteOutputPort + 'static> Drop for ChordLifecycleController<TPort> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    pub(crate) use super::active_notes::tests::{Command, FailingPort, RecordingPort};
    use super::*;
    use std::thread;

    const SUSTAIN: Duration = Duration::from_millis(500);

    fn controller() -> (ChordLifecycleController<RecordingPort>, RecordingPort) {
        let port = RecordingPort::default();
        let controller =
            ChordLifecycleController::new(ChordMapping::default(), SUSTAIN, port.clone());
        (controller, port)
    }

    fn frame(fingers: &[Finger]) -> GestureState {
        GestureState::from_fingers(fingers)
    }

    fn wait_past_sustain() {
        thread::sleep(SUSTAIN * 2);
    }

    fn ons(commands: &[Command]) -> Vec<u8> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::On(note) => Some(*note),
                _ => None,
            })
            .collect()
    }

    fn offs(commands: &[Command]) -> Vec<u8> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::Off(note) => Some(*note),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn press_then_release_after_sustain() {
        let (mut controller, port) = controller();

        controller.update(frame(&[Finger::Index]));
        assert_eq!(
            port.commands(),
            vec![Command::On(62), Command::On(66), Command::On(69)]
        );

        for _ in 0..48 {
            controller.update(frame(&[Finger::Index]));
        }
        assert_eq!(port.commands().len(), 3);

        controller.update(frame(&[]));
        assert!(offs(&port.commands()).is_empty());
        assert_eq!(controller.active_notes().len(), 3);

        wait_past_sustain();
        assert_eq!(
            port.commands()[3..],
            [Command::Off(62), Command::Off(66), Command::Off(69)]
        );
        assert!(controller.active_notes().is_empty());
    }

    #[test]
    fn update_does_not_wait_for_the_sustain() {
        let (mut controller, _port) = controller();
        controller.update(frame(&[Finger::Index]));

        let started = Instant::now();
        controller.update(frame(&[]));

        assert!(started.elapsed() < SUSTAIN);
    }

    #[test]
    fn one_note_on_per_held_run() {
        let (mut controller, port) = controller();

        for fingers in [
            &[Finger::Middle][..],
            &[Finger::Middle],
            &[Finger::Middle],
            &[],
            &[],
        ] {
            controller.update(frame(fingers));
        }
        wait_past_sustain();
        controller.update(frame(&[Finger::Middle]));
        controller.update(frame(&[Finger::Middle]));

        assert_eq!(ons(&port.commands()), vec![67, 71, 74, 67, 71, 74]);
        assert_eq!(offs(&port.commands()), vec![67, 71, 74]);
    }

    #[test]
    fn two_chords_without_shared_notes() {
        let (mut controller, port) = controller();

        controller.update(frame(&[Finger::Index, Finger::Middle]));

        assert_eq!(ons(&port.commands()), vec![62, 66, 69, 67, 71, 74]);
    }

    #[test]
    fn shared_note_survives_until_the_last_owner_releases() {
        let (mut controller, port) = controller();

        controller.update(frame(&[Finger::Index, Finger::Pinky]));
        assert_eq!(ons(&port.commands()), vec![62, 66, 69, 73, 76]);

        controller.update(frame(&[Finger::Pinky]));
        wait_past_sustain();
        assert_eq!(offs(&port.commands()), vec![62, 66]);
        assert!(controller.active_notes().contains(&Note::A4));

        controller.update(frame(&[]));
        thread::sleep(SUSTAIN / 3);
        assert_eq!(offs(&port.commands()).len(), 2);

        wait_past_sustain();
        assert_eq!(offs(&port.commands()), vec![62, 66, 69, 73, 76]);
    }

    #[test]
    fn staggered_release_of_a_shared_note_waits_for_the_later_one() {
        let (mut controller, port) = controller();
        controller.update(frame(&[Finger::Index, Finger::Pinky]));

        controller.update(frame(&[Finger::Pinky]));
        thread::sleep(SUSTAIN / 2);
        controller.update(frame(&[]));

        // Midway between the index and pinky deadlines. Pinky let go of A4 later.
        thread::sleep(SUSTAIN * 3 / 4);
        assert_eq!(offs(&port.commands()), vec![62, 66]);

        wait_past_sustain();
        assert_eq!(offs(&port.commands()), vec![62, 66, 69, 73, 76]);
    }

    #[test]
    fn repress_within_sustain_cancels_the_release() {
        let (mut controller, port) = controller();

        controller.update(frame(&[Finger::Index]));
        controller.update(frame(&[]));
        thread::sleep(SUSTAIN / 3);
        controller.update(frame(&[Finger::Index]));

        wait_past_sustain();

        assert_eq!(
            port.commands(),
            vec![Command::On(62), Command::On(66), Command::On(69)]
        );
        assert_eq!(controller.active_notes().len(), 3);
    }

    #[test]
    fn flicker_releases_after_the_last_retraction() {
        let (mut controller, port) = controller();

        controller.update(frame(&[Finger::Index]));
        controller.update(frame(&[]));
        thread::sleep(SUSTAIN / 4);
        controller.update(frame(&[Finger::Index]));
        thread::sleep(SUSTAIN / 4);
        controller.update(frame(&[]));

        // Midway between the first retraction's deadline and the second one's.
        thread::sleep(SUSTAIN * 3 / 4);
        assert!(offs(&port.commands()).is_empty());

        wait_past_sustain();
        assert_eq!(ons(&port.commands()), vec![62, 66, 69]);
        assert_eq!(offs(&port.commands()), vec![62, 66, 69]);
    }

    #[test]
    fn lost_hand_releases_held_chord() {
        let (mut controller, port) = controller();

        controller.update(frame(&[Finger::Pinky]));
        controller.update(crate::gesture::extract(None));
        assert!(controller.held_fingers().is_empty());

        wait_past_sustain();
        assert_eq!(offs(&port.commands()), vec![69, 73, 76]);
    }

    #[test]
    fn shutdown_flushes_sounding_notes() {
        let (mut controller, port) = controller();
        controller.update(frame(&[Finger::Index, Finger::Middle]));
        controller.update(frame(&[Finger::Middle]));

        controller.shutdown();

        let commands = port.commands();
        let mut turned_off = offs(&commands);
        turned_off.sort_unstable();
        assert_eq!(turned_off, vec![62, 66, 67, 69, 71, 74]);
    }

    #[test]
    fn drop_flushes_sounding_notes() {
        let (mut controller, port) = controller();
        controller.update(frame(&[Finger::Pinky]));

        drop(controller);

        assert_eq!(offs(&port.commands()), vec![69, 73, 76]);
    }

    #[test]
    fn device_errors_do_not_stop_processing() {
        let mut controller =
            ChordLifecycleController::new(ChordMapping::default(), SUSTAIN, FailingPort);

        controller.update(frame(&[Finger::Index]));
        assert_eq!(controller.active_notes().len(), 3);
        controller.update(frame(&[]));
        wait_past_sustain();
        assert!(controller.active_notes().is_empty());

        controller.update(frame(&[Finger::Middle]));
        controller.shutdown();
    }
}
