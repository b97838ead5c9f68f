use log::*;

use crate::{
    gesture::source::{GestureSource, Poll},
    midi::NoteOutputPort,
    ChordLifecycleController, ChordMapping, GestureState,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub dropped: u64,
}

/// Pulls frames from a source and feeds them to the controller until the
/// source asks to quit.
pub struct FrameLoop<TSource, TPort: NoteOutputPort + 'static> {
    source: TSource,
    controller: ChordLifecycleController<TPort>,
}

impl<TSource: GestureSource, TPort: NoteOutputPort + 'static> FrameLoop<TSource, TPort> {
    pub fn new(source: TSource, controller: ChordLifecycleController<TPort>) -> Self {
        Self { source, controller }
    }

    pub fn run(mut self) -> FrameStats {
        let mut stats = FrameStats::default();
        let mut shown = GestureState::released();

        info!("{}", status_line(self.controller.mapping(), &shown));

        loop {
            match self.source.poll() {
                Poll::Frame(gestures) => {
                    stats.frames += 1;
                    self.controller.update(gestures);
                    if gestures != shown {
                        shown = gestures;
                        info!("{}", status_line(self.controller.mapping(), &shown));
                    }
                }
                Poll::Unavailable => {
                    stats.dropped += 1;
                    debug!("No frame from the camera, skipping");
                }
                Poll::Quit => break,
            }
        }

        self.controller.shutdown();
        info!(
            "Processed {} frames, {} dropped",
            stats.frames, stats.dropped
        );

        stats
    }
}

/// Text overlay describing which chords are held.
pub fn status_line(mapping: &ChordMapping, gestures: &GestureState) -> String {
    let held: Vec<_> = gestures
        .extended_fingers()
        .map(|finger| format!("{} ({})", mapping.name(finger), finger.color()))
        .collect();

    if held.is_empty() {
        "Air Piano | no chords held".into()
    } else {
        format!("Air Piano | {}", held.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord_lifecycle::tests::{Command, RecordingPort};
    use crate::gesture::source::ScriptedGestureSource;
    use crate::Finger;
    use std::time::Duration;

    fn run(polls: Vec<Poll>) -> (FrameStats, Vec<Command>) {
        let port = RecordingPort::default();
        let controller = ChordLifecycleController::new(
            ChordMapping::default(),
            Duration::from_secs(60),
            port.clone(),
        );
        let source = ScriptedGestureSource::new(polls, Duration::ZERO);

        let stats = FrameLoop::new(source, controller).run();

        (stats, port.commands())
    }

    #[test]
    fn counts_frames_and_flushes_on_quit() {
        let index = Poll::Frame(GestureState::from_fingers(&[Finger::Index]));

        let (stats, commands) = run(vec![index, Poll::Unavailable, index, index]);

        assert_eq!(stats, FrameStats { frames: 3, dropped: 1 });
        assert_eq!(
            commands,
            vec![
                Command::On(62),
                Command::On(66),
                Command::On(69),
                Command::Off(62),
                Command::Off(66),
                Command::Off(69)
            ]
        );
    }

    #[test]
    fn dropped_frames_are_not_release_edges() {
        let pinky = Poll::Frame(GestureState::from_fingers(&[Finger::Pinky]));

        let (_, commands) = run(vec![pinky, Poll::Unavailable, Poll::Unavailable, pinky]);

        assert_eq!(
            commands,
            vec![
                Command::On(69),
                Command::On(73),
                Command::On(76),
                Command::Off(69),
                Command::Off(73),
                Command::Off(76)
            ]
        );
    }

    #[test]
    fn status_line_names_held_chords() {
        let mapping = ChordMapping::default();

        assert_eq!(
            status_line(&mapping, &GestureState::from_fingers(&[Finger::Index, Finger::Pinky])),
            "Air Piano | D Major (green), A Major (cyan)"
        );
        assert_eq!(
            status_line(&mapping, &GestureState::released()),
            "Air Piano | no chords held"
        );
    }
}
