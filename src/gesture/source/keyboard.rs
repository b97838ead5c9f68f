use log::*;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use super::{FramePacer, GestureSource, Poll};
use crate::{Finger, GestureState};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyCommand {
    Toggle(Finger),
    /// The hand left the frame: every finger goes down.
    DropHand,
    Quit,
}

impl KeyCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "i" => Some(KeyCommand::Toggle(Finger::Index)),
            "m" => Some(KeyCommand::Toggle(Finger::Middle)),
            "p" => Some(KeyCommand::Toggle(Finger::Pinky)),
            "h" => Some(KeyCommand::DropHand),
            "q" => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

/// Simulates a hand from stdin, one command per line:
/// `i`/`m`/`p` toggle a finger, `h` drops the hand, `q` quits.
pub struct KeyboardGestureSource {
    receiver: Receiver<KeyCommand>,
    state: GestureState,
    pacer: FramePacer,
}

impl KeyboardGestureSource {
    pub fn new(frame_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        listen_to_stdin(sender);

        println!("Keyboard simulation: i/m/p toggle index/middle/pinky, h drops the hand, q quits");

        Self::from_receiver(receiver, frame_interval)
    }

    pub fn from_receiver(receiver: Receiver<KeyCommand>, frame_interval: Duration) -> Self {
        Self {
            receiver,
            state: GestureState::released(),
            pacer: FramePacer::new(frame_interval),
        }
    }
}

impl GestureSource for KeyboardGestureSource {
    fn poll(&mut self) -> Poll {
        self.pacer.wait();

        loop {
            match self.receiver.try_recv() {
                Ok(KeyCommand::Toggle(finger)) => self.state.toggle(finger),
                Ok(KeyCommand::DropHand) => self.state = GestureState::released(),
                Ok(KeyCommand::Quit) | Err(TryRecvError::Disconnected) => return Poll::Quit,
                Err(TryRecvError::Empty) => break,
            }
        }

        Poll::Frame(self.state)
    }
}

fn listen_to_stdin(sender: Sender<KeyCommand>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("Could not read stdin: {}", err);
                    break;
                }
            };
            match KeyCommand::parse(&line) {
                Some(command) => {
                    if sender.send(command).is_err() {
                        return;
                    }
                }
                None => debug!("Ignoring keyboard input {:?}", line),
            }
        }
    });
}
