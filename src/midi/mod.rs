use crate::{config::midi::Midi, Result};
use anyhow::anyhow;
use log::*;
use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};
use wmidi::{Channel, MidiMessage, Note, ProgramNumber, Velocity};

const CLIENT_NAME: &str = "Air piano";
const CHANNEL: Channel = Channel::Ch1;

/// Velocity used for every note-on and note-off.
pub const VELOCITY: u8 = 127;

/// Anything that accepts note commands.
pub trait NoteOutputPort: Send {
    fn note_on(&mut self, note: Note, velocity: u8) -> Result<()>;

    fn note_off(&mut self, note: Note, velocity: u8) -> Result<()>;
}

impl<TPort: NoteOutputPort + ?Sized> NoteOutputPort for Box<TPort> {
    fn note_on(&mut self, note: Note, velocity: u8) -> Result<()> {
        (**self).note_on(note, velocity)
    }

    fn note_off(&mut self, note: Note, velocity: u8) -> Result<()> {
        (**self).note_off(note, velocity)
    }
}

/// A [`NoteOutputPort`] backed by a `midir` connection.
pub struct MidiNotePort {
    output: MidiOutputConnection,
}

impl MidiNotePort {
    pub fn new(output: MidiOutputConnection) -> Self {
        Self { output }
    }

    /// Connects to the configured output and selects its program.
    pub fn open(config: &Midi) -> Result<Self> {
        let select_program = program_change(config.program)?;
        let mut port = Self::new(connect(config)?);

        info!("MIDI program: {}", config.program);
        if let Err(err) = port.send_midi_message(select_program) {
            warn!("program change {} failed: {:#}", config.program, err);
        }

        Ok(port)
    }

    fn send_midi_message(&mut self, midi_message: MidiMessage) -> Result<()> {
        self.output.send(&encode(&midi_message)?)?;
        Ok(())
    }
}

fn connect(config: &Midi) -> Result<MidiOutputConnection> {
    let midi_output = midi_output()?;

    if config.virtual_port {
        info!("MIDI output: virtual port '{}'", CLIENT_NAME);
        return connect_virtual(midi_output);
    }

    let port = port(&midi_output, config.port.as_deref())?;
    let port_name = midi_output.port_name(&port)?;
    info!("MIDI output: {}", port_name);

    midi_output
        .connect(&port, CLIENT_NAME)
        .map_err(|err| anyhow!("Could not connect to MIDI port '{}': {}", port_name, err))
}

fn program_change(program: u8) -> Result<MidiMessage<'static>> {
    let program = ProgramNumber::try_from(program)
        .map_err(|_| anyhow!("MIDI program must be between 0 and 127, got {}", program))?;
    Ok(MidiMessage::ProgramChange(CHANNEL, program))
}

fn encode(midi_message: &MidiMessage) -> Result<Vec<u8>> {
    let mut bytes_buffer = vec![0; midi_message.bytes_size()];
    midi_message
        .copy_to_slice(&mut bytes_buffer)
        .map_err(|err| anyhow!("Could not encode {:?}: {:?}", midi_message, err))?;
    Ok(bytes_buffer)
}

impl NoteOutputPort for MidiNotePort {
    fn note_on(&mut self, note: Note, velocity: u8) -> Result<()> {
        self.send_midi_message(MidiMessage::NoteOn(
            CHANNEL,
            note,
            Velocity::from_u8_lossy(velocity),
        ))
    }

    fn note_off(&mut self, note: Note, velocity: u8) -> Result<()> {
        self.send_midi_message(MidiMessage::NoteOff(
            CHANNEL,
            note,
            Velocity::from_u8_lossy(velocity),
        ))
    }
}

pub fn port_names() -> Result<Vec<String>> {
    let midi_output = midi_output()?;
    midi_output
        .ports()
        .iter()
        .map(|port| midi_output.port_name(port).map_err(|err| err.into()))
        .collect()
}

fn midi_output() -> Result<MidiOutput> {
    Ok(MidiOutput::new(CLIENT_NAME)?)
}

fn port(midi_output: &MidiOutput, name: Option<&str>) -> Result<MidiOutputPort> {
    let ports = midi_output.ports();

    let found = match name {
        Some(name) => ports
            .into_iter()
            .find(|port| midi_output.port_name(port).map_or(false, |n| n == name)),
        None => ports.into_iter().next(),
    };

    found.ok_or_else(|| {
        let names = port_names().unwrap_or_default();
        match name {
            Some(name) => anyhow!(
                "Could not find a MIDI port with name '{}'. Available ports are:\n{}",
                name,
                names.join("\n")
            ),
            None => anyhow!("No MIDI output ports are available"),
        }
    })
}

#[cfg(unix)]
fn connect_virtual(midi_output: MidiOutput) -> Result<MidiOutputConnection> {
    use midir::os::unix::VirtualOutput;

    midi_output
        .create_virtual(CLIENT_NAME)
        .map_err(|err| anyhow!("Could not create virtual MIDI port: {}", err))
}

#[cfg(not(unix))]
fn connect_virtual(_midi_output: MidiOutput) -> Result<MidiOutputConnection> {
    Err(anyhow!("Virtual MIDI ports are only supported on unix"))
}
