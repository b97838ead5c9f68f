use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Midi {
    /// Output port to connect to. The first available port is used when unset.
    #[serde(default)]
    pub port: Option<String>,
    /// Create a virtual output port instead of connecting to an existing one.
    #[serde(default)]
    pub virtual_port: bool,
    /// General MIDI program selected on channel 1 once connected.
    /// 0 is Acoustic Grand Piano.
    #[serde(default)]
    pub program: u8,
}
