use air_piano::{
    config::Source, midi, midi::MidiNotePort, ChordLifecycleController, ChordMapping, Config,
    FrameLoop, GestureSource, KeyboardGestureSource, Result, ScriptedGestureSource,
};
use log::*;
use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{:#}", err);
        eprintln!("air-piano: {:#}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--list-ports") {
        for name in midi::port_names()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = match args.first() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mapping = ChordMapping::from_config(&config.chords)?;
    for (finger, mapped) in mapping.iter() {
        info!("{}: {} [{}]", finger, mapped.name, mapped.chord);
    }

    let port = MidiNotePort::open(&config.midi)?;

    let source: Box<dyn GestureSource> = match &config.source {
        Source::Keyboard => Box::new(KeyboardGestureSource::new(config.frame_interval())),
        Source::Script(path) => Box::new(ScriptedGestureSource::load(path)?),
    };

    let controller = ChordLifecycleController::new(mapping, config.sustain(), port);
    info!("Sustain: {:?}", controller.sustain());

    FrameLoop::new(source, controller).run();

    Ok(())
}
