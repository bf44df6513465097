use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use chip8_core::{Config, Display, Frontend, Interpreter, Key, SaveState};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless CHIP-8 runner: executes a ROM for a number of ticks and prints the final screen.
#[derive(Parser, Debug)]
#[command(name = "chip8", version)]
struct Args {
    /// ROM image to load at 0x200
    rom: PathBuf,

    /// Number of ticks (frames) to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Instructions executed per tick
    #[arg(long, default_value_t = Config::default().clock_rate)]
    clock_rate: u32,

    /// Keep executing after a draw instead of ending the tick early
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_vsync: bool,

    /// Wrap sprites around the screen edges
    #[arg(long, action = clap::ArgAction::SetTrue)]
    wrap: bool,

    /// PRNG seed; random when omitted
    #[arg(long)]
    seed: Option<u32>,

    /// Hex keys (0-f) held down for the whole run
    #[arg(long = "key", value_name = "KEY", value_parser = parse_key)]
    keys: Vec<Key>,

    /// Restore this save state (JSON) after loading the ROM
    #[arg(long, value_name = "PATH")]
    load_state: Option<PathBuf>,

    /// Write a save state (JSON) here when the run ends
    #[arg(long, value_name = "PATH")]
    save_state: Option<PathBuf>,

    /// Do not print the screen at the end
    #[arg(long, action = clap::ArgAction::SetTrue)]
    quiet: bool,
}

fn parse_key(s: &str) -> Result<Key, String> {
    let index = u8::from_str_radix(s, 16).map_err(|e| format!("{s:?} is not a hex digit: {e}"))?;
    Key::try_from(index).map_err(|e| e.to_string())
}

#[derive(Default)]
struct Stats {
    frames: u64,
    beeps: u64,
}

impl Frontend for Stats {
    fn frame_ready(&mut self, _display: &Display) {
        self.frames += 1;
    }

    fn sound_state_changed(&mut self, active: bool) {
        if active {
            self.beeps += 1;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let rom = fs::read(&args.rom).with_context(|| format!("reading {}", args.rom.display()))?;

    let mut chip8 = Interpreter::with_config(Config {
        clock_rate: args.clock_rate,
        vsync: !args.no_vsync,
        wrap: args.wrap,
    });
    chip8
        .load_program(&rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    match args.seed {
        Some(seed) => chip8.seed_rng(seed),
        None => chip8.seed_rng_from_entropy(),
    }

    if let Some(path) = &args.load_state {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let saved = SaveState::from_json(&json)?;
        chip8.load_state(&saved)?;
        info!(path = %path.display(), "restored save state");
    }

    for &key in &args.keys {
        chip8.set_key(key, true);
    }

    let mut stats = Stats::default();
    for _ in 0..args.ticks {
        chip8.tick_with(&mut stats);
        if chip8.fault().is_some() {
            break;
        }
    }

    info!(
        ticks = args.ticks,
        frames = stats.frames,
        beeps = stats.beeps,
        pc = chip8.registers().pc,
        "run finished"
    );

    if let Some(path) = &args.save_state {
        let json = chip8.save_state().to_json()?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote save state");
    }

    if !args.quiet {
        print!("{}", chip8.display().render_text());
    }

    if let Some(fault) = chip8.fault() {
        bail!("machine halted: {fault}");
    }
    Ok(())
}
