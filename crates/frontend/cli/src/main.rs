use anyhow::{Context, Result};
use clap::Parser;
use gg_core::types::Frame;
use gg_gamegear::vdp::{SCREEN_HEIGHT, SCREEN_WIDTH};
use gg_gamegear::GameGear;
use std::cell::RefCell;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::rc::Rc;

/// Headless Game Gear runner
#[derive(Parser)]
struct Args {
    /// Path to a Game Gear ROM image (raw, multiple of 16 KiB)
    rom: String,

    /// Number of frames to run before powering off (0 = run until a fault
    /// or an external power-off)
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Dump a save-state snapshot to this file as JSON
    #[arg(long)]
    save: Option<String>,

    /// Print a per-frame pixel digest
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM file '{}'", args.rom))?;

    let display = Rc::new(RefCell::new(Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT)));
    let mut gg = GameGear::new();
    gg.mount_cartridge(&rom);
    gg.attach_display(Rc::clone(&display));
    gg.power_on();

    let target = args.frames;
    let debug = args.debug;
    let frame_display = Rc::clone(&display);
    let mut count = 0u32;
    gg.attach_callback(Box::new(move |gg| {
        count += 1;
        // No audio sink here; drain so the PSG buffer stays bounded
        let _ = gg.take_audio_samples();
        if debug {
            let frame = frame_display.borrow();
            let digest = frame.pixels.iter().fold(0u32, |acc, p| acc.wrapping_mul(31) ^ p);
            println!(
                "Frame {}: {}x{} digest {:08X}",
                count, frame.width, frame.height, digest
            );
        }
        if target != 0 && count >= target {
            gg.power_off();
        }
    }));

    gg.run();

    if let Some(path) = &args.save {
        let state = gg.save_state();
        let mut f = File::create(path)
            .with_context(|| format!("failed to create save-state file '{}'", path))?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
    }

    if let Some(fault) = gg.fault() {
        log::error!("caught exception: {}", fault);
        anyhow::bail!("emulation stopped on a CPU fault: {}", fault);
    }

    Ok(())
}
