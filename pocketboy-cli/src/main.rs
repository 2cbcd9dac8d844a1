use clap::Parser;
use pocketboy_core::{HotkeyConfig, InputConfig, RunConfig};
use std::error::Error;
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(about = "A Game Boy (DMG) emulator")]
struct Cli {
    /// Path to a Game Boy ROM image; prompted for on stdin if not given
    rom_file_path: Option<String>,
    #[arg(short = 's', long = "scale", default_value_t = 4)]
    window_scale: u32,
    #[arg(long = "fast-forward-multiplier", default_value_t = 32)]
    fast_forward_multiplier: u32,
}

fn prompt_for_rom_path() -> Result<String, io::Error> {
    print!("Path to ROM: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Cli::parse();

    let rom_file_path = match args.rom_file_path {
        Some(rom_file_path) => rom_file_path,
        None => prompt_for_rom_path()?,
    };

    let run_config = RunConfig {
        rom_file_path,
        window_scale: args.window_scale,
        fast_forward_multiplier: args.fast_forward_multiplier,
        input_config: InputConfig::default(),
        hotkey_config: HotkeyConfig::default(),
    };

    pocketboy_core::run(run_config)
}
