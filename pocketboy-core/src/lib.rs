mod config;
mod cpu;
mod eventloop;
mod graphics;
mod input;
mod memory;
mod ppu;
mod serialize;
mod startup;
mod timer;

use std::error::Error;

pub use config::{HotkeyConfig, InputConfig, RunConfig};

/// Load the ROM named in the config, power on the emulation core, and run it until the user
/// quits or an unrecoverable error occurs.
pub fn run(run_config: RunConfig) -> Result<(), Box<dyn Error>> {
    let emulation_state = startup::init_emulation_state(&run_config)?;
    let sdl_state = startup::init_sdl_state(&run_config)?;

    eventloop::run(emulation_state, sdl_state, &run_config)?;

    Ok(())
}
