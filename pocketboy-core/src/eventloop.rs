use crate::config::RunConfig;
use crate::graphics::{GbFrameTexture, GraphicsError};
use crate::input::{Hotkey, HotkeyMap, JoypadState, KeyMap, KeyMapError};
use crate::startup::{EmulationState, SdlState};
use crate::timer::TimerCounter;
use crate::{cpu, graphics, input, serialize, timer};
use sdl2::event::Event;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("rendering error: {source}")]
    Rendering {
        #[from]
        source: GraphicsError,
    },
    #[error("error processing input config: {source}")]
    InputConfig {
        #[from]
        source: KeyMapError,
    },
}

const CYCLES_PER_FRAME: u64 = 4 * 1024 * 1024 / 60;

// One 70224-cycle frame at 4.194304 MHz
const FRAME_DURATION: Duration = Duration::from_nanos(16_742_706);

/// Start and run the emulator until it terminates, either by closing it or due to an error.
pub fn run(
    emulation_state: EmulationState,
    sdl_state: SdlState,
    run_config: &RunConfig,
) -> Result<(), RunError> {
    log::info!("Running with config:\n{run_config}");

    let EmulationState { mut address_space, mut cpu_registers, mut ppu_state } = emulation_state;

    // Don't need explicit handles to the other subsystems because they won't be dropped until
    // the function returns
    let SdlState { mut canvas, mut event_pump, .. } = sdl_state;

    let texture_creator = canvas.texture_creator();
    let mut texture = GbFrameTexture::create(&texture_creator)?;

    let mut joypad_state = JoypadState::new();
    let mut timer_counter = TimerCounter::new();

    let key_map = KeyMap::from_config(&run_config.input_config)?;
    let hotkey_map = HotkeyMap::from_config(&run_config.hotkey_config)?;

    let save_path =
        serialize::determine_save_path(&run_config.rom_file_path, address_space.cartridge_title());

    let mut fast_forwarding = false;

    let mut total_cycles = 0_u64;
    let mut total_rendered_frames = 0_u64;
    let mut next_frame_time = Instant::now();

    loop {
        input::update_joyp_register(&joypad_state, address_space.get_io_registers_mut());

        // Read TMA before executing anything in case the instruction updates the register
        let timer_modulo = timer::read_timer_modulo(address_space.get_io_registers());

        let tick_cycles = cpu::tick_cpu(&mut address_space, &mut cpu_registers);

        ppu_state.tick(tick_cycles, &mut address_space);

        timer::update_timer_registers(
            address_space.get_io_registers_mut(),
            &mut timer_counter,
            timer_modulo,
            tick_cycles.into(),
        );

        // The PPU latches frame_ready when it enters VBlank; presentation and pacing are the
        // host's job. Fast-forward shortens the frame delay and skips every other render.
        if ppu_state.frame_ready() {
            ppu_state.clear_frame_ready();

            if !fast_forwarding || total_rendered_frames % 2 == 0 {
                graphics::render_frame(ppu_state.frame_buffer(), &mut canvas, &mut texture)?;
            }
            total_rendered_frames += 1;

            let frame_duration = if fast_forwarding {
                FRAME_DURATION / run_config.fast_forward_multiplier
            } else {
                FRAME_DURATION
            };
            next_frame_time += frame_duration;

            let now = Instant::now();
            if next_frame_time > now {
                thread::sleep(next_frame_time - now);
            } else {
                next_frame_time = now;
            }
        }

        // Process SDL events roughly once per frametime
        if total_cycles / CYCLES_PER_FRAME
            != (total_cycles + u64::from(tick_cycles)) / CYCLES_PER_FRAME
        {
            for event in event_pump.poll_iter() {
                log::debug!("Received SDL event: {event:?}");
                match event {
                    Event::Quit { .. } => {
                        return Ok(());
                    }
                    Event::KeyDown { keycode: Some(keycode), .. } => {
                        joypad_state.key_down(keycode, &key_map);

                        match input::check_for_hotkey(keycode, &hotkey_map) {
                            Some(Hotkey::Exit) => {
                                return Ok(());
                            }
                            Some(Hotkey::SaveAndExit) => {
                                if let Err(err) =
                                    serialize::save_state(&address_space, &cpu_registers, &save_path)
                                {
                                    log::error!("error saving state on exit: {err}");
                                }
                                return Ok(());
                            }
                            Some(Hotkey::QuickSave) => {
                                if let Err(err) =
                                    serialize::save_state(&address_space, &cpu_registers, &save_path)
                                {
                                    log::error!("error saving state: {err}");
                                }
                            }
                            Some(Hotkey::QuickLoad) => {
                                if let Err(err) = serialize::load_state(
                                    &mut address_space,
                                    &mut cpu_registers,
                                    &save_path,
                                ) {
                                    log::error!("error loading save state: {err}");
                                }
                            }
                            Some(Hotkey::FastForward) => {
                                fast_forwarding = !fast_forwarding;
                                log::info!(
                                    "Fast-forward {}",
                                    if fast_forwarding { "enabled" } else { "disabled" }
                                );
                            }
                            None => {}
                        }
                    }
                    Event::KeyUp { keycode: Some(keycode), .. } => {
                        joypad_state.key_up(keycode, &key_map);
                    }
                    _ => {}
                }
            }
        }
        total_cycles += u64::from(tick_cycles);
    }
}
