use sdl2::keyboard::Keycode;
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub a: String,
    pub b: String,
    pub start: String,
    pub select: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            up: Keycode::W.name(),
            down: Keycode::S.name(),
            left: Keycode::A.name(),
            right: Keycode::D.name(),
            a: Keycode::J.name(),
            b: Keycode::K.name(),
            start: Keycode::Return.name(),
            select: Keycode::T.name(),
        }
    }
}

impl std::fmt::Display for InputConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Up={}, Down={}, Left={}, Right={}, A={}, B={}, Start={}, Select={}",
            self.up, self.down, self.left, self.right, self.a, self.b, self.start, self.select
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    pub exit: Option<String>,
    pub save_and_exit: Option<String>,
    pub quick_save: Option<String>,
    pub quick_load: Option<String>,
    pub fast_forward: Option<String>,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            exit: Some(Keycode::Escape.name()),
            save_and_exit: Some(Keycode::P.name()),
            quick_save: Some(Keycode::Q.name()),
            quick_load: Some(Keycode::Y.name()),
            fast_forward: Some(Keycode::L.name()),
        }
    }
}

impl std::fmt::Display for HotkeyConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Exit={}, SaveAndExit={}, QuickSave={}, QuickLoad={}, FastForward={}",
            fmt_option(self.exit.as_ref()),
            fmt_option(self.save_and_exit.as_ref()),
            fmt_option(self.quick_save.as_ref()),
            fmt_option(self.quick_load.as_ref()),
            fmt_option(self.fast_forward.as_ref())
        )
    }
}

fn fmt_option<T: std::fmt::Display>(option: Option<&T>) -> String {
    match option {
        Some(value) => format!("{value}"),
        None => "<None>".into(),
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub rom_file_path: String,
    pub window_scale: u32,
    pub fast_forward_multiplier: u32,
    pub input_config: InputConfig,
    pub hotkey_config: HotkeyConfig,
}

impl std::fmt::Display for RunConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "rom_file_path: {}", self.rom_file_path)?;
        writeln!(f, "window_scale: {}", self.window_scale)?;
        writeln!(f, "fast_forward_multiplier: {}", self.fast_forward_multiplier)?;
        writeln!(f, "input_config: {}", self.input_config)?;
        writeln!(f, "hotkey_config: {}", self.hotkey_config)?;

        Ok(())
    }
}
