use crate::config::{HotkeyConfig, InputConfig};
use crate::cpu::InterruptType;
use crate::memory::ioregisters::{IoRegister, IoRegisters};
use sdl2::keyboard::Keycode;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

#[derive(Error, Debug)]
pub enum KeyMapError {
    #[error("invalid keycode in input config: {keycode}")]
    InvalidKeycode { keycode: String },
    #[error("keycode used for multiple buttons: {keycode}")]
    DuplicateKeycode { keycode: String },
}

fn try_parse_keycode(s: &str) -> Result<Keycode, KeyMapError> {
    Keycode::from_name(s).ok_or_else(|| KeyMapError::InvalidKeycode { keycode: s.into() })
}

macro_rules! build_key_map {
    ($($config_field:expr => $button:expr),+$(,)?) => {
        {
            let mut map = HashMap::new();

            $(
                let keycode = try_parse_keycode(&$config_field)?;
                if map.insert(keycode, $button).is_some() {
                    return Err(KeyMapError::DuplicateKeycode { keycode: keycode.name() });
                }
            )*

            map
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyMap(HashMap<Keycode, Button>);

impl KeyMap {
    pub fn from_config(input_config: &InputConfig) -> Result<Self, KeyMapError> {
        let map = build_key_map!(
            input_config.up => Button::Up,
            input_config.down => Button::Down,
            input_config.left => Button::Left,
            input_config.right => Button::Right,
            input_config.a => Button::A,
            input_config.b => Button::B,
            input_config.start => Button::Start,
            input_config.select => Button::Select,
        );

        Ok(Self(map))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Exit,
    SaveAndExit,
    QuickSave,
    QuickLoad,
    FastForward,
}

macro_rules! build_hotkey_map {
    ($($config_field:expr => $hotkey:expr),+$(,)?) => {
        {
            let mut map = HashMap::new();

            $(
                if let Some(keycode) = $config_field.as_ref() {
                    let keycode = try_parse_keycode(keycode)?;
                    if map.insert(keycode, $hotkey).is_some() {
                        return Err(KeyMapError::DuplicateKeycode { keycode: keycode.name() });
                    }
                }
            )*

            map
        }
    }
}

#[derive(Debug, Clone)]
pub struct HotkeyMap(HashMap<Keycode, Hotkey>);

impl HotkeyMap {
    pub fn from_config(hotkey_config: &HotkeyConfig) -> Result<Self, KeyMapError> {
        let map = build_hotkey_map!(
            hotkey_config.exit => Hotkey::Exit,
            hotkey_config.save_and_exit => Hotkey::SaveAndExit,
            hotkey_config.quick_save => Hotkey::QuickSave,
            hotkey_config.quick_load => Hotkey::QuickLoad,
            hotkey_config.fast_forward => Hotkey::FastForward,
        );

        Ok(Self(map))
    }
}

#[derive(Debug, Clone)]
pub struct JoypadState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    a: bool,
    b: bool,
    start: bool,
    select: bool,
}

impl JoypadState {
    pub fn new() -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
            a: false,
            b: false,
            start: false,
            select: false,
        }
    }

    fn get_field_mut(&mut self, button: Option<Button>) -> Option<&mut bool> {
        match button {
            Some(Button::Up) => Some(&mut self.up),
            Some(Button::Down) => Some(&mut self.down),
            Some(Button::Left) => Some(&mut self.left),
            Some(Button::Right) => Some(&mut self.right),
            Some(Button::A) => Some(&mut self.a),
            Some(Button::B) => Some(&mut self.b),
            Some(Button::Start) => Some(&mut self.start),
            Some(Button::Select) => Some(&mut self.select),
            None => None,
        }
    }

    pub fn key_down(&mut self, keycode: Keycode, key_map: &KeyMap) {
        if let Some(field) = self.get_field_mut(key_map.0.get(&keycode).copied()) {
            *field = true;
        }
        log::debug!("Key pressed: {keycode}, current state: {self:?}");
    }

    pub fn key_up(&mut self, keycode: Keycode, key_map: &KeyMap) {
        if let Some(field) = self.get_field_mut(key_map.0.get(&keycode).copied()) {
            *field = false;
        }
        log::debug!("Key released: {keycode}, current state: {self:?}");
    }
}

fn should_flag_interrupt(old_joyp: u8, new_joyp: u8) -> bool {
    for bit in [0x01, 0x02, 0x04, 0x08] {
        if old_joyp & bit != 0 && new_joyp & bit == 0 {
            return true;
        }
    }
    false
}

/// Update the contents of the JOYP hardware register based on the current joypad state, and
/// request a joypad interrupt if any selected buttons have been pressed.
///
/// This needs to be called after every CPU instruction because the CPU can write to the JOYP
/// register to specify whether it wants to read directions or button presses, and the same
/// register bits are used for both.
pub fn update_joyp_register(joypad_state: &JoypadState, io_registers: &mut IoRegisters) {
    let joyp = io_registers.read_register(IoRegister::JOYP);
    let actions_select = joyp & 0x20 == 0;
    let directions_select = joyp & 0x10 == 0;

    let bit_3 =
        !((actions_select && joypad_state.start) || (directions_select && joypad_state.down));
    let bit_2 =
        !((actions_select && joypad_state.select) || (directions_select && joypad_state.up));
    let bit_1 = !((actions_select && joypad_state.b) || (directions_select && joypad_state.left));
    let bit_0 = !((actions_select && joypad_state.a) || (directions_select && joypad_state.right));

    let new_joyp = (joyp & 0x30)
        | (u8::from(bit_3) << 3)
        | (u8::from(bit_2) << 2)
        | (u8::from(bit_1) << 1)
        | u8::from(bit_0);
    io_registers.privileged_set_joyp(new_joyp);

    if should_flag_interrupt(joyp, new_joyp) {
        io_registers.interrupt_flags().set(InterruptType::Joypad);
    }
}

#[must_use]
pub fn check_for_hotkey(key_down: Keycode, hotkey_map: &HotkeyMap) -> Option<Hotkey> {
    hotkey_map.0.get(&key_down).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(joypad_state: &JoypadState, io_registers: &mut IoRegisters, select: u8) -> u8 {
        io_registers.write_register(IoRegister::JOYP, select);
        update_joyp_register(joypad_state, io_registers);
        io_registers.read_register(IoRegister::JOYP) & 0x0F
    }

    #[test]
    fn selected_row_appears_active_low() {
        let mut io_registers = IoRegisters::new();
        let mut joypad_state = JoypadState::new();

        joypad_state.right = true;
        joypad_state.start = true;

        // Bit 4 low selects directions: Right is bit 0
        assert_eq!(0x0E, pressed(&joypad_state, &mut io_registers, 0x20));

        // Bit 5 low selects actions: Start is bit 3
        assert_eq!(0x07, pressed(&joypad_state, &mut io_registers, 0x10));

        // Neither row selected: nothing reads pressed
        assert_eq!(0x0F, pressed(&joypad_state, &mut io_registers, 0x30));
    }

    #[test]
    fn button_press_raises_joypad_interrupt() {
        let mut io_registers = IoRegisters::new();
        let mut joypad_state = JoypadState::new();

        // Select the action row with nothing pressed
        io_registers.write_register(IoRegister::JOYP, 0x10);
        update_joyp_register(&joypad_state, &mut io_registers);
        assert!(!io_registers.interrupt_flags().get(InterruptType::Joypad));

        joypad_state.a = true;
        update_joyp_register(&joypad_state, &mut io_registers);
        assert!(io_registers.interrupt_flags().get(InterruptType::Joypad));
    }

    #[test]
    fn default_key_bindings_parse() {
        KeyMap::from_config(&InputConfig::default()).expect("default key map should be valid");
        HotkeyMap::from_config(&HotkeyConfig::default())
            .expect("default hotkey map should be valid");
    }
}
