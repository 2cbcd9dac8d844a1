use crate::cpu::CpuRegisters;
use crate::memory::AddressSpace;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

// 64 KiB memory image + the 8 byte registers (A,B,C,D,E,F,H,L) + PC and SP as little-endian
// words
const SAVE_FILE_LEN: usize = 0x10000 + 8 + 4;

#[derive(Debug, Error)]
pub enum SaveFileError {
    #[error("error reading/writing save file: {source}")]
    FileSystem {
        #[from]
        source: io::Error,
    },
    #[error("save file is {actual} bytes, expected {expected}")]
    InvalidLength { actual: usize, expected: usize },
}

/// The quick-save file lives next to the ROM and is named `<rom-title>.gbsave`, falling back
/// to the ROM file stem when the cartridge header has no title.
pub fn determine_save_path(rom_file_path: &str, rom_title: &str) -> PathBuf {
    let rom_path = Path::new(rom_file_path);
    if rom_title.is_empty() {
        rom_path.with_extension("gbsave")
    } else {
        rom_path.with_file_name(format!("{rom_title}.gbsave"))
    }
}

/// Write the current emulation state to the given path.
pub fn save_state<P>(
    address_space: &AddressSpace,
    cpu_registers: &CpuRegisters,
    path: P,
) -> Result<(), SaveFileError>
where
    P: AsRef<Path>,
{
    let mut bytes = address_space.memory_image();
    bytes.extend_from_slice(&[
        cpu_registers.accumulator,
        cpu_registers.b,
        cpu_registers.c,
        cpu_registers.d,
        cpu_registers.e,
        cpu_registers.flags,
        cpu_registers.h,
        cpu_registers.l,
    ]);
    bytes.extend_from_slice(&cpu_registers.pc.to_le_bytes());
    bytes.extend_from_slice(&cpu_registers.sp.to_le_bytes());

    fs::write(path.as_ref(), bytes)?;

    log::info!("Successfully wrote save state to '{}'", path.as_ref().display());

    Ok(())
}

/// Restore emulation state from the given path. The file is read and validated in full
/// before any live state is touched, so a failed load leaves the emulation unchanged.
pub fn load_state<P>(
    address_space: &mut AddressSpace,
    cpu_registers: &mut CpuRegisters,
    path: P,
) -> Result<(), SaveFileError>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path.as_ref())?;
    if bytes.len() != SAVE_FILE_LEN {
        return Err(SaveFileError::InvalidLength {
            actual: bytes.len(),
            expected: SAVE_FILE_LEN,
        });
    }

    address_space.restore_memory_image(&bytes[..0x10000]);

    let registers = &bytes[0x10000..];
    cpu_registers.accumulator = registers[0];
    cpu_registers.b = registers[1];
    cpu_registers.c = registers[2];
    cpu_registers.d = registers[3];
    cpu_registers.e = registers[4];
    // Lower 4 bits of flags register are unused
    cpu_registers.flags = registers[5] & 0xF0;
    cpu_registers.h = registers[6];
    cpu_registers.l = registers[7];
    cpu_registers.pc = u16::from_le_bytes([registers[8], registers[9]]);
    cpu_registers.sp = u16::from_le_bytes([registers[10], registers[11]]);

    log::info!("Successfully loaded save state from '{}'", path.as_ref().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Cartridge;

    #[test]
    fn save_path_uses_cartridge_title() {
        assert_eq!(
            PathBuf::from("roms/TETRIS.gbsave"),
            determine_save_path("roms/tetris.gb", "TETRIS")
        );
        assert_eq!(
            PathBuf::from("roms/tetris.gbsave"),
            determine_save_path("roms/tetris.gb", "")
        );
    }

    #[test]
    fn save_then_load_is_identity() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());
        let mut cpu_registers = CpuRegisters::new();

        address_space.write_address_u8(0xC123, 0x9A);
        address_space.write_address_u8(0x8456, 0x3C);
        cpu_registers.accumulator = 0x42;
        cpu_registers.flags = 0x70;
        cpu_registers.pc = 0x1234;
        cpu_registers.sp = 0xCFFE;

        let path = std::env::temp_dir().join("pocketboy_serialize_test.gbsave");
        save_state(&address_space, &cpu_registers, &path).unwrap();

        let saved_image = address_space.memory_image();

        let mut restored_space = AddressSpace::new(Cartridge::new_test());
        let mut restored_registers = CpuRegisters::new();
        load_state(&mut restored_space, &mut restored_registers, &path).unwrap();

        assert_eq!(saved_image, restored_space.memory_image());
        assert_eq!(0x42, restored_registers.accumulator);
        assert_eq!(0x70, restored_registers.flags);
        assert_eq!(0x1234, restored_registers.pc);
        assert_eq!(0xCFFE, restored_registers.sp);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn load_rejects_truncated_file() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());
        let mut cpu_registers = CpuRegisters::new();

        address_space.write_address_u8(0xC000, 0x55);

        let path = std::env::temp_dir().join("pocketboy_serialize_truncated.gbsave");
        fs::write(&path, [0_u8; 100]).unwrap();

        assert!(matches!(
            load_state(&mut address_space, &mut cpu_registers, &path),
            Err(SaveFileError::InvalidLength { actual: 100, .. })
        ));

        // Live state is untouched by the failed load
        assert_eq!(0x55, address_space.read_address_u8(0xC000));

        fs::remove_file(&path).ok();
    }
}
