pub mod address;
pub mod ioregisters;
mod mapper;

use crate::memory::ioregisters::IoRegisters;
use crate::memory::mapper::{Mapper, RamMapResult};
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

// The 48 logo bytes every licensed cartridge carries at 0x0104; the boot ROM refuses to start
// a cartridge without them, and so does this emulator.
const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00,
    0x0D, 0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD,
    0xD9, 0x99, 0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB,
    0xB9, 0x33, 0x3E,
];

#[derive(Error, Debug)]
pub enum CartridgeLoadError {
    #[error("header should be at least 336 bytes, was {header_len} bytes")]
    HeaderTooShort { header_len: usize },
    #[error("cartridge logo bytes at 0x0104-0x0133 do not match the expected bitmap")]
    InvalidLogo,
    #[error("header checksum mismatch: computed {computed:02X}, header says {stored:02X}")]
    HeaderChecksum { computed: u8, stored: u8 },
    #[error("invalid or unsupported mapper byte in cartridge header: {mapper_byte:02X}")]
    InvalidMapper { mapper_byte: u8 },
    #[error("invalid RAM size code, expected 0 or 2-5: {ram_size_code}")]
    InvalidRamSize { ram_size_code: u8 },
    #[error("error reading data from {file_path}: {source}")]
    FileReadError {
        file_path: String,
        #[source]
        source: io::Error,
    },
}

fn header_checksum(rom: &[u8]) -> u8 {
    rom[address::TITLE_START as usize..address::HEADER_CHECKSUM as usize]
        .iter()
        .fold(0_u8, |checksum, &byte| checksum.wrapping_sub(byte).wrapping_sub(1))
}

pub struct Cartridge {
    rom: Vec<u8>,
    mapper: Mapper,
    ram: Vec<u8>,
    title: String,
}

impl Cartridge {
    /// Create a new Cartridge value from the given ROM.
    ///
    /// # `CartridgeLoadError`
    ///
    /// This function will return an error in the following scenarios:
    /// * The ROM is too short (must be at least 0x150 bytes)
    /// * The Nintendo logo bytes at 0x0104-0x0133 are wrong
    /// * The header checksum at 0x014D does not match the header contents
    /// * The mapper byte in the cartridge header is invalid (or not implemented)
    /// * The RAM size byte in the cartridge header is invalid
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeLoadError> {
        log::info!("Initializing cartridge using {} bytes of data", rom.len());

        if rom.len() < 0x0150 {
            return Err(CartridgeLoadError::HeaderTooShort { header_len: rom.len() });
        }

        if rom[address::LOGO_START as usize..=address::LOGO_END as usize] != NINTENDO_LOGO {
            return Err(CartridgeLoadError::InvalidLogo);
        }

        let computed = header_checksum(&rom);
        let stored = rom[address::HEADER_CHECKSUM as usize];
        if computed != stored {
            return Err(CartridgeLoadError::HeaderChecksum { computed, stored });
        }

        let mapper_byte = rom[address::MAPPER as usize];
        let Some((mapper_type, mapper_features)) = mapper::parse_byte(mapper_byte) else {
            return Err(CartridgeLoadError::InvalidMapper { mapper_byte });
        };

        log::info!("Detected mapper type {mapper_type:?} (byte: {mapper_byte:02X})");
        log::info!("Mapper features: {mapper_features}");

        let ram_size: usize = if mapper_type == mapper::MapperType::MBC2 {
            // MBC2 carries its 512-byte RAM on the mapper chip; the header size code is 0
            512
        } else if mapper_features.has_ram {
            let ram_size_code = rom[address::RAM_SIZE as usize];
            match ram_size_code {
                0x00 => 0,
                0x02 => 8192,   // 8 KB
                0x03 => 32768,  // 32 KB
                0x04 => 131072, // 128 KB
                0x05 => 65536,  // 64 KB
                _ => return Err(CartridgeLoadError::InvalidRamSize { ram_size_code }),
            }
        } else {
            0
        };

        let title: String = rom[address::TITLE_START as usize..=address::TITLE_END as usize]
            .iter()
            .copied()
            .take_while(|&byte| byte != 0)
            .map(char::from)
            .collect();

        log::info!("Cartridge title: '{title}'");
        log::info!("Cartridge has {ram_size} bytes of external RAM");

        let mapper = Mapper::new(mapper_type, rom.len() as u32, ram_size as u32);

        Ok(Self { rom, mapper, ram: vec![0; ram_size], title })
    }

    pub fn from_file(file_path: &str) -> Result<Self, CartridgeLoadError> {
        log::info!("Loading cartridge from '{file_path}'");

        let rom = fs::read(Path::new(file_path)).map_err(|err| {
            CartridgeLoadError::FileReadError { file_path: file_path.into(), source: err }
        })?;

        Self::new(rom)
    }

    /// The ROM title from the cartridge header, used to name the save file.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Read a value from the given ROM address. Returns 0xFF if the mapped address falls
    /// outside the ROM image.
    pub fn read_rom_address(&self, address: u16) -> u8 {
        let mapped_address = self.mapper.map_rom_address(address);
        self.rom.get(mapped_address as usize).copied().unwrap_or(0xFF)
    }

    /// Write a value to the given ROM address (or in reality, set a cartridge register).
    pub fn write_rom_address(&mut self, address: u16, value: u8) {
        self.mapper.write_rom_address(address, value);
    }

    /// Read a value from the given cartridge RAM address. Returns 0xFF if the address is not
    /// valid or RAM is disabled.
    pub fn read_ram_address(&self, address: u16) -> u8 {
        match self.mapper.map_ram_address(address) {
            RamMapResult::RamAddress(mapped_address) => {
                self.ram.get(mapped_address as usize).copied().unwrap_or(0xFF)
            }
            RamMapResult::None => 0xFF,
        }
    }

    /// Write a value to the given cartridge RAM address. Does nothing if the address is not
    /// valid or RAM is disabled.
    pub fn write_ram_address(&mut self, address: u16, value: u8) {
        if let RamMapResult::RamAddress(mapped_address) = self.mapper.map_ram_address(address) {
            if let Some(ram_value) = self.ram.get_mut(mapped_address as usize) {
                *ram_value = value;
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn stamp_test_header(rom: &mut [u8]) {
    rom[address::LOGO_START as usize..=address::LOGO_END as usize]
        .copy_from_slice(&NINTENDO_LOGO);
    rom[address::HEADER_CHECKSUM as usize] = header_checksum(rom);
}

#[cfg(test)]
impl Cartridge {
    pub(crate) fn new_test() -> Self {
        let mut rom = vec![0; 0x8000];
        stamp_test_header(&mut rom);
        Self::new(rom).expect("synthesized test ROM should be valid")
    }
}

pub struct AddressSpace {
    cartridge: Cartridge,
    vram: [u8; 8192],
    working_ram: [u8; 8192],
    oam: [u8; 160],
    io_registers: IoRegisters,
    hram: [u8; 127],
    ie_register: u8,
}

impl AddressSpace {
    /// Create a powered-on address space around the given cartridge. Work RAM and VRAM start
    /// zeroed, a documented deviation from the indeterminate state of real hardware.
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            cartridge,
            vram: [0; 8192],
            working_ram: [0; 8192],
            oam: [0; 160],
            io_registers: IoRegisters::new(),
            hram: [0; 127],
            ie_register: 0,
        }
    }

    /// Read the value at the given address.
    pub fn read_address_u8(&self, address: u16) -> u8 {
        match address {
            address @ address::ROM_START..=address::ROM_END => {
                self.cartridge.read_rom_address(address)
            }
            address @ address::VRAM_START..=address::VRAM_END => {
                self.vram[(address - address::VRAM_START) as usize]
            }
            address @ address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END => {
                self.cartridge.read_ram_address(address)
            }
            address @ address::WORKING_RAM_START..=address::WORKING_RAM_END => {
                self.working_ram[(address - address::WORKING_RAM_START) as usize]
            }
            address @ address::ECHO_RAM_START..=address::ECHO_RAM_END => {
                self.working_ram[(address - address::ECHO_RAM_START) as usize]
            }
            address @ address::OAM_START..=address::OAM_END => {
                self.oam[(address - address::OAM_START) as usize]
            }
            _address @ address::UNUSABLE_START..=address::UNUSABLE_END => 0xFF,
            address @ address::IO_REGISTERS_START..=address::IO_REGISTERS_END => {
                self.io_registers.read_address(address)
            }
            address @ address::HRAM_START..=address::HRAM_END => {
                self.hram[(address - address::HRAM_START) as usize]
            }
            address::IE_REGISTER => self.ie_register,
        }
    }

    /// Read the value at the given address and the following address as a little-endian
    /// 16-bit value.
    pub fn read_address_u16(&self, address: u16) -> u16 {
        let lsb = self.read_address_u8(address);
        let msb = self.read_address_u8(address.wrapping_add(1));
        u16::from_le_bytes([lsb, msb])
    }

    /// Assign a value to the given address. Writes into the cartridge address ranges are
    /// forwarded to the mapper, and a write to the DMA register performs the OAM DMA burst
    /// before this method returns.
    pub fn write_address_u8(&mut self, address: u16, value: u8) {
        match address {
            address @ address::ROM_START..=address::ROM_END => {
                self.cartridge.write_rom_address(address, value);
            }
            address @ address::VRAM_START..=address::VRAM_END => {
                self.vram[(address - address::VRAM_START) as usize] = value;
            }
            address @ address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END => {
                self.cartridge.write_ram_address(address, value);
            }
            address @ address::WORKING_RAM_START..=address::WORKING_RAM_END => {
                self.working_ram[(address - address::WORKING_RAM_START) as usize] = value;
            }
            address @ address::ECHO_RAM_START..=address::ECHO_RAM_END => {
                self.working_ram[(address - address::ECHO_RAM_START) as usize] = value;
            }
            address @ address::OAM_START..=address::OAM_END => {
                self.oam[(address - address::OAM_START) as usize] = value;
            }
            _address @ address::UNUSABLE_START..=address::UNUSABLE_END => {}
            address @ address::IO_REGISTERS_START..=address::IO_REGISTERS_END => {
                self.io_registers.write_address(address, value);
                if let Some(source_page) = self.io_registers.take_dma_request() {
                    self.run_oam_dma(source_page);
                }
            }
            address @ address::HRAM_START..=address::HRAM_END => {
                self.hram[(address - address::HRAM_START) as usize] = value;
            }
            address::IE_REGISTER => {
                self.ie_register = value;
            }
        }
    }

    /// Assign a 16-bit value to the given address and the following address, using
    /// little-endian.
    pub fn write_address_u16(&mut self, address: u16, value: u16) {
        let [lsb, msb] = value.to_le_bytes();
        self.write_address_u8(address, lsb);
        self.write_address_u8(address.wrapping_add(1), msb);
    }

    // Copy 0xA0 bytes from the source page into OAM as a single atomic burst.
    fn run_oam_dma(&mut self, source_page: u8) {
        log::trace!("OAM DMA transfer from page {source_page:02X}");
        let source_base = u16::from(source_page) << 8;
        for offset in 0..0xA0 {
            self.oam[offset as usize] = self.read_address_u8(source_base + offset);
        }
    }

    pub fn get_io_registers(&self) -> &IoRegisters {
        &self.io_registers
    }

    pub fn get_io_registers_mut(&mut self) -> &mut IoRegisters {
        &mut self.io_registers
    }

    /// Retrieve the current value of the IE register (interrupts enabled).
    pub fn get_ie_register(&self) -> u8 {
        self.ie_register
    }

    pub fn cartridge_title(&self) -> &str {
        self.cartridge.title()
    }

    /// Produce the full 64 KiB bus view, as seen through `read_address_u8`.
    pub fn memory_image(&self) -> Vec<u8> {
        (0..=0xFFFF).map(|address| self.read_address_u8(address as u16)).collect()
    }

    /// Restore RAM regions, I/O registers, and IE from a 64 KiB memory image. The ROM region
    /// is skipped (the cartridge already holds it) and I/O bytes are restored without
    /// triggering any write side effects.
    pub fn restore_memory_image(&mut self, image: &[u8]) {
        assert_eq!(image.len(), 0x10000, "memory image must be exactly 64 KiB");

        self.vram.copy_from_slice(
            &image[address::VRAM_START as usize..=address::VRAM_END as usize],
        );
        for address in address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END {
            self.cartridge.write_ram_address(address, image[address as usize]);
        }
        self.working_ram.copy_from_slice(
            &image[address::WORKING_RAM_START as usize..=address::WORKING_RAM_END as usize],
        );
        self.oam
            .copy_from_slice(&image[address::OAM_START as usize..=address::OAM_END as usize]);
        self.io_registers.privileged_restore(
            &image[address::IO_REGISTERS_START as usize..=address::IO_REGISTERS_END as usize],
        );
        self.hram.copy_from_slice(
            &image[address::HRAM_START as usize..=address::HRAM_END as usize],
        );
        self.ie_register = image[address::IE_REGISTER as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_logo() {
        let mut rom = vec![0; 0x8000];
        stamp_test_header(&mut rom);
        rom[0x0110] ^= 0xFF;

        assert!(matches!(Cartridge::new(rom), Err(CartridgeLoadError::InvalidLogo)));
    }

    #[test]
    fn rejects_bad_header_checksum() {
        let mut rom = vec![0; 0x8000];
        stamp_test_header(&mut rom);
        rom[address::HEADER_CHECKSUM as usize] ^= 0xFF;

        assert!(matches!(Cartridge::new(rom), Err(CartridgeLoadError::HeaderChecksum { .. })));
    }

    #[test]
    fn rejects_short_rom() {
        assert!(matches!(
            Cartridge::new(vec![0; 0x100]),
            Err(CartridgeLoadError::HeaderTooShort { header_len: 0x100 })
        ));
    }

    #[test]
    fn reads_title_from_header() {
        let mut rom = vec![0; 0x8000];
        rom[address::TITLE_START as usize..address::TITLE_START as usize + 7]
            .copy_from_slice(b"TETRIS\0");
        stamp_test_header(&mut rom);

        let cartridge = Cartridge::new(rom).unwrap();
        assert_eq!("TETRIS", cartridge.title());
    }

    #[test]
    fn echo_ram_aliases_working_ram() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());

        address_space.write_address_u8(0xC123, 0x57);
        assert_eq!(0x57, address_space.read_address_u8(0xE123));

        address_space.write_address_u8(0xF000, 0x9A);
        assert_eq!(0x9A, address_space.read_address_u8(0xD000));
    }

    #[test]
    fn unusable_region_reads_ff() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());

        address_space.write_address_u8(0xFEA5, 0x12);
        assert_eq!(0xFF, address_space.read_address_u8(0xFEA5));
    }

    #[test]
    fn u16_access_is_little_endian() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());

        address_space.write_address_u16(0xC000, 0xBEEF);
        assert_eq!(0xEF, address_space.read_address_u8(0xC000));
        assert_eq!(0xBE, address_space.read_address_u8(0xC001));
        assert_eq!(0xBEEF, address_space.read_address_u16(0xC000));
    }

    #[test]
    fn oam_dma_copies_source_page() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());

        for offset in 0..0xA0 {
            address_space.write_address_u8(0xC000 + offset, 0x7E);
        }

        address_space.write_address_u8(0xFF46, 0xC0);

        for offset in 0..0xA0 {
            assert_eq!(0x7E, address_space.read_address_u8(0xFE00 + offset));
        }
    }

    #[test]
    fn oam_dma_is_byte_exact() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());

        for offset in 0..0xA0_u16 {
            address_space.write_address_u8(0xD000 + offset, offset as u8);
        }

        address_space.write_address_u8(0xFF46, 0xD0);

        for offset in 0..0xA0_u16 {
            assert_eq!(offset as u8, address_space.read_address_u8(0xFE00 + offset));
        }
    }

    #[test]
    fn memory_image_round_trip() {
        let mut address_space = AddressSpace::new(Cartridge::new_test());

        address_space.write_address_u8(0x8123, 0x11);
        address_space.write_address_u8(0xC456, 0x22);
        address_space.write_address_u8(0xFE10, 0x33);
        address_space.write_address_u8(0xFF80, 0x44);
        address_space.write_address_u8(0xFFFF, 0x15);

        let image = address_space.memory_image();

        let mut restored = AddressSpace::new(Cartridge::new_test());
        restored.restore_memory_image(&image);

        assert_eq!(image, restored.memory_image());
        assert_eq!(0x11, restored.read_address_u8(0x8123));
        assert_eq!(0x22, restored.read_address_u8(0xC456));
        assert_eq!(0x33, restored.read_address_u8(0xFE10));
        assert_eq!(0x44, restored.read_address_u8(0xFF80));
        assert_eq!(0x15, restored.read_address_u8(0xFFFF));
    }
}
