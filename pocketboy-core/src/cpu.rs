pub(crate) mod instructions;
mod registers;

#[cfg(test)]
mod tests;

use crate::memory::ioregisters::IoRegister;
use crate::memory::AddressSpace;

pub use registers::CpuRegisters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptType {
    VBlank,
    LcdStatus,
    Timer,
    Joypad,
    // serial not implemented
}

impl InterruptType {
    pub fn handler_address(self) -> u16 {
        match self {
            Self::VBlank => 0x0040,
            Self::LcdStatus => 0x0048,
            Self::Timer => 0x0050,
            Self::Joypad => 0x0060,
        }
    }

    pub fn bit_mask(self) -> u8 {
        match self {
            Self::VBlank => 0x01,
            Self::LcdStatus => 0x02,
            Self::Timer => 0x04,
            Self::Joypad => 0x10,
        }
    }
}

/// Interrupt dispatch takes 5 machine cycles: 2 idle, 2 for the PC push, 1 for the jump.
pub const ISR_CYCLES_REQUIRED: u32 = 20;

fn enabled_pending_interrupts(address_space: &AddressSpace) -> u8 {
    let ie_value = address_space.get_ie_register();
    let if_value = address_space.get_io_registers().read_register(IoRegister::IF);
    ie_value & if_value & 0x1F
}

// The lowest set bit in IE & IF selects the interrupt; bit 0 (VBlank) has the highest
// priority.
fn highest_priority_interrupt(pending: u8) -> Option<InterruptType> {
    [InterruptType::VBlank, InterruptType::LcdStatus, InterruptType::Timer, InterruptType::Joypad]
        .into_iter()
        .find(|interrupt_type| pending & interrupt_type.bit_mask() != 0)
}

/// Whether the next CPU step should begin with an interrupt dispatch.
pub fn interrupt_triggered(cpu_registers: &CpuRegisters, address_space: &AddressSpace) -> bool {
    cpu_registers.ime
        && !cpu_registers.interrupt_delay
        && enabled_pending_interrupts(address_space) != 0
}

/// Whether any enabled interrupt is pending, regardless of the IME flag. A pending interrupt
/// wakes a halted CPU even when IME is cleared (without vectoring anywhere).
pub fn interrupt_pending_ignore_ime(address_space: &AddressSpace) -> bool {
    enabled_pending_interrupts(address_space) != 0
}

/// Dispatch the highest-priority pending interrupt: clear its IF bit, clear IME, push PC,
/// and jump to the handler vector.
pub fn execute_interrupt_service_routine(
    cpu_registers: &mut CpuRegisters,
    address_space: &mut AddressSpace,
) {
    let pending = enabled_pending_interrupts(address_space);
    let Some(interrupt_type) = highest_priority_interrupt(pending) else {
        return;
    };

    log::trace!(
        "Dispatching {interrupt_type:?} interrupt, PC={:04X}",
        cpu_registers.pc
    );

    address_space.get_io_registers_mut().interrupt_flags().clear(interrupt_type);
    cpu_registers.ime = false;
    cpu_registers.halted = false;

    cpu_registers.sp = cpu_registers.sp.wrapping_sub(2);
    address_space.write_address_u16(cpu_registers.sp, cpu_registers.pc);
    cpu_registers.pc = interrupt_type.handler_address();
}

/// Run the CPU for one step: dispatch a pending interrupt, idle if halted, or fetch and
/// execute one instruction. Returns the number of T-cycles consumed.
pub fn tick_cpu(address_space: &mut AddressSpace, cpu_registers: &mut CpuRegisters) -> u32 {
    if interrupt_triggered(cpu_registers, address_space) {
        execute_interrupt_service_routine(cpu_registers, address_space);
        return ISR_CYCLES_REQUIRED;
    }

    if cpu_registers.halted {
        if interrupt_pending_ignore_ime(address_space) {
            // Wake without vectoring; execution resumes at the instruction after HALT
            cpu_registers.halted = false;
        } else {
            // Idle for 1 M-cycle and let the other processors run
            return 4;
        }
    }

    let (instruction, pc) = instructions::parse_next_instruction(address_space, cpu_registers.pc);

    log::trace!("Updating PC from {:04X} to {pc:04X}", cpu_registers.pc);
    cpu_registers.pc = pc;

    let cycles_required = instruction.cycles_required(cpu_registers);

    log::trace!("Executing instruction {instruction:02X?}, will take {cycles_required} cycles");
    instruction.execute(address_space, cpu_registers);

    cycles_required
}
