use super::{run_test, set_in_state, ExpectedState, ALL_REGISTERS};

use crate::cpu::registers::CpuRegister;

#[test]
fn add_immediate() {
    run_test(
        // LD A, 0x05; ADD 0xDE
        "3E05C6DE",
        &ExpectedState { a: Some(0xE3), f: Some(0x20), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x01; ADD 0x03
        "3E01C603",
        &ExpectedState { a: Some(0x04), f: Some(0x00), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x55; ADD 0xAB
        "3E55C6AB",
        &ExpectedState { a: Some(0x00), f: Some(0xB0), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x01; ADD 0xFF
        "3E01C6FF",
        &ExpectedState { a: Some(0x00), f: Some(0xB0), ..ExpectedState::empty() },
    );
}

#[test]
fn add_register() {
    for r in ALL_REGISTERS {
        let load_opcode = 0x06 | (r.to_opcode_bits() << 3);
        let load_opcode_hex = format!("{load_opcode:02x}");

        let add_opcode = 0x80 | r.to_opcode_bits();
        let add_opcode_hex = format!("{add_opcode:02x}");

        let (expected_a, expected_f) = match r {
            CpuRegister::A => (0x68, 0x10),
            _ => (0xEA, 0x00),
        };

        let mut expected_state =
            ExpectedState { a: Some(expected_a), f: Some(expected_f), ..ExpectedState::empty() };
        if r != CpuRegister::A {
            set_in_state(&mut expected_state, r, 0xB4);
        }

        run_test(
            // LD A, 0x36; LD <r>, 0xB4; ADD <r>
            &format!("3E36{load_opcode_hex}B4{add_opcode_hex}"),
            &expected_state,
        );
    }
}

#[test]
fn add_indirect_hl() {
    run_test(
        // LD HL, 0xCDA4; LD (HL), 0x3B; LD A, 0xA1; ADD (HL)
        "21A4CD363B3EA186",
        &ExpectedState { a: Some(0xDC), f: Some(0x00), ..ExpectedState::empty() },
    );
}

#[test]
fn adc_immediate() {
    run_test(
        // LD A, 0xBC; OR A; ADC 0x15
        "3EBCB7CE15",
        &ExpectedState { a: Some(0xD1), f: Some(0x20), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0xBC; SCF; ADC 0x15
        "3EBC37CE15",
        &ExpectedState { a: Some(0xD2), f: Some(0x20), ..ExpectedState::empty() },
    );
}

#[test]
fn sub_immediate() {
    run_test(
        // LD A, 0x3E; SUB 0x96
        "3E3ED696",
        &ExpectedState { a: Some(0xA8), f: Some(0x50), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x3E; SUB 0x3E
        "3E3ED63E",
        &ExpectedState { a: Some(0x00), f: Some(0xC0), ..ExpectedState::empty() },
    );
}

#[test]
fn sbc_immediate() {
    run_test(
        // LD A, 0x3B; SCF; SBC 0x2A
        "3E3B37DE2A",
        &ExpectedState { a: Some(0x10), f: Some(0x40), ..ExpectedState::empty() },
    );
}

#[test]
fn compare_immediate() {
    run_test(
        // LD A, 0x3E; CP 0x40
        "3E3EFE40",
        &ExpectedState { a: Some(0x3E), f: Some(0x50), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x3E; CP 0x3E
        "3E3EFE3E",
        &ExpectedState { a: Some(0x3E), f: Some(0xC0), ..ExpectedState::empty() },
    );
}

#[test]
fn increment() {
    run_test(
        // LD A, 0x0F; OR A; INC A
        "3E0FB73C",
        &ExpectedState { a: Some(0x10), f: Some(0x20), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0xFF; OR A; INC A
        "3EFFB73C",
        &ExpectedState { a: Some(0x00), f: Some(0xA0), ..ExpectedState::empty() },
    );

    // INC leaves the carry flag alone; it is still set from the power-on F value
    run_test(
        // LD A, 0x0F; INC A
        "3E0F3C",
        &ExpectedState { a: Some(0x10), f: Some(0x30), ..ExpectedState::empty() },
    );
}

#[test]
fn decrement() {
    run_test(
        // LD A, 0x01; OR A; DEC A
        "3E01B73D",
        &ExpectedState { a: Some(0x00), f: Some(0xC0), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x00; OR A; DEC A
        "3E00B73D",
        &ExpectedState { a: Some(0xFF), f: Some(0x60), ..ExpectedState::empty() },
    );
}

#[test]
fn and_or_xor_immediate() {
    run_test(
        // LD A, 0x5A; AND 0x0F
        "3E5AE60F",
        &ExpectedState { a: Some(0x0A), f: Some(0x20), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x5A; AND 0xA5
        "3E5AE6A5",
        &ExpectedState { a: Some(0x00), f: Some(0xA0), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x5A; OR 0x0F
        "3E5AF60F",
        &ExpectedState { a: Some(0x5F), f: Some(0x00), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x5A; XOR 0x5A
        "3E5AEE5A",
        &ExpectedState { a: Some(0x00), f: Some(0x80), ..ExpectedState::empty() },
    );
}

#[test]
fn add_hl_register_pair() {
    run_test(
        // OR A; LD HL, 0x0FFF; LD BC, 0x0001; ADD HL, BC
        "B721FF0F01010009",
        &ExpectedState { h: Some(0x10), l: Some(0x00), f: Some(0x20), ..ExpectedState::empty() },
    );

    run_test(
        // OR A; LD HL, 0xFFFF; LD BC, 0x0001; ADD HL, BC
        "B721FFFF01010009",
        &ExpectedState { h: Some(0x00), l: Some(0x00), f: Some(0x30), ..ExpectedState::empty() },
    );
}

#[test]
fn add_sp_immediate() {
    run_test(
        // LD SP, 0xCFFF; ADD SP, 0x01
        "31FFCFE801",
        &ExpectedState { sp: Some(0xD000), f: Some(0x30), ..ExpectedState::empty() },
    );

    run_test(
        // LD SP, 0xD005; ADD SP, -5
        "3105D0E8FB",
        &ExpectedState { sp: Some(0xD000), f: Some(0x30), ..ExpectedState::empty() },
    );

    run_test(
        // LD SP, 0x0000; ADD SP, -1
        "310000E8FF",
        &ExpectedState { sp: Some(0xFFFF), f: Some(0x00), ..ExpectedState::empty() },
    );

    // The -16 byte is 0xF0 with a zero low nibble, so H is never set
    run_test(
        // LD SP, 0x0000; ADD SP, -16
        "310000E8F0",
        &ExpectedState { sp: Some(0xFFF0), f: Some(0x00), ..ExpectedState::empty() },
    );

    run_test(
        // LD SP, 0xD01F; ADD SP, -16
        "311FD0E8F0",
        &ExpectedState { sp: Some(0xD00F), f: Some(0x10), ..ExpectedState::empty() },
    );
}

#[test]
fn decimal_adjust_after_addition() {
    run_test(
        // LD A, 0x38; ADD 0x05; DAA
        "3E38C60527",
        &ExpectedState { a: Some(0x43), f: Some(0x00), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x45; ADD 0x38; DAA
        "3E45C63827",
        &ExpectedState { a: Some(0x83), f: Some(0x00), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x99; ADD 0x01; DAA
        "3E99C60127",
        &ExpectedState { a: Some(0x00), f: Some(0x90), ..ExpectedState::empty() },
    );
}

#[test]
fn decimal_adjust_after_subtraction() {
    run_test(
        // LD A, 0x42; SUB 0x09; DAA
        "3E42D60927",
        &ExpectedState { a: Some(0x33), f: Some(0x40), ..ExpectedState::empty() },
    );
}

#[test]
fn complement_accumulator() {
    run_test(
        // LD A, 0x35; OR A; CPL
        "3E35B72F",
        &ExpectedState { a: Some(0xCA), f: Some(0x60), ..ExpectedState::empty() },
    );
}

#[test]
fn carry_flag_ops() {
    run_test(
        // OR A; SCF
        "B737",
        &ExpectedState { f: Some(0x10), ..ExpectedState::empty() },
    );

    run_test(
        // OR A; CCF
        "B73F",
        &ExpectedState { f: Some(0x10), ..ExpectedState::empty() },
    );

    run_test(
        // OR A; SCF; CCF
        "B7373F",
        &ExpectedState { f: Some(0x00), ..ExpectedState::empty() },
    );
}
