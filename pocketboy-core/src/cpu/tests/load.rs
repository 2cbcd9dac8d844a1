use super::{hash_map, run_test, set_in_state, ExpectedState, ALL_REGISTERS};

#[test]
fn load_register_immediate() {
    for r in ALL_REGISTERS {
        let load_opcode = 0x06 | (r.to_opcode_bits() << 3);
        let load_opcode_hex = format!("{load_opcode:02x}");

        let mut expected_state = ExpectedState::empty();
        set_in_state(&mut expected_state, r, 0x42);

        // LD <r>, 0x42
        run_test(&format!("{load_opcode_hex}42"), &expected_state);
    }
}

#[test]
fn load_register_register() {
    // LD A, 0x55; LD B, A
    run_test(
        "3E5547",
        &ExpectedState { a: Some(0x55), b: Some(0x55), ..ExpectedState::empty() },
    );

    // LD B, 0x39; LD D, B
    run_test(
        "063950",
        &ExpectedState { b: Some(0x39), d: Some(0x39), ..ExpectedState::empty() },
    );
}

#[test]
fn load_indirect_hl_immediate() {
    run_test(
        // LD HL, 0xC0A0; LD (HL), 0x3C
        "21A0C0363C",
        &ExpectedState { memory: hash_map!(0xC0A0: 0x3C), ..ExpectedState::empty() },
    );
}

#[test]
fn load_indirect_hl_increment() {
    run_test(
        // LD HL, 0xC0A0; LD A, 0x11; LD (HL+), A
        "21A0C03E1122",
        &ExpectedState {
            h: Some(0xC0),
            l: Some(0xA1),
            memory: hash_map!(0xC0A0: 0x11),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn load_indirect_hl_decrement() {
    run_test(
        // LD HL, 0xC0A0; LD A, 0x11; LD (HL-), A
        "21A0C03E1132",
        &ExpectedState {
            h: Some(0xC0),
            l: Some(0x9F),
            memory: hash_map!(0xC0A0: 0x11),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn load_ff_page_direct() {
    run_test(
        // LD A, 0x77; LDH (0x80), A
        "3E77E080",
        &ExpectedState { memory: hash_map!(0xFF80: 0x77), ..ExpectedState::empty() },
    );

    run_test(
        // LD A, 0x55; LDH (0x80), A; LD A, 0x00; LDH A, (0x80)
        "3E55E0803E00F080",
        &ExpectedState { a: Some(0x55), ..ExpectedState::empty() },
    );
}

#[test]
fn load_ff_page_indirect_c() {
    run_test(
        // LD C, 0x81; LD A, 0x66; LD (FF00+C), A
        "0E813E66E2",
        &ExpectedState { memory: hash_map!(0xFF81: 0x66), ..ExpectedState::empty() },
    );
}

#[test]
fn load_direct() {
    run_test(
        // LD A, 0x9A; LD (0xC000), A; LD A, 0x00; LD A, (0xC000)
        "3E9AEA00C03E00FA00C0",
        &ExpectedState {
            a: Some(0x9A),
            memory: hash_map!(0xC000: 0x9A),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn load_register_pair_immediate() {
    run_test(
        // LD BC, 0x1234
        "013412",
        &ExpectedState { b: Some(0x12), c: Some(0x34), ..ExpectedState::empty() },
    );

    run_test(
        // LD SP, 0xCFFE
        "31FECF",
        &ExpectedState { sp: Some(0xCFFE), ..ExpectedState::empty() },
    );
}

#[test]
fn load_direct_stack_pointer() {
    run_test(
        // LD SP, 0xCFFE; LD (0xC000), SP
        "31FECF0800C0",
        &ExpectedState {
            memory: hash_map!(0xC000: 0xFE, 0xC001: 0xCF),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn load_stack_pointer_hl() {
    run_test(
        // LD HL, 0xD000; LD SP, HL
        "2100D0F9",
        &ExpectedState { sp: Some(0xD000), ..ExpectedState::empty() },
    );
}

#[test]
fn load_hl_stack_pointer_offset() {
    run_test(
        // LD SP, 0xCFFD; LDHL SP, +3
        "31FDCFF803",
        &ExpectedState { h: Some(0xD0), l: Some(0x00), f: Some(0x30), ..ExpectedState::empty() },
    );

    // The -16 byte is 0xF0 with a zero low nibble, so H is never set
    run_test(
        // LD SP, 0x0000; LDHL SP, -16
        "310000F8F0",
        &ExpectedState {
            h: Some(0xFF),
            l: Some(0xF0),
            sp: Some(0x0000),
            f: Some(0x00),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn push_pop_round_trip() {
    run_test(
        // LD SP, 0xCFFE; LD BC, 0x1234; PUSH BC; POP HL
        "31FECF013412C5E1",
        &ExpectedState {
            h: Some(0x12),
            l: Some(0x34),
            sp: Some(0xCFFE),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn pop_af_discards_low_flag_nibble() {
    run_test(
        // LD SP, 0xCFFE; LD BC, 0xFF3F; PUSH BC; POP AF
        "31FECF013FFFC5F1",
        &ExpectedState { a: Some(0xFF), f: Some(0x30), ..ExpectedState::empty() },
    );
}
