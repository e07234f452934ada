/// Split an instruction byte into its opcode and opcode-trait nibbles.
pub fn decode(byte: u8) -> (u8, u8) {
  (byte >> 4, byte & 0x0f)
}

pub const LOAD_ALU: u8 = 0x0;
pub const SAVE_ACC: u8 = 0x1;
pub const LOAD_SAVE: u8 = 0x2;
pub const ALU: u8 = 0x3;
pub const STACK: u8 = 0x4;
pub const JUMP: u8 = 0x5;
pub const JUMP_IF: u8 = 0x6;
pub const MOVE: u8 = 0x7;
pub const SET_SP: u8 = 0x8;
pub const CALL: u8 = 0x9;
pub const RET: u8 = 0xa;
pub const SPECIAL: u8 = 0xf;

pub const HALT: u8 = 0x0;
pub const NEXTR: u8 = 0x1;
pub const NEXTM: u8 = 0x2;
pub const NOP: u8 = 0x3;
pub const WSCR: u8 = 0x4;
pub const RDKEY: u8 = 0x5;
pub const RSKEY: u8 = 0x6;

/// Human readable name of an opcode, for the debug trace.
pub fn name(opcode: u8) -> &'static str {
  match opcode & 0x0f {
    LOAD_ALU => "Load ALU Register",
    SAVE_ACC => "Save Accumulator",
    LOAD_SAVE => "Load/Save Register",
    ALU => "ALU Operation",
    STACK => "Stack Operation",
    JUMP => "Absolute Jump",
    JUMP_IF => "Conditional Jump",
    MOVE => "Move Bytes",
    SET_SP => "Set Stack Pointer",
    CALL => "Jump to Subroutine",
    RET => "Return from Subroutine",
    0xb | 0xc => "GPIO Operation",
    SPECIAL => "Special CPU Function",
    _ => "Undefined",
  }
}

/// Mnemonic of a special CPU function.
pub fn special_name(traits: u8) -> Option<&'static str> {
  match traits {
    HALT => Some("halt"),
    NEXTR => Some("nextr"),
    NEXTM => Some("nextm"),
    NOP => Some("nop"),
    WSCR => Some("wscr"),
    RDKEY => Some("rdkey"),
    RSKEY => Some("rskey"),
    _ => None,
  }
}

/// Encoded width in bytes of the instruction starting with `byte`.
/// Undefined instructions report a width of 1.
pub fn width(byte: u8) -> usize {
  let (opcode, traits) = decode(byte);
  match opcode {
    LOAD_SAVE | JUMP | MOVE | SET_SP | CALL => 3,
    JUMP_IF => 2,
    SPECIAL => match traits {
      NEXTR | NEXTM => 9,
      WSCR => 3,
      RDKEY => 2,
      _ => 1,
    },
    _ => 1,
  }
}
