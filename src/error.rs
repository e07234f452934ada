use std::error::Error as StdError;
use std::fmt;

/// A fatal condition raised by the CPU. The machine halts and the
/// faulting instruction is not counted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Fault {
  /// Opcodes 0xB and 0xC, reserved for GPIO.
  UndefinedGpio { opcode: u8, pc: usize },
  /// Opcodes 0xD and 0xE.
  UndefinedOpcode { opcode: u8, pc: usize },
  /// A special CPU function (opcode 0xF) with an unassigned trait.
  UndefinedSpecial { traits: u8, pc: usize },
}

impl Fault {
  pub fn pc(&self) -> usize {
    match *self {
      Fault::UndefinedGpio { pc, .. }
      | Fault::UndefinedOpcode { pc, .. }
      | Fault::UndefinedSpecial { pc, .. } => pc,
    }
  }
}

impl fmt::Display for Fault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Fault::UndefinedGpio { opcode, pc } => write!(
        f,
        "GPIO instruction not currently defined: 0x{:x} at 0x{:04x}",
        opcode, pc
      ),
      Fault::UndefinedOpcode { opcode, pc } => write!(
        f,
        "instruction not defined: 0x{:x} at 0x{:04x}",
        opcode, pc
      ),
      Fault::UndefinedSpecial { traits, pc } => write!(
        f,
        "special operation not defined: 0xf{:x} at 0x{:04x}",
        traits, pc
      ),
    }
  }
}

impl StdError for Fault {}

/// Failure to place a program image into memory.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoadError {
  /// The image does not fit in the address space and growing it was not
  /// allowed.
  TooLarge { len: usize, limit: usize },
  /// An address space of zero bytes.
  Empty,
}

impl fmt::Display for LoadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LoadError::TooLarge { len, limit } => write!(
        f,
        "program of {} bytes exceeds the {} byte address space",
        len, limit
      ),
      LoadError::Empty => write!(f, "address space must not be empty"),
    }
  }
}

impl StdError for LoadError {}
