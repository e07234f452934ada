mod cpu;
pub mod decode;
pub mod reg;
pub mod stack;

use self::stack::ReturnStack;

pub use self::cpu::Effect;

pub struct CPU {
  pub regs: Registers,
  pub calls: ReturnStack,

  /// Set by halt, an undefined opcode, or an abort from outside.
  pub halted: bool,
}

#[cfg(test)]
mod optest;

#[derive(Debug, Eq, PartialEq)]
pub struct Registers {
  /// General-purpose registers.
  pub gp: [u8; 8],

  /// ALU inputs.
  pub a: u8,
  pub b: u8,

  /// ALU result, 8 bits plus the carry-out in bit 8.
  pub acc: u16,

  /// Flag register. Only the low nibble is used.
  pub f: u8,

  /// Keyboard input register, OR-accumulated from the keypad.
  pub key: u8,

  /// Program counter.
  pub pc: usize,

  /// Data stack pointer.
  pub sp: usize,
}
