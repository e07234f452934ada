use crate::cpu::Registers;

pub const C: u8 = 0x1;
pub const Z: u8 = 0x2;
pub const S: u8 = 0x4;
pub const V: u8 = 0x8;

impl Registers {
  pub fn new() -> Registers {
    Registers {
      gp: [0; 8],
      a: 0,
      b: 0,
      acc: 0,
      f: 0,
      key: 0,
      pc: 0,
      sp: 0,
    }
  }

  /// General-purpose register selected by the low three bits of `idx`.
  pub fn r(&self, idx: u8) -> u8 {
    self.gp[usize::from(idx & 0x07)]
  }

  pub fn set_r(&mut self, idx: u8, value: u8) {
    self.gp[usize::from(idx & 0x07)] = value;
  }

  /// Low byte of the accumulator.
  pub fn acc_lo(&self) -> u8 {
    (self.acc & 0xff) as u8
  }

  pub fn c(&self) -> bool {
    //! Carry flag
    self.f & C != 0
  }
  pub fn z(&self) -> bool {
    //! Zero flag
    self.f & Z != 0
  }
  pub fn s(&self) -> bool {
    //! Sign flag
    self.f & S != 0
  }
  pub fn v(&self) -> bool {
    //! Overflow flag
    self.f & V != 0
  }
}
