use crate::cpu::decode::*;
use crate::cpu::reg;
use crate::cpu::stack::ReturnStack;
use crate::cpu::{Registers, CPU};
use crate::error::Fault;
use crate::mem::Memory;

/// Width of the jump-to-subroutine instruction. A return resumes this far
/// past the saved call site.
const CALL_WIDTH: usize = 3;

/// Something an instruction asks of the world outside the CPU.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Effect {
  None,
  /// Write-screen special function: (cell, value).
  Screen(u8, u8),
}

impl CPU {
  pub fn new() -> CPU {
    CPU {
      regs: Registers::new(),
      calls: ReturnStack::new(),
      halted: false,
    }
  }

  /// OR a keypress byte into the keyboard input register.
  pub fn key_down(&mut self, code: u8) {
    self.regs.key |= code;
  }

  /// Run one instruction.
  ///
  /// On a fault the machine is halted and the program counter is left on
  /// the faulting instruction. A halted CPU does nothing.
  pub fn step(&mut self, mem: &mut Memory) -> Result<Effect, Fault> {
    if self.halted {
      return Ok(Effect::None);
    }
    let result = self.exec(mem);
    if result.is_err() {
      self.halted = true;
    }
    result
  }

  /// Execute the instruction at the program counter.
  fn exec(&mut self, mem: &mut Memory) -> Result<Effect, Fault> {
    let pc = self.regs.pc;
    let (opcode, traits) = decode(mem.rb(pc));

    macro_rules! operand {
      ($n:expr) => {
        mem.rb(pc.wrapping_add($n))
      };
    }
    macro_rules! addr16 {
      () => {
        usize::from(mem.rw(pc.wrapping_add(1)))
      };
    }
    macro_rules! advance {
      ($n:expr) => {{
        self.regs.pc = mem.wrap(pc.wrapping_add($n));
        Ok(Effect::None)
      }};
    }

    if opcode != SPECIAL {
      debug!("{}", name(opcode));
    }

    match opcode {
      LOAD_ALU => {
        let value = self.regs.r(traits);
        if traits & 0x08 == 0 {
          self.regs.a = value;
        } else {
          self.regs.b = value;
        }
        advance!(1)
      }
      SAVE_ACC => {
        let value = self.regs.acc_lo();
        if traits & 0x08 == 0 {
          self.regs.set_r(traits, value);
        } else {
          let addr = self.regs.sp.wrapping_add(usize::from(traits & 0x07));
          mem.wb(addr, value);
        }
        advance!(1)
      }
      LOAD_SAVE => {
        let addr = addr16!();
        if traits & 0x08 == 0 {
          self.regs.set_r(traits, mem.rb(addr));
        } else {
          mem.wb(addr, self.regs.r(traits));
        }
        advance!(3)
      }
      ALU => {
        self.alu(traits);
        advance!(1)
      }
      STACK => {
        let size = mem.size();
        let sp = mem.wrap(self.regs.sp);
        if traits & 0x01 == 0 {
          let sp = (sp + size - 1) % size;
          mem.wb(sp, self.regs.acc_lo());
          self.regs.sp = sp;
        } else {
          self.regs.acc = u16::from(mem.rb(sp));
          self.regs.sp = mem.wrap(sp + 1);
        }
        advance!(1)
      }
      JUMP => {
        self.regs.pc = mem.wrap(addr16!());
        Ok(Effect::None)
      }
      JUMP_IF => {
        if self.condition(traits) {
          let offset = i64::from(operand!(1) as i8);
          let size = mem.size() as i64;
          let target = (pc as i64).wrapping_add(offset).rem_euclid(size);
          self.regs.pc = target as usize;
          Ok(Effect::None)
        } else {
          advance!(2)
        }
      }
      MOVE => {
        let src = usize::from(operand!(1));
        let dst = usize::from(operand!(2));
        let bytes = mem.read(src, usize::from(traits) + 1);
        mem.write(dst, &bytes);
        advance!(3)
      }
      SET_SP => {
        self.regs.sp = addr16!();
        advance!(3)
      }
      CALL => {
        if let Some(advisory) = self.calls.advisory() {
          warn!("{}", advisory);
        }
        self.calls.push(pc);
        self.regs.pc = mem.wrap(addr16!());
        debug!("Address Stack Pointer: {}", self.calls.ptr());
        Ok(Effect::None)
      }
      RET => {
        let ret = self.calls.pop().wrapping_add(CALL_WIDTH);
        if let Some(advisory) = self.calls.advisory() {
          warn!("{}", advisory);
        }
        self.regs.pc = mem.wrap(ret);
        debug!("Address Stack Pointer: {}", self.calls.ptr());
        Ok(Effect::None)
      }
      0xb | 0xc => Err(Fault::UndefinedGpio { opcode, pc }),
      SPECIAL => self.special(mem, traits),
      _ => Err(Fault::UndefinedOpcode { opcode, pc }),
    }
  }

  /// Special CPU functions, selected by the opcode trait.
  fn special(
    &mut self,
    mem: &mut Memory,
    traits: u8,
  ) -> Result<Effect, Fault> {
    let pc = self.regs.pc;
    match special_name(traits) {
      Some(name) => debug!("Special CPU Function: {}", name),
      None => debug!("Special CPU Function: 0x{:x}", traits),
    }
    match traits {
      HALT => {
        self.halted = true;
        return Ok(Effect::None);
      }
      NEXTR => {
        for i in 0..8 {
          self.regs.gp[i] = mem.rb(pc.wrapping_add(1 + i));
        }
      }
      NEXTM => {
        for i in 0..8 {
          mem.wb(pc.wrapping_add(1 + i), self.regs.gp[i]);
        }
      }
      NOP => (),
      WSCR => {
        let cell = mem.rb(pc.wrapping_add(1));
        let value = mem.rb(pc.wrapping_add(2));
        self.regs.pc = mem.wrap(pc.wrapping_add(3));
        return Ok(Effect::Screen(cell, value));
      }
      RDKEY => {
        let idx = mem.rb(pc.wrapping_add(1));
        self.regs.set_r(idx, self.regs.key);
      }
      RSKEY => self.regs.key = 0,
      _ => return Err(Fault::UndefinedSpecial { traits, pc }),
    }
    self.regs.pc = mem.wrap(pc.wrapping_add(width((SPECIAL << 4) | traits)));
    Ok(Effect::None)
  }

  /// Whether the jump condition selected by `traits` holds.
  fn condition(&self, traits: u8) -> bool {
    match traits {
      0x0 => true,
      0x1 => self.regs.z(),
      0x2 => !self.regs.z(),
      0x3 => self.regs.c(),
      0x4 => !self.regs.c(),
      0x5 => self.regs.s(),
      0x6 => !self.regs.s(),
      0x7 => self.regs.v(),
      0x8 => !self.regs.v(),
      _ => false,
    }
  }

  /// Apply the ALU function selected by `traits` to registers A and B.
  fn alu(&mut self, traits: u8) {
    let a = self.regs.a;
    let b = self.regs.b;
    let c = u16::from(self.regs.c());

    // Each arm yields (result, carry, overflow).
    macro_rules! add {
      ($x:expr, $y:expr, $cin:expr) => {{
        let x = u16::from($x);
        let y = u16::from($y);
        let r = x + y + $cin;
        let v = !(x ^ y) & (x ^ r) & 0x80 != 0;
        ((r & 0xff) as u8, r > 0xff, v)
      }};
    }
    macro_rules! sub {
      ($x:expr, $y:expr, $bin:expr) => {{
        let x = u16::from($x);
        let y = u16::from($y) + $bin;
        let r = x.wrapping_sub(y);
        let v = (x ^ u16::from($y)) & (x ^ r) & 0x80 != 0;
        ((r & 0xff) as u8, x < y, v)
      }};
    }
    macro_rules! logic {
      ($r:expr) => {{
        ($r, false, false)
      }};
    }

    let (result, carry, overflow) = match traits {
      0x0 => add!(a, b, 0),
      0x1 => add!(a, b, c),
      0x2 => sub!(a, b, 0),
      0x3 => sub!(a, b, c),
      0x4 => logic!(a & b),
      0x5 => logic!(a | b),
      0x6 => logic!(a ^ b),
      0x7 => logic!(!a),
      0x8 => (a << 1, a & 0x80 != 0, false),
      0x9 => (a >> 1, a & 0x01 != 0, false),
      0xa => add!(a, 1u8, 0),
      0xb => sub!(a, 1u8, 0),
      0xc => sub!(a, b, 0),
      0xd => logic!(a),
      0xe => logic!(b),
      _ => logic!(0),
    };

    self.regs.f = 0;
    self.regs.f |= if carry { reg::C } else { 0 };
    self.regs.f |= if result == 0 { reg::Z } else { 0 };
    self.regs.f |= if result & 0x80 != 0 { reg::S } else { 0 };
    self.regs.f |= if overflow { reg::V } else { 0 };

    // CMP only sets flags.
    if traits != 0xc {
      let carry_out = if carry { 0x100 } else { 0 };
      self.regs.acc = u16::from(result) | carry_out;
    }
  }
}
