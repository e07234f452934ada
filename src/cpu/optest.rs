use crate::cpu::reg;
use crate::cpu::stack::Advisory;
use crate::cpu::{Effect, CPU};
use crate::error::Fault;
use crate::mem::{Memory, ADDRESS_SPACE};

fn init() -> (CPU, Memory) {
  let mut cpu = CPU::new();
  let mem = Memory::new(ADDRESS_SPACE).unwrap();
  // Start away from address zero so wraparound and relative jumps show.
  cpu.regs.pc = 0x0200;
  (cpu, mem)
}

/// Place `code` at the program counter, run one instruction and check the
/// program counter moved forward by `len`.
fn run(cpu: &mut CPU, mem: &mut Memory, code: &[u8], len: usize) -> Effect {
  let start = cpu.regs.pc;
  mem.write(start, code);
  let effect = cpu.step(mem).unwrap();
  assert_eq!(cpu.regs.pc, (start + len) % mem.size());
  effect
}

fn alu(a: u8, b: u8, f: u8, op: u8) -> CPU {
  let (mut cpu, mut mem) = init();
  cpu.regs.a = a;
  cpu.regs.b = b;
  cpu.regs.f = f;
  run(&mut cpu, &mut mem, &[0x30 | op], 1);
  cpu
}

#[test]
fn nop() {
  let (mut cpu, mut mem) = init();
  run(&mut cpu, &mut mem, &[0xf3], 1);
  assert!(!cpu.halted);
}

#[test]
fn load_alu_reg() {
  let (mut cpu, mut mem) = init();
  cpu.regs.gp = [10, 11, 12, 13, 14, 15, 16, 17];
  run(&mut cpu, &mut mem, &[0x03], 1);
  assert_eq!(cpu.regs.a, 13);
  assert_eq!(cpu.regs.b, 0);
  run(&mut cpu, &mut mem, &[0x0e], 1);
  assert_eq!(cpu.regs.a, 13);
  assert_eq!(cpu.regs.b, 16);
}

#[test]
fn save_acc() {
  let (mut cpu, mut mem) = init();
  cpu.regs.acc = 0x1c4;
  run(&mut cpu, &mut mem, &[0x15], 1);
  assert_eq!(cpu.regs.gp[5], 0xc4);

  cpu.regs.sp = 0x8000;
  cpu.regs.acc = 0x33;
  run(&mut cpu, &mut mem, &[0x1a], 1);
  assert_eq!(mem.rb(0x8002), 0x33);
}

#[test]
fn load_save_reg() {
  let (mut cpu, mut mem) = init();
  mem.wb(0x1234, 0x42);
  run(&mut cpu, &mut mem, &[0x22, 0x12, 0x34], 3);
  assert_eq!(cpu.regs.gp[2], 0x42);

  cpu.regs.gp[7] = 0x99;
  run(&mut cpu, &mut mem, &[0x2f, 0x40, 0x00], 3);
  assert_eq!(mem.rb(0x4000), 0x99);
}

#[test]
fn alu_add() {
  let cpu = alu(0x10, 0x22, 0, 0x0);
  assert_eq!(cpu.regs.acc, 0x32);
  assert_eq!(cpu.regs.f, 0);

  let cpu = alu(0xff, 0x02, 0, 0x0);
  assert_eq!(cpu.regs.acc, 0x101);
  assert_eq!(cpu.regs.f, reg::C);

  let cpu = alu(0x80, 0x80, 0, 0x0);
  assert_eq!(cpu.regs.acc, 0x100);
  assert_eq!(cpu.regs.f, reg::C | reg::Z | reg::V);

  let cpu = alu(0x7f, 0x01, 0, 0x0);
  assert_eq!(cpu.regs.acc, 0x80);
  assert_eq!(cpu.regs.f, reg::S | reg::V);
}

#[test]
fn alu_adc() {
  let cpu = alu(0x10, 0x22, reg::C, 0x1);
  assert_eq!(cpu.regs.acc, 0x33);
  let cpu = alu(0x10, 0x22, 0, 0x1);
  assert_eq!(cpu.regs.acc, 0x32);
}

#[test]
fn alu_sub() {
  let cpu = alu(0x05, 0x03, 0, 0x2);
  assert_eq!(cpu.regs.acc, 0x02);
  assert_eq!(cpu.regs.f, 0);

  let cpu = alu(0x03, 0x05, 0, 0x2);
  assert_eq!(cpu.regs.acc, 0x1fe);
  assert_eq!(cpu.regs.f, reg::C | reg::S);

  let cpu = alu(0x80, 0x01, 0, 0x2);
  assert_eq!(cpu.regs.acc, 0x7f);
  assert_eq!(cpu.regs.f, reg::V);

  let cpu = alu(0x05, 0x05, 0, 0x2);
  assert_eq!(cpu.regs.acc, 0);
  assert_eq!(cpu.regs.f, reg::Z);
}

#[test]
fn alu_sbc() {
  let cpu = alu(0x05, 0x03, reg::C, 0x3);
  assert_eq!(cpu.regs.acc, 0x01);
  let cpu = alu(0x03, 0x03, reg::C, 0x3);
  assert_eq!(cpu.regs.acc, 0x1ff);
  assert!(cpu.regs.c());
}

#[test]
fn alu_logic() {
  assert_eq!(alu(0xcc, 0xaa, 0, 0x4).regs.acc, 0x88);
  assert_eq!(alu(0xcc, 0xaa, 0, 0x5).regs.acc, 0xee);
  assert_eq!(alu(0xcc, 0xaa, 0, 0x6).regs.acc, 0x66);
  assert_eq!(alu(0xcc, 0xaa, 0, 0x7).regs.acc, 0x33);

  let cpu = alu(0xcc, 0x33, reg::C | reg::V, 0x4);
  assert_eq!(cpu.regs.acc, 0);
  assert_eq!(cpu.regs.f, reg::Z);
}

#[test]
fn alu_shifts() {
  let cpu = alu(0x81, 0, 0, 0x8);
  assert_eq!(cpu.regs.acc, 0x102);
  assert!(cpu.regs.c());

  let cpu = alu(0x81, 0, 0, 0x9);
  assert_eq!(cpu.regs.acc, 0x140);
  assert!(cpu.regs.c());

  let cpu = alu(0x40, 0, 0, 0x8);
  assert_eq!(cpu.regs.acc, 0x80);
  assert_eq!(cpu.regs.f, reg::S);
}

#[test]
fn alu_inc_dec() {
  let cpu = alu(0xff, 0, 0, 0xa);
  assert_eq!(cpu.regs.acc, 0x100);
  assert_eq!(cpu.regs.f, reg::C | reg::Z);

  let cpu = alu(0x00, 0, 0, 0xb);
  assert_eq!(cpu.regs.acc, 0x1ff);
  assert_eq!(cpu.regs.f, reg::C | reg::S);
}

#[test]
fn alu_cmp_keeps_acc() {
  let (mut cpu, mut mem) = init();
  cpu.regs.acc = 0x77;
  cpu.regs.a = 0x09;
  cpu.regs.b = 0x09;
  run(&mut cpu, &mut mem, &[0x3c], 1);
  assert_eq!(cpu.regs.acc, 0x77);
  assert!(cpu.regs.z());

  cpu.regs.b = 0x0a;
  run(&mut cpu, &mut mem, &[0x3c], 1);
  assert_eq!(cpu.regs.acc, 0x77);
  assert!(cpu.regs.c());
  assert!(!cpu.regs.z());
}

#[test]
fn alu_pass_and_clear() {
  assert_eq!(alu(0x12, 0x34, 0, 0xd).regs.acc, 0x12);
  assert_eq!(alu(0x12, 0x34, 0, 0xe).regs.acc, 0x34);
  let cpu = alu(0x12, 0x34, reg::C, 0xf);
  assert_eq!(cpu.regs.acc, 0);
  assert_eq!(cpu.regs.f, reg::Z);
}

#[test]
fn stack_push_pop() {
  let (mut cpu, mut mem) = init();
  cpu.regs.sp = 0x9000;
  cpu.regs.acc = 0x1ab;
  run(&mut cpu, &mut mem, &[0x40], 1);
  assert_eq!(cpu.regs.sp, 0x8fff);
  assert_eq!(mem.rb(0x8fff), 0xab);

  cpu.regs.acc = 0;
  run(&mut cpu, &mut mem, &[0x41], 1);
  assert_eq!(cpu.regs.sp, 0x9000);
  assert_eq!(cpu.regs.acc, 0xab);
}

#[test]
fn stack_wraps() {
  let (mut cpu, mut mem) = init();
  cpu.regs.acc = 0x5a;
  run(&mut cpu, &mut mem, &[0x40], 1);
  assert_eq!(cpu.regs.sp, ADDRESS_SPACE - 1);
  assert_eq!(mem.rb(ADDRESS_SPACE - 1), 0x5a);
  run(&mut cpu, &mut mem, &[0x41], 1);
  assert_eq!(cpu.regs.sp, 0);
}

#[test]
fn absolute_jump() {
  let cases = [
    (0x0200usize, 0x12u8, 0x34u8),
    (0xfff0, 0x00, 0x00),
    (0x10, 0xff, 0xff),
  ];
  for &(start, hi, lo) in &cases {
    let (mut cpu, mut mem) = init();
    cpu.regs.pc = start;
    mem.write(start, &[0x50, hi, lo]);
    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.regs.pc, (usize::from(hi) << 8) | usize::from(lo));
  }
}

#[test]
fn conditional_jump() {
  let (mut cpu, mut mem) = init();
  // Always: forward.
  mem.write(0x0200, &[0x60, 0x10]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0210);

  // Always: backward.
  mem.write(0x0210, &[0x60, 0xf0]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0200);

  // Zero clear: falls through.
  run(&mut cpu, &mut mem, &[0x61, 0x10], 2);

  // Zero set: taken.
  cpu.regs.f = reg::Z;
  mem.write(0x0202, &[0x61, 0x08]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x020a);
}

#[test]
fn conditional_jump_conditions() {
  let cases = [
    (0x1, reg::Z, true),
    (0x2, reg::Z, false),
    (0x3, reg::C, true),
    (0x4, 0, true),
    (0x5, reg::S, true),
    (0x6, reg::S, false),
    (0x7, reg::V, true),
    (0x8, reg::V, false),
    (0x9, 0xf, false),
    (0xf, 0x0, false),
  ];
  for &(traits, f, taken) in cases.iter() {
    let (mut cpu, mut mem) = init();
    cpu.regs.f = f;
    mem.write(0x0200, &[0x60 | traits, 0x20]);
    cpu.step(&mut mem).unwrap();
    let expected = if taken { 0x0220 } else { 0x0202 };
    assert_eq!(cpu.regs.pc, expected, "condition 0x{:x}", traits);
  }
}

#[test]
fn conditional_jump_wraps_below_zero() {
  let (mut cpu, mut mem) = init();
  cpu.regs.pc = 0x0002;
  mem.write(0x0002, &[0x60, 0xfc]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, ADDRESS_SPACE - 2);
}

#[test]
fn move_bytes() {
  let (mut cpu, mut mem) = init();
  mem.write(0x10, &[1, 2, 3, 4]);
  run(&mut cpu, &mut mem, &[0x73, 0x10, 0x80], 3);
  assert_eq!(mem.read(0x80, 4), vec![1, 2, 3, 4]);
  assert_eq!(mem.read(0x10, 4), vec![1, 2, 3, 4]);
}

#[test]
fn move_bytes_overlapping() {
  let (mut cpu, mut mem) = init();
  mem.write(0x10, &[1, 2, 3, 4]);
  run(&mut cpu, &mut mem, &[0x73, 0x10, 0x12], 3);
  assert_eq!(mem.read(0x10, 6), vec![1, 2, 1, 2, 3, 4]);
}

#[test]
fn set_stack_pointer() {
  let (mut cpu, mut mem) = init();
  run(&mut cpu, &mut mem, &[0x80, 0xbe, 0xef], 3);
  assert_eq!(cpu.regs.sp, 0xbeef);
}

#[test]
fn call_and_return() {
  let (mut cpu, mut mem) = init();
  mem.write(0x0200, &[0x90, 0x30, 0x00]);
  mem.write(0x3000, &[0xa0]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x3000);
  assert_eq!(cpu.calls.ptr(), 1);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0203);
  assert_eq!(cpu.calls.ptr(), 0);
}

#[test]
fn nested_calls_return_in_order() {
  let (mut cpu, mut mem) = init();
  // Each subroutine at 0x1000 * n calls the next one, the last returns.
  for n in 1..15usize {
    let at = 0x1000 * n;
    let next = 0x1000 * (n + 1);
    mem.write(at, &[0x90, (next >> 8) as u8, 0x00, 0xa0]);
  }
  mem.write(0xf000, &[0xa0]);
  mem.write(0x0200, &[0x90, 0x10, 0x00, 0xf0]);
  while !cpu.halted {
    cpu.step(&mut mem).unwrap();
  }
  assert_eq!(cpu.regs.pc, 0x0203);
  assert_eq!(cpu.calls.ptr(), 0);
}

#[test]
fn seventeen_calls_overwrite_oldest() {
  let (mut cpu, mut mem) = init();
  // 17 calls from 0x0100, 0x0200, .. 0x1100, each to the next site.
  for i in 0..17usize {
    let site = 0x100 * (i + 1);
    let target = 0x100 * (i + 2);
    mem.write(site, &[0x90, (target >> 8) as u8, 0x00]);
  }
  cpu.regs.pc = 0x0100;
  for _ in 0..17 {
    cpu.step(&mut mem).unwrap();
  }
  assert_eq!(cpu.calls.ptr(), 17);
  assert_eq!(cpu.calls.advisory(), Some(Advisory::Overflow(17)));
  assert_eq!(cpu.calls.slot(0), 0x1100);
  assert_eq!(cpu.calls.slot(1), 0x0200);

  let mut returns = Vec::new();
  for _ in 0..17 {
    let at = cpu.regs.pc;
    mem.wb(at, 0xa0);
    cpu.step(&mut mem).unwrap();
    returns.push(cpu.regs.pc);
  }
  assert_eq!(returns[0], 0x1103);
  assert_eq!(returns[15], 0x0203);
  assert_eq!(returns[16], 0x1103);
  assert!(!returns.contains(&0x0103));
}

#[test]
fn return_wraps_past_end_of_memory() {
  let (mut cpu, mut mem) = init();
  cpu.regs.pc = ADDRESS_SPACE - 2;
  mem.write(ADDRESS_SPACE - 2, &[0x90, 0x10, 0x00]);
  mem.wb(0x1000, 0xa0);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x1000);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn pc_stays_inside_small_memory() {
  let mut cpu = CPU::new();
  let mut mem = Memory::new(0x100).unwrap();
  mem.write(0x00, &[0x50, 0x12, 0x34]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x34);

  mem.write(0x34, &[0x90, 0x01, 0xfe]);
  mem.write(0xfe, &[0xf3, 0xa0]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0xfe);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0xff);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x37);

  mem.write(0x37, &[0xa0]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.calls.advisory(), Some(Advisory::Underflow(-1)));
}

#[test]
fn gpio_is_fatal() {
  for &op in &[0xb0u8, 0xc7] {
    let (mut cpu, mut mem) = init();
    mem.wb(0x0200, op);
    let err = cpu.step(&mut mem).unwrap_err();
    assert_eq!(
      err,
      Fault::UndefinedGpio {
        opcode: op >> 4,
        pc: 0x0200
      }
    );
    assert!(cpu.halted);
    assert_eq!(cpu.regs.pc, 0x0200);
  }
}

#[test]
fn reserved_is_fatal() {
  for &op in &[0xd0u8, 0xe5] {
    let (mut cpu, mut mem) = init();
    mem.wb(0x0200, op);
    let err = cpu.step(&mut mem).unwrap_err();
    assert_eq!(
      err,
      Fault::UndefinedOpcode {
        opcode: op >> 4,
        pc: 0x0200
      }
    );
    assert!(cpu.halted);
  }
}

#[test]
fn halt() {
  let (mut cpu, mut mem) = init();
  mem.write(0x0200, &[0xf0, 0xf3]);
  cpu.step(&mut mem).unwrap();
  assert!(cpu.halted);
  assert_eq!(cpu.regs.pc, 0x0200);
  // Nothing runs once halted.
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0200);
}

#[test]
fn undefined_special_is_fatal() {
  for traits in 7..16u8 {
    let (mut cpu, mut mem) = init();
    mem.wb(0x0200, 0xf0 | traits);
    let err = cpu.step(&mut mem).unwrap_err();
    assert_eq!(err, Fault::UndefinedSpecial { traits, pc: 0x0200 });
    assert!(cpu.halted);
  }
}

#[test]
fn next_registers_round_trip() {
  let (mut cpu, mut mem) = init();
  let bytes = [9, 8, 7, 6, 5, 4, 3, 2];
  let mut code = vec![0xf1];
  code.extend_from_slice(&bytes);
  run(&mut cpu, &mut mem, &code, 9);
  assert_eq!(cpu.regs.gp, bytes);

  // Store back over the same 8 bytes.
  cpu.regs.pc = 0x0200;
  mem.wb(0x0200, 0xf2);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0209);
  assert_eq!(mem.read(0x0201, 8), bytes.to_vec());
}

#[test]
fn next_memory() {
  let (mut cpu, mut mem) = init();
  cpu.regs.gp = [1, 2, 3, 4, 5, 6, 7, 8];
  run(&mut cpu, &mut mem, &[0xf2], 9);
  assert_eq!(mem.read(0x0201, 8), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn write_screen() {
  let (mut cpu, mut mem) = init();
  let effect = run(&mut cpu, &mut mem, &[0xf4, 0x03, b'x'], 3);
  assert_eq!(effect, Effect::Screen(0x03, b'x'));
}

#[test]
fn keyboard_register() {
  let (mut cpu, mut mem) = init();
  cpu.key_down(0x05);
  cpu.key_down(0x02);
  assert_eq!(cpu.regs.key, 0x07);

  run(&mut cpu, &mut mem, &[0xf5, 0x04], 2);
  assert_eq!(cpu.regs.gp[4], 0x07);

  run(&mut cpu, &mut mem, &[0xf6], 1);
  assert_eq!(cpu.regs.key, 0x00);
  assert_eq!(cpu.regs.gp[4], 0x07);
}

#[test]
fn operands_wrap_at_end_of_memory() {
  let (mut cpu, mut mem) = init();
  cpu.regs.pc = ADDRESS_SPACE - 1;
  mem.wb(ADDRESS_SPACE - 1, 0x50);
  mem.write(0, &[0x01, 0x23]);
  cpu.step(&mut mem).unwrap();
  assert_eq!(cpu.regs.pc, 0x0123);
}
