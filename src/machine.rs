use crate::config::Options;
use crate::console::{Step, Stepper};
use crate::cpu::{Effect, CPU};
use crate::error::Fault;
use crate::io::{KeySource, Screen};
use crate::mem::Memory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why a run ended without a fault.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Stop {
  /// The program executed halt.
  Halted,
  /// The step console or the keypad window asked to stop.
  Aborted,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Summary {
  pub count: u64,
  pub pc: usize,
  pub stop: Stop,
}

/// One Index machine: CPU, memory and the peripherals the options enable.
pub struct Machine {
  pub cpu: CPU,
  pub mem: Memory,
  options: Options,

  screen: Option<Box<dyn Screen + Send>>,
  keys: Option<Box<dyn KeySource + Send>>,
  stepper: Option<Box<dyn Stepper + Send>>,

  /// Raised from another thread to stop the run before the next
  /// instruction.
  stop: Arc<AtomicBool>,

  /// Instructions executed so far.
  count: u64,
  aborted: bool,
}

impl Machine {
  pub fn new(mem: Memory, options: Options) -> Machine {
    Machine {
      cpu: CPU::new(),
      mem,
      options,
      screen: None,
      keys: None,
      stepper: None,
      stop: Arc::default(),
      count: 0,
      aborted: false,
    }
  }

  pub fn with_screen(mut self, screen: Box<dyn Screen + Send>) -> Machine {
    self.screen = Some(screen);
    self
  }

  pub fn with_keys(mut self, keys: Box<dyn KeySource + Send>) -> Machine {
    self.keys = Some(keys);
    self
  }

  pub fn with_stepper(mut self, stepper: Box<dyn Stepper + Send>) -> Machine {
    self.stepper = Some(stepper);
    self
  }

  pub fn count(&self) -> u64 {
    self.count
  }

  #[cfg(test)]
  pub fn halted(&self) -> bool {
    self.cpu.halted
  }

  /// Flag that stops the run when set, for whoever drives the machine from
  /// another thread.
  #[cfg_attr(not(any(test, feature = "keypad")), allow(dead_code))]
  pub fn stop_handle(&self) -> Arc<AtomicBool> {
    Arc::clone(&self.stop)
  }

  /// Run until the machine halts.
  pub fn run(&mut self) -> Result<Summary, Fault> {
    while !self.cpu.halted {
      if self.stop.load(Ordering::Relaxed) {
        info!("Stopped from outside the machine");
        self.abort();
        break;
      }
      self.step()?;
    }
    let summary = Summary {
      count: self.count,
      pc: self.cpu.regs.pc,
      stop: if self.aborted {
        Stop::Aborted
      } else {
        Stop::Halted
      },
    };
    info!(
      "{:?} after {} instructions, PC 0x{:04x}",
      summary.stop, summary.count, summary.pc
    );
    Ok(summary)
  }

  /// Execute one instruction and service the peripherals. A halted
  /// machine does nothing.
  pub fn step(&mut self) -> Result<(), Fault> {
    if self.cpu.halted {
      return Ok(());
    }
    match self.cpu.step(&mut self.mem) {
      Ok(Effect::None) => (),
      Ok(Effect::Screen(cell, value)) => self.write_screen(cell, value),
      Err(fault) => {
        error!("{}", fault);
        return Err(fault);
      }
    }
    self.count += 1;

    if self.options.debug {
      debug!("Program Counter: {}", self.cpu.regs.pc);
      debug!("Inst count: {}", self.count);
    }

    if self.options.step && !self.cpu.halted {
      self.wait_for_step();
    }

    if self.options.keyboard {
      self.poll_keys();
    }
    Ok(())
  }

  fn write_screen(&mut self, cell: u8, value: u8) {
    match self.screen {
      Some(ref mut screen) if self.options.screen => screen.write(cell, value),
      _ => debug!("screen off, dropped ({:02x}, {:02x})", cell, value),
    }
  }

  fn wait_for_step(&mut self) {
    let step = match self.stepper {
      Some(ref mut stepper) => stepper.wait(),
      None => return,
    };
    let abort = match step {
      Ok(Step::Continue) => false,
      Ok(Step::Abort) => true,
      Err(e) => {
        warn!("step console failed: {}", e);
        true
      }
    };
    if abort {
      info!("Stopped from the step console");
      self.abort();
    }
  }

  fn abort(&mut self) {
    self.cpu.halted = true;
    self.aborted = true;
  }

  fn poll_keys(&mut self) {
    if let Some(ref mut keys) = self.keys {
      while let Some(code) = keys.poll() {
        self.cpu.key_down(code);
        debug!("Keyboard register: {}", self.cpu.regs.key);
      }
    }
  }
}
