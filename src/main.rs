#[macro_use]
extern crate log;

use anyhow::{bail, Result};
use std::io::{BufRead, Write};
use std::process;
use std::sync::mpsc;

mod config;
mod console;
mod cpu;
mod error;
mod io;
#[cfg(feature = "keypad")]
mod keypad;
mod machine;
mod mem;
mod rom;

use crate::config::{Config, Options};
use crate::console::StepConsole;
use crate::error::LoadError;
use crate::io::ConsoleScreen;
use crate::machine::{Machine, Summary};
use crate::mem::{Memory, ADDRESS_SPACE};

fn main() {
  let matches = config::app().get_matches();
  let config = match Config::from_matches(&matches) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{}", e);
      eprintln!("{}", matches.usage());
      process::exit(1);
    }
  };

  init_logger(config.options.debug);

  if let Err(e) = run(&config) {
    eprintln!("Error: {:#}", e);
    process::exit(1);
  }
}

/// `debug=true` raises the default filter; `RUST_LOG` still wins.
fn init_logger(debug: bool) {
  let level = if debug { "debug" } else { "info" };
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or(level),
  )
  .format_timestamp(None)
  .init();
}

/// Place `image` in a `size` byte address space. An image that does not
/// fit grows the address space only if `grow` is set or the operator agrees.
fn load_memory<R: BufRead, W: Write>(
  image: &[u8],
  size: usize,
  grow: bool,
  input: &mut R,
  out: &mut W,
) -> Result<Memory> {
  match Memory::load(image, size, grow) {
    Ok(mem) => Ok(mem),
    Err(LoadError::TooLarge { .. }) => {
      let grow = console::confirm(
        input,
        out,
        "Size of program has exceeded memory of physical device. Continue",
      )?;
      if !grow {
        bail!("program of {} bytes does not fit", image.len());
      }
      Ok(Memory::load(image, size, true)?)
    }
    Err(e) => Err(e.into()),
  }
}

fn run(config: &Config) -> Result<()> {
  let Options {
    debug,
    step,
    screen,
    keyboard,
  } = config.options;
  info!("Debug value: {}", debug);
  info!("Step value: {}", step);
  info!("Screen value: {}", screen);
  info!("Keyboard value: {}", keyboard);

  let image = rom::load(&config.program, config.format)?;
  let mem = {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    load_memory(
      &image,
      ADDRESS_SPACE,
      config.grow,
      &mut stdin.lock(),
      &mut stdout.lock(),
    )?
  };
  info!("RAM size: {}", mem.size());

  let mut machine = Machine::new(mem, config.options)
    .with_screen(Box::new(ConsoleScreen::new(std::io::stdout())));

  if step {
    println!("Press ENTER to step through the program");
    println!("Type double backslash '\\\\' then ENTER to exit");
    machine = machine.with_stepper(Box::new(StepConsole::stdin()));
  }

  let summary = if keyboard {
    let (tx, rx) = mpsc::channel();
    machine = machine.with_keys(Box::new(rx));
    run_with_keypad(machine, tx, step)?
  } else {
    finish(&mut machine)?
  };
  println!(
    "Executed {} instructions, PC 0x{:04x} ({:?})",
    summary.count, summary.pc, summary.stop
  );
  Ok(())
}

fn finish(machine: &mut Machine) -> Result<Summary> {
  match machine.run() {
    Ok(summary) => Ok(summary),
    Err(fault) => bail!(
      "{} (after {} instructions, fault at 0x{:04x})",
      fault,
      machine.count(),
      fault.pc()
    ),
  }
}

/// The keypad window owns the main thread, so the machine moves to a
/// worker thread for the length of the run. Closing the window stops the
/// machine.
#[cfg(feature = "keypad")]
fn run_with_keypad(
  mut machine: Machine,
  keys: mpsc::Sender<u8>,
  _step: bool,
) -> Result<Summary> {
  let stop = machine.stop_handle();
  let worker = std::thread::spawn(move || finish(&mut machine));
  let shown = keypad::run(keys, || worker.is_finished());
  stop.store(true, std::sync::atomic::Ordering::Relaxed);
  shown?;
  match worker.join() {
    Ok(result) => result,
    Err(_) => bail!("machine thread panicked"),
  }
}

/// Without a keypad window, hex digits typed on stdin are keypresses,
/// unless the step console is already reading stdin.
#[cfg(not(feature = "keypad"))]
fn run_with_keypad(
  mut machine: Machine,
  keys: mpsc::Sender<u8>,
  step: bool,
) -> Result<Summary> {
  if step {
    warn!("step mode owns stdin; the console keypad is off");
    drop(keys);
  } else {
    info!("Console keypad: type hex digits then ENTER");
    console::spawn_keypad(keys);
  }
  finish(&mut machine)
}
