//! Interaction with the operator over stdin.

use std::io::{self, BufRead, BufReader, Write};
use std::sync::mpsc::Sender;
use std::thread;

use crate::io::Key;

/// What the operator asked for between two instructions.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Step {
  Continue,
  Abort,
}

pub trait Stepper {
  /// Block until the operator lets the next instruction run.
  fn wait(&mut self) -> io::Result<Step>;
}

/// Single-step console. Each line continues; a line containing a backslash
/// aborts the run, as does the end of input.
pub struct StepConsole<R: BufRead> {
  input: R,
}

impl<R: BufRead> StepConsole<R> {
  pub fn new(input: R) -> StepConsole<R> {
    StepConsole { input }
  }
}

impl StepConsole<BufReader<io::Stdin>> {
  pub fn stdin() -> Self {
    StepConsole::new(BufReader::new(io::stdin()))
  }
}

impl<R: BufRead> Stepper for StepConsole<R> {
  fn wait(&mut self) -> io::Result<Step> {
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Ok(Step::Abort);
    }
    if line.contains('\\') {
      Ok(Step::Abort)
    } else {
      Ok(Step::Continue)
    }
  }
}

/// Ask a yes/no question. Only an answer starting with `y` agrees.
pub fn confirm<R: BufRead, W: Write>(
  input: &mut R,
  out: &mut W,
  question: &str,
) -> io::Result<bool> {
  write!(out, "{} (y/n)? ", question)?;
  out.flush()?;
  let mut answer = String::new();
  input.read_line(&mut answer)?;
  Ok(answer.trim_start().starts_with(|c| c == 'y' || c == 'Y'))
}

/// Send the key code of every hex digit in `input` down `keys`. Returns
/// when the input ends or nobody is listening any more.
pub fn feed_keys<R: BufRead>(input: R, keys: &Sender<u8>) -> io::Result<()> {
  for line in input.lines() {
    for key in line?.chars().filter_map(Key::from_char) {
      debug!("Console key {:?}", key);
      if keys.send(key.code()).is_err() {
        return Ok(());
      }
    }
  }
  Ok(())
}

/// Console keypad: hex digits typed on stdin are keypresses.
pub fn spawn_keypad(keys: Sender<u8>) -> thread::JoinHandle<()> {
  thread::spawn(move || {
    let stdin = io::stdin();
    if let Err(e) = feed_keys(stdin.lock(), &keys) {
      warn!("console keypad stopped: {}", e);
    }
  })
}
