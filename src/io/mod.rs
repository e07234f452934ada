//! Channels between the machine and its peripherals.

mod key;

pub use self::key::Key;

use std::io::Write;
use std::sync::mpsc;

/// Sink for the write-screen special function. What a pair means is up to
/// the screen; the console screen treats it as (cell, value).
pub trait Screen {
  fn write(&mut self, cell: u8, value: u8);
}

/// Source of keypress bytes. Polling never blocks; `None` means no byte is
/// pending right now.
pub trait KeySource {
  fn poll(&mut self) -> Option<u8>;
}

/// Forwards writes to whoever holds the receiving end. A dropped receiver
/// discards them.
impl Screen for mpsc::Sender<(u8, u8)> {
  fn write(&mut self, cell: u8, value: u8) {
    if self.send((cell, value)).is_err() {
      debug!("screen receiver gone, dropped ({:02x}, {:02x})", cell, value);
    }
  }
}

/// Prints each screen write on its own line.
pub struct ConsoleScreen<W: Write> {
  out: W,
}

impl<W: Write> ConsoleScreen<W> {
  pub fn new(out: W) -> ConsoleScreen<W> {
    ConsoleScreen { out }
  }

  #[cfg(test)]
  pub fn into_inner(self) -> W {
    self.out
  }
}

impl<W: Write> Screen for ConsoleScreen<W> {
  fn write(&mut self, cell: u8, value: u8) {
    let shown = if value.is_ascii_graphic() || value == b' ' {
      value as char
    } else {
      '.'
    };
    let res = writeln!(self.out, "[screen {:02x}] {:02x} {}", cell, value, shown);
    if let Err(e) = res.and_then(|_| self.out.flush()) {
      warn!("screen write failed: {}", e);
    }
  }
}

impl KeySource for mpsc::Receiver<u8> {
  fn poll(&mut self) -> Option<u8> {
    match self.try_recv() {
      Ok(b) => Some(b),
      Err(mpsc::TryRecvError::Empty) => None,
      // A keypad that went away just stops producing keys.
      Err(mpsc::TryRecvError::Disconnected) => None,
    }
  }
}
