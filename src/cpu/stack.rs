use std::fmt;

/// Number of slots in the hardware return-address stack.
pub const DEPTH: usize = 16;

/// Return-stack pointer outside `0..DEPTH`. The ring absorbs it, so this is
/// reported and execution goes on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Advisory {
  Overflow(i64),
  Underflow(i64),
}

impl fmt::Display for Advisory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Advisory::Overflow(ptr) => {
        write!(f, "Address stack pointer overflow: {}", ptr)
      }
      Advisory::Underflow(ptr) => {
        write!(f, "Address stack pointer underflow: {}", ptr)
      }
    }
  }
}

/// Hardware return-address stack.
///
/// A fixed ring of 16 slots. The pointer counts outstanding calls and is
/// never clamped: the 17th nested call reuses slot 0 and silently replaces
/// the oldest frame, and returning with no outstanding call reads whatever
/// slot the pointer wraps onto.
#[derive(Debug, Eq, PartialEq)]
pub struct ReturnStack {
  slots: [usize; DEPTH],
  ptr: i64,
}

impl ReturnStack {
  pub fn new() -> ReturnStack {
    ReturnStack {
      slots: [0; DEPTH],
      ptr: 0,
    }
  }

  fn index(&self) -> usize {
    self.ptr.rem_euclid(DEPTH as i64) as usize
  }

  pub fn push(&mut self, addr: usize) {
    let idx = self.index();
    self.slots[idx] = addr;
    self.ptr += 1;
  }

  pub fn pop(&mut self) -> usize {
    self.ptr -= 1;
    self.slots[self.index()]
  }

  /// Call depth, which may sit outside `0..DEPTH` after overflow or
  /// underflow.
  pub fn ptr(&self) -> i64 {
    self.ptr
  }

  #[cfg(test)]
  pub fn slot(&self, idx: usize) -> usize {
    self.slots[idx % DEPTH]
  }

  /// Checked before a call and after a return.
  pub fn advisory(&self) -> Option<Advisory> {
    if self.ptr >= DEPTH as i64 {
      Some(Advisory::Overflow(self.ptr))
    } else if self.ptr < 0 {
      Some(Advisory::Underflow(self.ptr))
    } else {
      None
    }
  }
}
