use crate::error::LoadError;

/// Default size of the address space: 16 bits.
pub const ADDRESS_SPACE: usize = 0x10000;

/// Fill value for memory not covered by the program image. It decodes to
/// an undefined opcode, so running past the end of a program traps.
pub const TRAP: u8 = 0xd0;

#[derive(Debug)]
pub struct Memory {
  ram: Vec<u8>,
}

impl Memory {
  /// A blank address space of `size` bytes, filled with `TRAP`.
  pub fn new(size: usize) -> Result<Memory, LoadError> {
    if size == 0 {
      return Err(LoadError::Empty);
    }
    Ok(Memory {
      ram: vec![TRAP; size],
    })
  }

  /// Load `image` at address 0 of an address space of `size` bytes.
  ///
  /// An image larger than `size` is rejected unless `grow` is set, in which
  /// case the address space is enlarged to exactly the image length.
  pub fn load(
    image: &[u8],
    size: usize,
    grow: bool,
  ) -> Result<Memory, LoadError> {
    if image.len() > size && !grow {
      return Err(LoadError::TooLarge {
        len: image.len(),
        limit: size,
      });
    }
    let mut mem = Memory::new(size.max(image.len()))?;
    mem.ram[..image.len()].copy_from_slice(image);
    Ok(mem)
  }

  /// Size of the address space.
  pub fn size(&self) -> usize {
    self.ram.len()
  }

  /// Fold `addr` into the address space.
  pub fn wrap(&self, addr: usize) -> usize {
    addr % self.ram.len()
  }

  /// Read a byte at address `addr`.
  pub fn rb(&self, addr: usize) -> u8 {
    self.ram[self.wrap(addr)]
  }

  /// Write `value` at address `addr`.
  pub fn wb(&mut self, addr: usize, value: u8) {
    let idx = self.wrap(addr);
    self.ram[idx] = value;
  }

  /// Read a 2-byte big-endian word from `addr`.
  pub fn rw(&self, addr: usize) -> u16 {
    let hi = u16::from(self.rb(addr));
    let lo = u16::from(self.rb(addr.wrapping_add(1)));
    (hi << 8) | lo
  }

  /// Write an arbitrary number of bytes to memory.
  pub fn write(&mut self, addr: usize, values: &[u8]) {
    for (i, v) in values.iter().enumerate() {
      self.wb(addr.wrapping_add(i), *v);
    }
  }

  /// Read `len` bytes starting at `addr`.
  pub fn read(&self, addr: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| self.rb(addr.wrapping_add(i))).collect()
  }
}
