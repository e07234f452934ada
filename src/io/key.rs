/// Codes sent by the 16 keypad buttons, indexed by button number.
/// Buttons are numbered down each column, left column first.
pub const KEY_CODES: [u8; 16] = [
  0x00, 0x01, 0x02, 0x03, //
  0x04, 0x05, 0x06, 0x07, //
  0x08, 0x09, 0x0a, 0x0b, //
  0x0c, 0x0d, 0x0e, 0x0f,
];

/// A keypad button.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Key(u8);

impl Key {
  pub fn from_button(button: usize) -> Option<Key> {
    KEY_CODES.get(button).map(|&code| Key(code))
  }

  /// Button under grid position (`column`, `row`).
  #[cfg(any(test, feature = "keypad"))]
  pub fn at(column: usize, row: usize) -> Option<Key> {
    if column < 4 && row < 4 {
      Key::from_button(column * 4 + row)
    } else {
      None
    }
  }

  /// Console keypad: a hexadecimal digit selects the button with that code.
  pub fn from_char(c: char) -> Option<Key> {
    c.to_digit(16)
      .and_then(|d| KEY_CODES.iter().position(|&code| u32::from(code) == d))
      .and_then(Key::from_button)
  }

  #[cfg(feature = "keypad")]
  pub fn from_code(code: minifb::Key) -> Option<Key> {
    let digit = match code {
      minifb::Key::Key0 | minifb::Key::NumPad0 => '0',
      minifb::Key::Key1 | minifb::Key::NumPad1 => '1',
      minifb::Key::Key2 | minifb::Key::NumPad2 => '2',
      minifb::Key::Key3 | minifb::Key::NumPad3 => '3',
      minifb::Key::Key4 | minifb::Key::NumPad4 => '4',
      minifb::Key::Key5 | minifb::Key::NumPad5 => '5',
      minifb::Key::Key6 | minifb::Key::NumPad6 => '6',
      minifb::Key::Key7 | minifb::Key::NumPad7 => '7',
      minifb::Key::Key8 | minifb::Key::NumPad8 => '8',
      minifb::Key::Key9 | minifb::Key::NumPad9 => '9',
      minifb::Key::A => 'a',
      minifb::Key::B => 'b',
      minifb::Key::C => 'c',
      minifb::Key::D => 'd',
      minifb::Key::E => 'e',
      minifb::Key::F => 'f',
      _ => return None,
    };
    Key::from_char(digit)
  }

  pub fn code(self) -> u8 {
    self.0
  }
}
