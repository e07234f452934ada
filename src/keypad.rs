//! Virtual 4x4 keypad window.
//!
//! Buttons are clicked with the mouse or pressed with the matching hex
//! digit key. Each press sends the button's code to the machine.

use anyhow::{Context, Result};
use minifb::{Key as WinKey, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use std::sync::mpsc::Sender;

use crate::io::Key;

const BUTTON_WIDTH: usize = 100;
const BUTTON_SPACING: usize = 20;
const EDGE_PADDING: usize = 10;
const PAD_WIDTH: usize = 4 * BUTTON_WIDTH + 3 * BUTTON_SPACING + 2 * EDGE_PADDING;

const UNCLICKED: u32 = 0xff_ff00_00;
const CLICKED: u32 = 0xff_00ff_00;
const BACKGROUND: u32 = 0xff_0000_00;

/// Grid cell under a pixel, if the pixel is on a button.
fn button_at(x: usize, y: usize) -> Option<(usize, usize)> {
  let cell = |p: usize| {
    let p = p.checked_sub(EDGE_PADDING)?;
    let stride = BUTTON_WIDTH + BUTTON_SPACING;
    if p % stride < BUTTON_WIDTH {
      Some(p / stride)
    } else {
      None
    }
  };
  match (cell(x)?, cell(y)?) {
    (c, r) if c < 4 && r < 4 => Some((c, r)),
    _ => None,
  }
}

fn render(buffer: &mut [u32], pressed: Option<(usize, usize)>) {
  for (i, px) in buffer.iter_mut().enumerate() {
    *px = match button_at(i % PAD_WIDTH, i / PAD_WIDTH) {
      Some(cell) if Some(cell) == pressed => CLICKED,
      Some(_) => UNCLICKED,
      None => BACKGROUND,
    };
  }
}

/// Run the keypad until its window closes, Escape is pressed, or `done`
/// reports the machine has finished.
pub fn run<F: Fn() -> bool>(keys: Sender<u8>, done: F) -> Result<()> {
  let mut window = Window::new(
    "Index keypad",
    PAD_WIDTH,
    PAD_WIDTH,
    WindowOptions::default(),
  )
  .context("failed to open the keypad window")?;
  window.set_target_fps(60);

  let mut buffer = vec![BACKGROUND; PAD_WIDTH * PAD_WIDTH];
  let mut held: Option<(usize, usize)> = None;

  while window.is_open() && !window.is_key_down(WinKey::Escape) && !done() {
    let mut sent = Vec::new();

    let clicked = if window.get_mouse_down(MouseButton::Left) {
      window
        .get_mouse_pos(MouseMode::Discard)
        .and_then(|(x, y)| button_at(x as usize, y as usize))
    } else {
      None
    };
    if clicked.is_some() && clicked != held {
      if let Some(key) = clicked.and_then(|(c, r)| Key::at(c, r)) {
        sent.push(key);
      }
    }
    held = clicked;

    for k in window.get_keys_pressed(KeyRepeat::No) {
      if let Some(key) = Key::from_code(k) {
        sent.push(key);
      }
    }

    for key in sent {
      debug!("Pressed {:?}", key);
      if keys.send(key.code()).is_err() {
        return Ok(());
      }
    }

    render(&mut buffer, held);
    window
      .update_with_buffer(&buffer, PAD_WIDTH, PAD_WIDTH)
      .context("failed to draw the keypad")?;
  }
  Ok(())
}
