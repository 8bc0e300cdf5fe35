//! Gamepad (JOYP) functions and structures.

use crate::{consts::JOYP_ADDR, warnln};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub struct Pad {
    down: bool,
    up: bool,
    left: bool,
    right: bool,
    start: bool,
    select: bool,
    b: bool,
    a: bool,
    selection: PadSelection,
    int_pad: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PadSelection {
    None,
    Action,
    Direction,
    Both,
}

/// Enumeration of the physical buttons of the Game Boy,
/// the discriminant values are part of the host ABI and
/// must remain stable.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadKey {
    Right = 0,
    Left = 1,
    Up = 2,
    Down = 3,
    A = 4,
    B = 5,
    Select = 6,
    Start = 7,
}

impl PadKey {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => PadKey::Right,
            1 => PadKey::Left,
            2 => PadKey::Up,
            3 => PadKey::Down,
            4 => PadKey::A,
            5 => PadKey::B,
            6 => PadKey::Select,
            _ => PadKey::Start,
        }
    }
}

impl Pad {
    pub fn new() -> Self {
        Self {
            down: false,
            up: false,
            left: false,
            right: false,
            start: false,
            select: false,
            b: false,
            a: false,
            selection: PadSelection::None,
            int_pad: false,
        }
    }

    pub fn reset(&mut self) {
        self.down = false;
        self.up = false;
        self.left = false;
        self.right = false;
        self.start = false;
        self.select = false;
        self.b = false;
        self.a = false;
        self.selection = PadSelection::None;
        self.int_pad = false;
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            JOYP_ADDR => {
                let mut value = 0x0f;
                if self.selection == PadSelection::Action
                    || self.selection == PadSelection::Both
                {
                    value &= if self.a { 0x00 } else { 0x01 }
                        | if self.b { 0x00 } else { 0x02 }
                        | if self.select { 0x00 } else { 0x04 }
                        | if self.start { 0x00 } else { 0x08 };
                }
                if self.selection == PadSelection::Direction
                    || self.selection == PadSelection::Both
                {
                    value &= if self.right { 0x00 } else { 0x01 }
                        | if self.left { 0x00 } else { 0x02 }
                        | if self.up { 0x00 } else { 0x04 }
                        | if self.down { 0x00 } else { 0x08 };
                }
                // the select bits are visible as written and the two
                // upper bits of the register always read as one
                value |= match self.selection {
                    PadSelection::None => 0x30,
                    PadSelection::Action => 0x10,
                    PadSelection::Direction => 0x20,
                    PadSelection::Both => 0x00,
                };
                value | 0xc0
            }
            _ => {
                warnln!("Reading from unknown Pad location 0x{:04x}", addr);
                0xff
            }
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            JOYP_ADDR => {
                let action = value & 0x20 == 0x00;
                let direction = value & 0x10 == 0x00;
                self.selection = match (action, direction) {
                    (true, true) => PadSelection::Both,
                    (true, false) => PadSelection::Action,
                    (false, true) => PadSelection::Direction,
                    (false, false) => PadSelection::None,
                }
            }
            _ => warnln!("Writing to unknown Pad location 0x{:04x}", addr),
        }
    }

    pub fn key_press(&mut self, key: PadKey) {
        match key {
            PadKey::Up => self.up = true,
            PadKey::Down => self.down = true,
            PadKey::Left => self.left = true,
            PadKey::Right => self.right = true,
            PadKey::Start => self.start = true,
            PadKey::Select => self.select = true,
            PadKey::A => self.a = true,
            PadKey::B => self.b = true,
        }
        self.int_pad = true;
    }

    pub fn key_lift(&mut self, key: PadKey) {
        match key {
            PadKey::Up => self.up = false,
            PadKey::Down => self.down = false,
            PadKey::Left => self.left = false,
            PadKey::Right => self.right = false,
            PadKey::Start => self.start = false,
            PadKey::Select => self.select = false,
            PadKey::A => self.a = false,
            PadKey::B => self.b = false,
        }
    }

    #[inline(always)]
    pub fn int_pad(&self) -> bool {
        self.int_pad
    }

    #[inline(always)]
    pub fn set_int_pad(&mut self, value: bool) {
        self.int_pad = value;
    }

    #[inline(always)]
    pub fn ack_pad(&mut self) {
        self.set_int_pad(false);
    }
}

impl Default for Pad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Pad, PadKey};
    use crate::consts::JOYP_ADDR;

    #[test]
    fn test_matrix_selection() {
        let mut pad = Pad::new();
        pad.key_press(PadKey::A);
        pad.key_press(PadKey::Down);

        pad.write(JOYP_ADDR, 0x10);
        assert_eq!(pad.read(JOYP_ADDR), 0xde);

        pad.write(JOYP_ADDR, 0x20);
        assert_eq!(pad.read(JOYP_ADDR), 0xe7);

        pad.write(JOYP_ADDR, 0x30);
        assert_eq!(pad.read(JOYP_ADDR), 0xff);
    }

    #[test]
    fn test_key_press_interrupt() {
        let mut pad = Pad::new();
        assert!(!pad.int_pad());
        pad.key_press(PadKey::Start);
        assert!(pad.int_pad());
        pad.ack_pad();
        pad.key_lift(PadKey::Start);
        assert!(!pad.int_pad());
    }
}
