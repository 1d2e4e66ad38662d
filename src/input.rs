use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

impl KeyCode {
    pub const W: Self = Self::Character('W');
    pub const A: Self = Self::Character('A');
    pub const S: Self = Self::Character('S');
    pub const D: Self = Self::Character('D');
    pub const ESCAPE: Self = Self::Named(NamedKey::Escape);

    /// Maps a winit key to the renderer's key space.
    pub fn from_winit(code: winit::event::VirtualKeyCode) -> Option<Self> {
        use winit::event::VirtualKeyCode as Key;
        Some(match code {
            Key::Space => Self::Named(NamedKey::Space),
            Key::Return => Self::Named(NamedKey::Enter),
            Key::Left => Self::Named(NamedKey::Left),
            Key::Right => Self::Named(NamedKey::Right),
            Key::Up => Self::Named(NamedKey::Up),
            Key::Down => Self::Named(NamedKey::Down),
            Key::Escape => Self::Named(NamedKey::Escape),
            Key::LShift => Self::Named(NamedKey::LeftShift),
            Key::RShift => Self::Named(NamedKey::RightShift),
            Key::LControl => Self::Named(NamedKey::LeftCtrl),
            Key::RControl => Self::Named(NamedKey::RightCtrl),
            Key::Key0 => Self::Digit(0),
            Key::Key1 => Self::Digit(1),
            Key::Key2 => Self::Digit(2),
            Key::Key3 => Self::Digit(3),
            Key::Key4 => Self::Digit(4),
            Key::Key5 => Self::Digit(5),
            Key::Key6 => Self::Digit(6),
            Key::Key7 => Self::Digit(7),
            Key::Key8 => Self::Digit(8),
            Key::Key9 => Self::Digit(9),
            Key::A => Self::Character('A'),
            Key::B => Self::Character('B'),
            Key::C => Self::Character('C'),
            Key::D => Self::Character('D'),
            Key::E => Self::Character('E'),
            Key::F => Self::Character('F'),
            Key::G => Self::Character('G'),
            Key::H => Self::Character('H'),
            Key::I => Self::Character('I'),
            Key::J => Self::Character('J'),
            Key::K => Self::Character('K'),
            Key::L => Self::Character('L'),
            Key::M => Self::Character('M'),
            Key::N => Self::Character('N'),
            Key::O => Self::Character('O'),
            Key::P => Self::Character('P'),
            Key::Q => Self::Character('Q'),
            Key::R => Self::Character('R'),
            Key::S => Self::Character('S'),
            Key::T => Self::Character('T'),
            Key::U => Self::Character('U'),
            Key::V => Self::Character('V'),
            Key::W => Self::Character('W'),
            Key::X => Self::Character('X'),
            Key::Y => Self::Character('Y'),
            Key::Z => Self::Character('Z'),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Escape,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
}

/// Keyboard and mouse state gathered from window events between frames.
///
/// Mouse motion accumulates until [`InputState::take_mouse_delta`] drains it,
/// so several motion events within one frame add up.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Adds raw pointer motion. Screen y grows downwards, so it is flipped to
    /// make upward motion positive.
    pub fn record_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, -dy);
    }

    /// Returns the motion accumulated since the last call and resets it.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Forgets held keys, used when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys.clear();
    }
}
