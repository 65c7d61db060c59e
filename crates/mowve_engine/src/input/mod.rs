//! Input state tracking
//!
//! [`InputState`] is the per-frame snapshot the game reads: held keys, the
//! pointer position and the mouse buttons. Button state is kept as a single
//! byte with the current frame in the low three bits and the previous frame
//! in the next three, so press and release edges fall out of a mask compare.
//!
//! An [`InputSource`] feeds platform events into the snapshot once per frame.

pub mod scripted;

use std::collections::HashSet;

use bitflags::bitflags;

pub use scripted::{InputEvent, ScriptedInput};

bitflags! {
    /// Mouse buttons as bits of the current-frame mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        /// Left button
        const LEFT = 0b100;
        /// Middle button
        const MIDDLE = 0b010;
        /// Right button
        const RIGHT = 0b001;
    }
}

const CURRENT_MASK: u8 = 0b000_111;
const PREVIOUS_SHIFT: u8 = 3;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// 1 key
    Num1,
    /// 2 key
    Num2,
    /// 3 key
    Num3,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Keyboard and mouse state for the current frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    previous_keys: HashSet<KeyCode>,
    mouse: u8,
    pointer: (i32, i32),
    previous_pointer: (i32, i32),
}

impl InputState {
    /// Empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down or up
    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if down {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Whether `key` is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Whether `key` went down this frame
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key) && !self.previous_keys.contains(&key)
    }

    /// Whether `key` went up this frame
    pub fn key_released(&self, key: KeyCode) -> bool {
        !self.keys.contains(&key) && self.previous_keys.contains(&key)
    }

    /// Record mouse buttons going down or up
    pub fn set_buttons(&mut self, buttons: MouseButtons, down: bool) {
        if down {
            self.mouse |= buttons.bits();
        } else {
            self.mouse &= !buttons.bits();
        }
    }

    /// Buttons held this frame
    pub fn buttons(&self) -> MouseButtons {
        MouseButtons::from_bits_truncate(self.mouse & CURRENT_MASK)
    }

    /// Buttons held last frame
    pub fn previous_buttons(&self) -> MouseButtons {
        MouseButtons::from_bits_truncate((self.mouse >> PREVIOUS_SHIFT) & CURRENT_MASK)
    }

    /// Whether any of `buttons` is held
    pub fn is_button_down(&self, buttons: MouseButtons) -> bool {
        self.buttons().intersects(buttons)
    }

    /// Whether any of `buttons` went down this frame
    pub fn button_pressed(&self, buttons: MouseButtons) -> bool {
        (self.buttons() - self.previous_buttons()).intersects(buttons)
    }

    /// Whether any of `buttons` went up this frame
    pub fn button_released(&self, buttons: MouseButtons) -> bool {
        (self.previous_buttons() - self.buttons()).intersects(buttons)
    }

    /// Raw button byte, previous frame in bits 3..6
    pub const fn button_mask(&self) -> u8 {
        self.mouse
    }

    /// Move the pointer in client coordinates
    pub fn set_pointer(&mut self, x: i32, y: i32) {
        self.pointer = (x, y);
    }

    /// Pointer position in client coordinates
    pub const fn pointer(&self) -> (i32, i32) {
        self.pointer
    }

    /// Pointer position at the end of the previous frame
    pub const fn previous_pointer(&self) -> (i32, i32) {
        self.previous_pointer
    }

    /// Roll the current frame into the previous one
    pub fn end_frame(&mut self) {
        let current = self.mouse & CURRENT_MASK;
        self.mouse = current | (current << PREVIOUS_SHIFT);
        self.previous_keys.clone_from(&self.keys);
        self.previous_pointer = self.pointer;
    }
}

/// Platform event feed
pub trait InputSource {
    /// Apply pending events to `input`; false once the user asked to quit
    fn pump(&mut self, input: &mut InputState) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_edges() {
        let mut input = InputState::new();
        input.set_buttons(MouseButtons::LEFT, true);
        assert!(input.button_pressed(MouseButtons::LEFT));
        assert!(!input.button_released(MouseButtons::LEFT));
        assert_eq!(input.button_mask(), 0b000_100);

        input.end_frame();
        assert_eq!(input.button_mask(), 0b100_100);
        assert!(input.is_button_down(MouseButtons::LEFT));
        assert!(!input.button_pressed(MouseButtons::LEFT));

        input.set_buttons(MouseButtons::LEFT, false);
        assert!(input.button_released(MouseButtons::LEFT));
        assert_eq!(input.previous_buttons(), MouseButtons::LEFT);

        input.end_frame();
        assert_eq!(input.button_mask(), 0);
    }

    #[test]
    fn test_buttons_are_independent() {
        let mut input = InputState::new();
        input.set_buttons(MouseButtons::LEFT | MouseButtons::RIGHT, true);
        input.end_frame();
        input.set_buttons(MouseButtons::RIGHT, false);
        assert!(input.is_button_down(MouseButtons::LEFT));
        assert!(input.button_released(MouseButtons::RIGHT));
        assert!(!input.button_released(MouseButtons::LEFT));
    }

    #[test]
    fn test_key_edges() {
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);
        assert!(input.key_pressed(KeyCode::Space));
        input.end_frame();
        assert!(input.is_key_down(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Space));
        input.set_key(KeyCode::Space, false);
        assert!(input.key_released(KeyCode::Space));
    }

    #[test]
    fn test_pointer_history() {
        let mut input = InputState::new();
        input.set_pointer(10, 20);
        assert_eq!(input.previous_pointer(), (0, 0));
        input.end_frame();
        input.set_pointer(30, 40);
        assert_eq!(input.previous_pointer(), (10, 20));
        assert_eq!(input.pointer(), (30, 40));
    }
}
