//! Input source replaying a fixed event script
//!
//! Each entry of the script is applied on one frame. Once the script runs
//! out the source either idles or asks the loop to quit.

use std::collections::VecDeque;

use super::{InputSource, InputState, KeyCode, MouseButtons};

/// One platform event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Key went down
    KeyDown(KeyCode),
    /// Key went up
    KeyUp(KeyCode),
    /// Buttons went down
    ButtonDown(MouseButtons),
    /// Buttons went up
    ButtonUp(MouseButtons),
    /// Pointer moved to client coordinates
    PointerMoved(i32, i32),
    /// Window closed
    Quit,
}

/// Headless [`InputSource`]
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
    quit_when_done: bool,
}

impl ScriptedInput {
    /// Empty script that idles forever
    pub fn new() -> Self {
        Self::default()
    }

    /// Quit once every scripted frame has been applied
    #[must_use]
    pub fn then_quit(mut self) -> Self {
        self.quit_when_done = true;
        self
    }

    /// Append one frame of events
    #[must_use]
    pub fn frame(mut self, events: impl IntoIterator<Item = InputEvent>) -> Self {
        self.frames.push_back(events.into_iter().collect());
        self
    }

    /// Append `count` frames without events
    #[must_use]
    pub fn idle(mut self, count: usize) -> Self {
        self.frames.extend(std::iter::repeat_with(Vec::new).take(count));
        self
    }

    /// Press `key` for one frame
    #[must_use]
    pub fn tap(self, key: KeyCode) -> Self {
        self.frame([InputEvent::KeyDown(key)]).frame([InputEvent::KeyUp(key)])
    }

    /// Hold `key` for `frames` frames
    #[must_use]
    pub fn hold(self, key: KeyCode, frames: usize) -> Self {
        self.frame([InputEvent::KeyDown(key)])
            .idle(frames.saturating_sub(1))
            .frame([InputEvent::KeyUp(key)])
    }

    /// Left click at a client position
    #[must_use]
    pub fn click(self, x: i32, y: i32) -> Self {
        self.frame([InputEvent::PointerMoved(x, y), InputEvent::ButtonDown(MouseButtons::LEFT)])
            .frame([InputEvent::ButtonUp(MouseButtons::LEFT)])
    }

    /// Frames not yet applied
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn pump(&mut self, input: &mut InputState) -> bool {
        let Some(events) = self.frames.pop_front() else {
            return !self.quit_when_done;
        };
        for event in events {
            match event {
                InputEvent::KeyDown(key) => input.set_key(key, true),
                InputEvent::KeyUp(key) => input.set_key(key, false),
                InputEvent::ButtonDown(buttons) => input.set_buttons(buttons, true),
                InputEvent::ButtonUp(buttons) => input.set_buttons(buttons, false),
                InputEvent::PointerMoved(x, y) => input.set_pointer(x, y),
                InputEvent::Quit => {
                    log::info!("Quit requested");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_one_frame_per_pump() {
        let mut source = ScriptedInput::new().tap(KeyCode::Enter).then_quit();
        let mut input = InputState::new();

        assert!(source.pump(&mut input));
        assert!(input.key_pressed(KeyCode::Enter));
        input.end_frame();

        assert!(source.pump(&mut input));
        assert!(input.key_released(KeyCode::Enter));
        input.end_frame();

        assert!(!source.pump(&mut input));
    }

    #[test]
    fn test_click_moves_pointer() {
        let mut source = ScriptedInput::new().click(320, 100);
        let mut input = InputState::new();
        source.pump(&mut input);
        assert_eq!(input.pointer(), (320, 100));
        assert!(input.button_pressed(MouseButtons::LEFT));
        assert_eq!(source.remaining(), 1);
    }

    #[test]
    fn test_quit_event_stops_loop() {
        let mut source = ScriptedInput::new().frame([InputEvent::Quit]);
        assert!(!source.pump(&mut InputState::new()));
        // idles afterwards
        assert!(source.pump(&mut InputState::new()));
    }
}
