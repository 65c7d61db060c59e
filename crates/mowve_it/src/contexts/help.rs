use mowve_engine::foundation::math::{colour, Rect};
use mowve_engine::input::KeyCode;
use mowve_engine::scene::{ObjectError, ObjectRegistry, ObjectState};

use crate::commands::Command;
use crate::frame::{Frame, Scope};
use crate::objects::{Core, GameObject};

const CLEAR: u32 = 0xffff_8888;
const PAGE_TOP: i32 = 192;

const INTRO: &str = "Welcome to Mowve It.\n\
Press ESC to return to the Main Menu.\n\
Use the ARROW keys < > to navigate pages.";

const PAGES: [&str; 7] = [
    "This game is about lawn mowing. Enter the game using the\n\
'New Game' button.\n\
The game begins with a small lawn, at the centre of which\n\
resides a lawn mower.\n\
This is the 'Mower Mover'.\n\
Use WASD or the ARROW keys to move the lawn mower and cut\n\
the grass.\n\n\
(1/7, goto next page)",
    "Numbers '1', '2' and '3' allow you to switch\n\
between mowers.\n\
'1' toggles Mower Mini. This is the fastest of all of the\n\
mowers but cuts little grass. It is also relatively\n\
difficult to control.\n\
'2' toggles Mower Mover.\n\
'3' toggles Mower Monster. This is a large mower and cuts\n\
the most grass. Mower Monster is the slowest of all mowers.\n\n\
(2/7, goto next page)",
    "The SPACE bar allows you to alternate between two\n\
viewing angles. Select whichever is best for your\n\
gameplay.\n\n\
(3/7, goto next page)",
    "Your objective is to mow the lawn. All the grass must be cut\n\
before proceeding to the next level.\n\n\
(4/7, goto next page)",
    "Collect the gnomes and avoid the ornaments. Gnomes award points\n\
whereas the ornaments (time dials) deduct points.\n\n\
Do not hit more than two ornaments, else you will\n\
lose the game.\n\n\
(5/7, goto next page)",
    "Occasionally Mole Hills will appear. These slow the mower\n\
but award points and extra time if completely flattened.\n\n\
(6/7, goto next page)",
    "If all the grass is not cut within the set time, you will lose\n\
the game.\n\n\
Good luck.",
];

/// How-to-play screen paged with the arrow keys
#[derive(Debug)]
pub struct HelpPages {
    pub(super) core: Core,
    pub(super) children: ObjectRegistry<GameObject>,
    page: usize,
}

impl Default for HelpPages {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPages {
    /// Help opened at the first page
    pub fn new() -> Self {
        let mut help = Self {
            core: Core::new(),
            children: ObjectRegistry::new(),
            page: 0,
        };
        help.initialise();
        help
    }

    /// Zero-based page shown
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Text of the page shown
    pub fn page_text(&self) -> &'static str {
        PAGES[self.page]
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.page = 0;
    }

    pub(super) fn create(&mut self) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)
    }

    pub(super) fn destroy(mut self, frame: &mut Frame<'_>) {
        self.core.step_or_log(ObjectState::Destroying);
        self.children.destroy_all(&mut Scope::menu(frame));
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn handle_input(&mut self, frame: &mut Frame<'_>) {
        let input = frame.services.input;
        if input.key_pressed(KeyCode::Escape) {
            frame.request(Command::ShowMainMenu);
        }
        if input.key_pressed(KeyCode::Left) {
            self.page = self.page.saturating_sub(1);
        }
        if input.key_pressed(KeyCode::Right) {
            self.page = (self.page + 1).min(PAGES.len() - 1);
        }
    }

    pub(super) fn render(&self, frame: &mut Frame<'_>) {
        let viewport = frame.services.viewport();
        let renderer = &mut frame.services.renderer;
        renderer.clear(CLEAR);
        let intro = Rect::new(16, 16, viewport.right, viewport.bottom);
        renderer.draw_text(INTRO, intro, colour::BLACK);
        renderer.draw_text(self.page_text(), Rect { top: PAGE_TOP, ..intro }, colour::BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn press(harness: &mut Harness, help: &mut HelpPages, key: KeyCode) {
        harness.input.set_key(key, true);
        help.handle_input(&mut harness.frame());
        harness.input.end_frame();
        harness.input.set_key(key, false);
        harness.input.end_frame();
    }

    #[test]
    fn test_pages_clamp_at_both_ends() {
        let mut harness = Harness::new();
        let mut help = HelpPages::new();

        press(&mut harness, &mut help, KeyCode::Left);
        assert_eq!(help.page(), 0);
        for _ in 0..10 {
            press(&mut harness, &mut help, KeyCode::Right);
        }
        assert_eq!(help.page(), 6);
        assert!(help.page_text().ends_with("Good luck."));
        press(&mut harness, &mut help, KeyCode::Left);
        assert_eq!(help.page(), 5);
        assert!(harness.requests.is_empty());
    }

    #[test]
    fn test_escape_returns_to_menu() {
        let mut harness = Harness::new();
        let mut help = HelpPages::new();
        press(&mut harness, &mut help, KeyCode::Escape);
        assert_eq!(harness.requests.drain(), vec![Command::ShowMainMenu]);
    }

    #[test]
    fn test_render_draws_intro_and_page() {
        let mut harness = Harness::new();
        let help = HelpPages::new();
        help.render(&mut harness.frame());
        let text = harness.renderer.frame_text();
        assert_eq!(text.len(), 2);
        assert!(text[1].starts_with("This game is about lawn mowing."));
    }
}
