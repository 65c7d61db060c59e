//! Deferred game commands
//!
//! Anything that swaps, pauses or tears down the active context is queued as
//! a [`Command`] and applied at the top of the next frame, outside every
//! context pass.

use crate::objects::MowerKind;

/// Why a level ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// The level timer ran out
    Timeout,
    /// An ornament was hit with no lives left
    NoLives,
}

/// Deferred request applied by the game between frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the active context with the main menu
    ShowMainMenu,
    /// Replace the active context with the help pages
    ShowHelp,
    /// Replace the active context with the options menu
    ShowOptions,
    /// Suspend the running level behind the pause menu
    Pause,
    /// Return from the pause menu to the suspended level
    Resume,
    /// Build level `n` (1-based)
    StartLevel(u8),
    /// Every grass tile of `level` was mowed
    LevelComplete {
        /// Finished level
        level: u8,
        /// Score carried forward
        score: u32,
    },
    /// The running level was lost
    GameOver {
        /// What ended it
        reason: GameOverReason,
        /// Final score
        score: u32,
    },
    /// The last level was completed
    EndGame {
        /// Final score
        score: u32,
    },
    /// Swap the player's mower, keeping its position and velocity
    SwitchMower(MowerKind),
    /// Stop the engine
    Quit,
}
