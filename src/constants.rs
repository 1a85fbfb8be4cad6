//! Constants for board dimensions and move-record sentinels.
//!
//! # Board Size Configuration
//!
//! The default board size is controlled by Cargo features:
//! - `board19x19` (default): 19x19 board
//! - `board13x13`: 13x13 board
//! - `board9x9`: 9x9 board
//!
//! To compile for a specific board size:
//! ```sh
//! cargo build                                              # 19x19 (default)
//! cargo build --no-default-features --features board9x9    # 9x9
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Standard Go sizes are 9, 13, or 19.
#[cfg(feature = "board19x19")]
pub const N: usize = 19;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

#[cfg(feature = "board9x9")]
pub const N: usize = 9;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(any(
    all(feature = "board19x19", feature = "board13x13"),
    all(feature = "board19x19", feature = "board9x9"),
    all(feature = "board13x13", feature = "board9x9"),
))]
compile_error!("Enable only one of the 'board9x9', 'board13x13' and 'board19x19' features");

#[cfg(not(any(feature = "board9x9", feature = "board13x13", feature = "board19x19")))]
compile_error!("Must enable exactly one board size feature: 'board9x9', 'board13x13' or 'board19x19'");

/// Column letters used for vertices. 'I' is skipped by Go convention.
pub const COLUMN_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Move Record Sentinels
// =============================================================================

/// Fixed id of every tree's root node.
pub const ROOT_NODE_ID: &str = "0";

/// Coordinate stored on the root node, meaning "no stone".
pub const ROOT_COORD: i32 = -1;

/// Starting value of the tree's running move counter.
pub const DEFAULT_TOTAL_MOVE_NUMBER: u32 = 0;

/// Largest move counter or depth a loaded record may carry. Far above any
/// real game, and low enough that adding moves can never overflow a `u32`.
pub const MAX_MOVE_NUMBER: u32 = i32::MAX as u32;
