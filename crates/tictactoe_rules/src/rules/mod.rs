//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are separated from
//! board storage so the state machine and the reply verifier share them.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full, is_settled_draw};
pub use win::{LINES, check_winner};
