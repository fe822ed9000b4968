//! Exit codes for `sns-validate`.
//! These codes are part of the public contract; scripts branch on them.
//!
//! Rejections use the code of the failing check (see
//! `ValidationError::exit_code`). The constants here cover everything else.

pub const SUCCESS: i32 = 0;
pub const USAGE: i32 = 64; // Bad flags or invalid configuration
pub const NO_INPUT: i32 = 66; // Input file missing or unreadable
