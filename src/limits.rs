//! Resource caps.
//!
//! Smileys are rendered as inline objects only up to these counts; past
//! them the token text is inserted literally.

/// Smiley objects created by a single insertion of markup.
pub const MAX_SMILEYS_PER_INSERT: usize = 30;

/// Smiley objects alive in one buffer, reset when text is deleted.
pub const MAX_SMILEYS_TOTAL: usize = 300;

/// Largest `SIZE=` value parsed before clamping to the font scale.
pub const MAX_SIZE_ATTRIBUTE: i32 = 100;
