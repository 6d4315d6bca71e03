//! Bounds and defaults shared by the player rules and the HTTP surface.

/// Player name length bounds, in characters.
pub const NAME_MIN_LEN: usize = 1;
pub const NAME_MAX_LEN: usize = 12;

/// Player title length bounds, in characters.
pub const TITLE_MIN_LEN: usize = 1;
pub const TITLE_MAX_LEN: usize = 30;

/// Cumulative experience bounds.
pub const EXPERIENCE_MIN: i32 = 0;
pub const EXPERIENCE_MAX: i32 = 10_000_000;

/// Birthday calendar year bounds (UTC), inclusive.
pub const BIRTHDAY_YEAR_MIN: i32 = 2000;
pub const BIRTHDAY_YEAR_MAX: i32 = 3000;

/// Paging defaults for list queries.
pub const DEFAULT_PAGE_NUMBER: i32 = 0;
pub const DEFAULT_PAGE_SIZE: i32 = 3;
