//! Pure functions deriving a player's level from cumulative experience.
//!
//! Level `n` is reached at `50 * n * (n + 1)` experience, so each level costs
//! 100 more than the previous one. The closed form below reproduces that curve
//! with truncating arithmetic.

/// Level reached with `experience` points.
///
/// `floor((sqrt(2500 + 200 * experience) - 50) / 100)`, truncated after the
/// subtraction and again by the integer division.
pub fn level_for_experience(experience: i32) -> i32 {
    let root = (2500.0 + 200.0 * f64::from(experience)).sqrt();
    (root - 50.0) as i32 / 100
}

/// Experience still missing before `level + 1` is reached.
pub fn until_next_level(experience: i32, level: i32) -> i32 {
    50 * (level + 1) * (level + 2) - experience
}

/// Both derived fields at once: `(level, until_next_level)`.
pub fn derive(experience: i32) -> (i32, i32) {
    let level = level_for_experience(experience);
    (level, until_next_level(experience, level))
}
