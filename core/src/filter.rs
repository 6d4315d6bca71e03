//! Composition of optional list/count constraints into a single predicate.
//!
//! Each query parameter contributes at most one [`Criterion`]. Absent
//! parameters contribute nothing, and the resulting [`PlayerFilter`] matches a
//! player only when every criterion does.

use crate::types::{Player, PlayerQuery, Profession, Race};

/// Inclusive bound built from an optional minimum and maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound<T> {
    AtLeast(T),
    AtMost(T),
    Between(T, T),
}

impl<T: PartialOrd + Copy> RangeBound<T> {
    /// `None` when neither bound is given.
    pub fn from_bounds(min: Option<T>, max: Option<T>) -> Option<Self> {
        match (min, max) {
            (None, None) => None,
            (Some(min), None) => Some(RangeBound::AtLeast(min)),
            (None, Some(max)) => Some(RangeBound::AtMost(max)),
            (Some(min), Some(max)) => Some(RangeBound::Between(min, max)),
        }
    }

    pub fn contains(&self, value: T) -> bool {
        match *self {
            RangeBound::AtLeast(min) => value >= min,
            RangeBound::AtMost(max) => value <= max,
            RangeBound::Between(min, max) => min <= value && value <= max,
        }
    }
}

/// A single constraint on a player record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    NameContains(String),
    TitleContains(String),
    RaceIs(Race),
    ProfessionIs(Profession),
    BirthdayIn(RangeBound<i64>),
    BannedIs(bool),
    ExperienceIn(RangeBound<i32>),
    LevelIn(RangeBound<i32>),
}

impl Criterion {
    pub fn matches(&self, player: &Player) -> bool {
        match self {
            Criterion::NameContains(part) => player.name.contains(part.as_str()),
            Criterion::TitleContains(part) => player.title.contains(part.as_str()),
            Criterion::RaceIs(race) => player.race == *race,
            Criterion::ProfessionIs(profession) => player.profession == *profession,
            Criterion::BirthdayIn(range) => range.contains(player.birthday),
            Criterion::BannedIs(banned) => player.banned == *banned,
            Criterion::ExperienceIn(range) => range.contains(player.experience),
            Criterion::LevelIn(range) => range.contains(player.level),
        }
    }
}

/// AND-combination of criteria. The empty filter matches every player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    criteria: Vec<Criterion>,
}

impl PlayerFilter {
    pub fn builder() -> PlayerFilterBuilder {
        PlayerFilterBuilder::default()
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.criteria
            .iter()
            .all(|criterion| criterion.matches(player))
    }

    /// Adds one more criterion to the conjunction.
    pub fn and(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }
}

impl From<&PlayerQuery> for PlayerFilter {
    fn from(query: &PlayerQuery) -> Self {
        PlayerFilter::builder()
            .name(query.name.clone())
            .title(query.title.clone())
            .race(query.race)
            .profession(query.profession)
            .birthday(query.after, query.before)
            .banned(query.banned)
            .experience(query.min_experience, query.max_experience)
            .level(query.min_level, query.max_level)
            .build()
    }
}

/// Fluent builder whose setters ignore `None`.
#[derive(Debug, Default)]
pub struct PlayerFilterBuilder {
    filter: PlayerFilter,
}

impl PlayerFilterBuilder {
    fn push(mut self, criterion: Option<Criterion>) -> Self {
        if let Some(criterion) = criterion {
            self.filter = self.filter.and(criterion);
        }
        self
    }

    pub fn name(self, part: Option<String>) -> Self {
        self.push(part.map(Criterion::NameContains))
    }

    pub fn title(self, part: Option<String>) -> Self {
        self.push(part.map(Criterion::TitleContains))
    }

    pub fn race(self, race: Option<Race>) -> Self {
        self.push(race.map(Criterion::RaceIs))
    }

    pub fn profession(self, profession: Option<Profession>) -> Self {
        self.push(profession.map(Criterion::ProfessionIs))
    }

    /// `after` and `before` are epoch milliseconds, both inclusive.
    pub fn birthday(self, after: Option<i64>, before: Option<i64>) -> Self {
        self.push(RangeBound::from_bounds(after, before).map(Criterion::BirthdayIn))
    }

    pub fn banned(self, banned: Option<bool>) -> Self {
        self.push(banned.map(Criterion::BannedIs))
    }

    pub fn experience(self, min: Option<i32>, max: Option<i32>) -> Self {
        self.push(RangeBound::from_bounds(min, max).map(Criterion::ExperienceIn))
    }

    pub fn level(self, min: Option<i32>, max: Option<i32>) -> Self {
        self.push(RangeBound::from_bounds(min, max).map(Criterion::LevelIn))
    }

    pub fn build(self) -> PlayerFilter {
        self.filter
    }
}
