pub mod api;
pub mod kinds;
pub mod player;

pub use api::{NewPlayer, PlayerOrder, PlayerPatch, PlayerQuery};
pub use kinds::{Profession, Race};
pub use player::Player;
