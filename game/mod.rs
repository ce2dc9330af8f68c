//! This file is only compiled when the dyn feature is disabled

mod city;
mod city_drift;
mod messages;
mod player;

pub use self::city_drift::{NAME, INITIAL_SIZE};
use self::city_drift::CityDrift;

pub fn create_game() -> CityDrift {
    CityDrift::new()
}
