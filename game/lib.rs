//! This file is only compiled when the dyn feature is enabled

mod city;
mod messages;
mod player;

use ::interface::expose_game_reloadably;

expose_game_reloadably!{"game"/city_drift::CityDrift = "game"}
