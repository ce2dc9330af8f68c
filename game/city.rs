use ::interface::game::Color;
use ::rand::{Rng, SeedableRng};
use ::rand_chacha::ChaCha8Rng;
use ::vecmath::{vec2_add, vec2_scale, vec2_sub};

pub const BUILDING_COUNT: usize = 100;
pub const CITY_START_X: f32 = -6000.0;
pub const GROUND_Y: f32 = 270.0; // base line the skyline stands on
pub const VIEW_SPAN: f32 = 600.0; // world units mapped onto the square view
const BUILDING_WIDTH: [i32;2] = [50, 200];
const BUILDING_HEIGHT: [i32;2] = [100, 800];
const FOLLOW_OFFSET: [f32;2] = [20.0, 20.0];

#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub area: [f32;4], // x, y, width, height in world units
    pub color: Color,
}

pub struct Skyline {
    pub buildings: Vec<Building>,
}

impl Skyline {
    /// Roll a row of buildings standing flush against each other.
    /// The same seed always produces the same city.
    pub fn generate(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut buildings = Vec::with_capacity(BUILDING_COUNT);
        let mut x = CITY_START_X;
        for _ in 0..BUILDING_COUNT {
            let width = rng.gen_range(BUILDING_WIDTH[0]..=BUILDING_WIDTH[1]) as f32;
            let height = rng.gen_range(BUILDING_HEIGHT[0]..=BUILDING_HEIGHT[1]) as f32;
            let color = [// pastel shades
                rng.gen_range(200..=240) as f32 / 255.0,
                rng.gen_range(200..=240) as f32 / 255.0,
                rng.gen_range(200..=250) as f32 / 255.0,
                1.0,
            ];
            buildings.push(Building {
                area: [x, GROUND_Y - height, width, height],
                color,
            });
            x += width;
        }
        Skyline { buildings }
    }
}

/// Maps a `VIEW_SPAN` sized world square centered near the player
/// onto the unit square the backend draws.
#[derive(Clone,Copy, Debug, PartialEq)]
pub struct Camera {
    pub target: [f32;2],
}

impl Camera {
    pub fn new() -> Self {Camera {
        target: [0.0, 0.0],
    } }

    pub fn follow(&mut self,  position: [f32;2]) {
        self.target = vec2_add(position, FOLLOW_OFFSET);
    }

    pub fn world_to_view(&self,  world: [f32;2]) -> [f32;2] {
        let rel = vec2_sub(world, self.target);
        [rel[0]/VIEW_SPAN + 0.5, rel[1]/VIEW_SPAN + 0.5]
    }

    pub fn view_to_world(&self,  view: [f32;2]) -> [f32;2] {
        vec2_add(vec2_scale([view[0]-0.5, view[1]-0.5], VIEW_SPAN), self.target)
    }
}
