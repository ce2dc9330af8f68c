pub use interface::game::{Game, Graphics, Shape, Align, Color, Key, MouseButton, hex};

#[cfg(feature="speedy2d")]
mod speedy2d;
#[cfg(feature="speedy2d")]
pub use self::speedy2d::start;

#[cfg(feature="dyn")]
pub mod reload;
