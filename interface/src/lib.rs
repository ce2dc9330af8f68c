pub mod game;
#[cfg(feature="dyn")]
pub mod reloading;
