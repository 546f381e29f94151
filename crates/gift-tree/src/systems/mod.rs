pub mod animation;
pub mod lighting;
pub mod render;
pub mod rng;
pub mod snow;
