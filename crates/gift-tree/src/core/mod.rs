pub mod placement;
pub mod scene;
pub mod time;
pub mod tree;
pub mod unlock;
