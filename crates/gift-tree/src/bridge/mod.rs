pub mod backend;
pub mod blessing;
pub mod protocol;
