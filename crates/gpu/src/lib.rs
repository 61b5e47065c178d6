pub mod backend;
pub mod recording;
pub mod renderer;
pub mod tracker;

pub use backend::*;
pub use recording::*;
pub use renderer::*;
pub use tracker::*;
