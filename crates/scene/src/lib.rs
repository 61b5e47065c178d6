pub mod camera;
pub mod color;
pub mod components;
pub mod entity;
pub mod graph;
pub mod resource;

pub use camera::*;
pub use color::*;
pub use entity::*;
pub use graph::*;
pub use resource::*;
