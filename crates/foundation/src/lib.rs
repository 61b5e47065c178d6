pub mod handles;
pub mod math;
pub mod time;

pub use handles::*;
pub use time::*;
