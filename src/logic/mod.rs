pub mod control;
pub mod engine;
pub mod initialize;
pub mod negotiate;
pub mod render;
pub mod sampling;

pub use control::*;
pub use engine::*;
pub use initialize::*;
pub use negotiate::*;
pub use render::*;
pub use sampling::*;
