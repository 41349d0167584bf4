pub mod description;
pub mod route_key;

pub use description::*;
pub use route_key::*;
