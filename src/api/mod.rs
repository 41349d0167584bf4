pub mod accept_extractor;
pub mod control_handlers;
pub mod handlers;
pub mod routes;

pub use accept_extractor::*;
pub use handlers::*;
pub use routes::*;
