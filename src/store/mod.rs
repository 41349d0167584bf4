pub mod plan_store;

pub use plan_store::*;
