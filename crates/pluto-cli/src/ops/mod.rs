pub mod context;
pub mod install;

pub use context::Context;
