pub mod output;
pub mod table;
pub mod theme;

pub use output::Output;
