pub mod split;

pub use split::split_quoted;
