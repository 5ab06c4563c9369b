/// Command implementations.
pub mod list;
