pub mod extract;
pub mod rename;
