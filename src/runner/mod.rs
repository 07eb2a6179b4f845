pub mod ds;
pub mod hook;
pub mod host;
