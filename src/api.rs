pub mod client;
pub mod tigo;
