pub mod connection;
pub mod restaurants;
