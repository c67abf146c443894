pub mod clients;
pub mod infra;
pub mod tools;
