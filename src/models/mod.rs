pub mod credential;
pub mod transaction;
