pub mod near_client;
pub mod transaction;
