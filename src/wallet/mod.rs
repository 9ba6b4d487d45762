pub mod credential_storage;
pub mod interactive;
pub mod key_management;
