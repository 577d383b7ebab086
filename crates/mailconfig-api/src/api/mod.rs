/// API endpoint modules
pub mod cache;
pub mod effective;
pub mod health;
pub mod settings;
pub mod test_send;
