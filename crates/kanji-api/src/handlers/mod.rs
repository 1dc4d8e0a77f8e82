pub mod chat;
pub mod health;
pub mod lookup;
pub mod upload;
