pub mod admin;
pub mod auth;
pub mod counsellor;
pub mod directory;
pub mod events;
pub mod health;
pub mod students;
