pub mod admin;
pub mod auth;
pub mod push;
pub mod sync;
