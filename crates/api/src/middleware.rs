/// Password hashing, bearer tokens and the auth guards
pub mod auth;
/// Mapping of domain errors to HTTP responses
pub mod error_handling;
