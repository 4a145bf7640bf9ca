pub mod profiles;
pub mod subscriptions;
pub mod users;
