pub mod identities;
pub mod messages;
pub mod pool;
pub mod schema;
pub mod sessions;
