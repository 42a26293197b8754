pub mod identity;
pub mod message;

pub use identity::Identity;
pub use message::Message;
