pub mod binding;
pub mod middleware;
pub mod session;
pub mod validity;
