mod backend;
mod chat;
mod message;
mod persona;
mod rate_limit;
mod rating;

pub use backend::*;
pub use chat::*;
pub use message::*;
pub use persona::*;
pub use rate_limit::*;
pub use rating::*;
