pub mod message_queue;

pub use message_queue::{Message, MessageQueue};
