pub mod attachment;
pub mod message;

pub use attachment::Attachment;
pub use message::{Message, Origin};
