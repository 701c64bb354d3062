pub mod port;
pub mod types;

pub use port::MessagingPort;
pub use types::{ButtonRequest, InlineButton, InlineKeyboard, Markup, ReplyButton, ReplyKeyboard};
