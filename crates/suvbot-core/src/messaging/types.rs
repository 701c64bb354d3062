//! Cross-messenger outgoing markup model.
//!
//! Telegram-specific rendering lives in the Telegram adapter.

/// Reply-keyboard button request kinds (contact card / geolocation pickers).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonRequest {
    None,
    Contact,
    Location,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyButton {
    pub label: String,
    pub request: ButtonRequest,
}

impl ReplyButton {
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request: ButtonRequest::None,
        }
    }

    pub fn request_contact(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request: ButtonRequest::Contact,
        }
    }

    pub fn request_location(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request: ButtonRequest::Location,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<ReplyButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

/// Markup attached to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Markup {
    None,
    /// Remove any visible reply keyboard.
    Remove,
    Reply(ReplyKeyboard),
    Inline(InlineKeyboard),
}
