use async_trait::async_trait;

use crate::{
    domain::{ChatId, GeoPoint, MessageRef},
    messaging::types::Markup,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the shape is small enough that other
/// chat backends could fit behind it.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str, markup: Markup) -> Result<MessageRef>;

    /// Send with HTML parse mode (staff notifications use `<b>`/`<code>`/`<i>`).
    async fn send_html(&self, chat_id: ChatId, html: &str, markup: Markup) -> Result<MessageRef>;

    /// Edit a previously sent message. Only inline markup survives an edit;
    /// passing `Markup::None` drops any inline keyboard.
    async fn edit_html(&self, msg: MessageRef, html: &str, markup: Markup) -> Result<()>;

    /// Strip inline controls from a previously sent message.
    async fn remove_markup(&self, msg: MessageRef) -> Result<()>;

    async fn send_location(&self, chat_id: ChatId, point: GeoPoint) -> Result<MessageRef>;

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()>;
}
