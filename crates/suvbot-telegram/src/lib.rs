//! Telegram adapter (teloxide).
//!
//! Implements the `suvbot-core` MessagingPort over the Telegram Bot API and
//! renders the framework-agnostic markup model into teloxide types.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        ButtonRequest as TgButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup,
        KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode, ReplyMarkup,
    },
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use suvbot_core::{
    domain::{ChatId, GeoPoint, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonRequest, InlineKeyboard, Markup, ReplyKeyboard},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Delivery(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

fn render_reply_keyboard(kb: &ReplyKeyboard) -> KeyboardMarkup {
    let rows = kb.rows.iter().map(|row| {
        row.iter()
            .map(|b| {
                let button = KeyboardButton::new(b.label.clone());
                match b.request {
                    ButtonRequest::None => button,
                    ButtonRequest::Contact => button.request(TgButtonRequest::Contact),
                    ButtonRequest::Location => button.request(TgButtonRequest::Location),
                }
            })
            .collect::<Vec<_>>()
    });
    KeyboardMarkup::new(rows).resize_keyboard(true)
}

fn render_inline_keyboard(kb: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(kb.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn render_markup(markup: &Markup) -> Option<ReplyMarkup> {
    match markup {
        Markup::None => None,
        Markup::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        Markup::Reply(kb) => Some(ReplyMarkup::Keyboard(render_reply_keyboard(kb))),
        Markup::Inline(kb) => Some(ReplyMarkup::InlineKeyboard(render_inline_keyboard(kb))),
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str, markup: Markup) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                let mut req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
                if let Some(m) = render_markup(&markup) {
                    req = req.reply_markup(m);
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_html(&self, chat_id: ChatId, html: &str, markup: Markup) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html);
                if let Some(m) = render_markup(&markup) {
                    req = req.reply_markup(m);
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(&self, msg: MessageRef, html: &str, markup: Markup) -> Result<()> {
        self.with_retry(|| {
            let mut req = self
                .bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html);
            if let Markup::Inline(kb) = &markup {
                req = req.reply_markup(render_inline_keyboard(kb));
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn remove_markup(&self, msg: MessageRef) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .edit_message_reply_markup(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
        })
        .await?;
        Ok(())
    }

    async fn send_location(&self, chat_id: ChatId, point: GeoPoint) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| self.bot.send_location(Self::tg_chat(chat_id), point.lat, point.lon))
            .await?;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            if show_alert {
                req = req.show_alert(true);
            }
            req
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suvbot_core::{domain::Lang, keyboards};

    #[test]
    fn reply_keyboards_carry_request_buttons() {
        let Markup::Reply(kb) = keyboards::contact(Lang::Ru) else {
            panic!("contact keyboard is a reply keyboard");
        };
        let rendered = render_reply_keyboard(&kb);
        let first = &rendered.keyboard[0][0];
        assert!(matches!(first.request, Some(TgButtonRequest::Contact)));
    }

    #[test]
    fn inline_keyboards_round_trip_callback_data() {
        let Markup::Inline(kb) = keyboards::order_confirm() else {
            panic!("confirm keyboard is inline");
        };
        let rendered = render_inline_keyboard(&kb);
        let row: Vec<_> = rendered.inline_keyboard.iter().flatten().collect();
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn markup_none_renders_to_nothing() {
        assert!(render_markup(&Markup::None).is_none());
        assert!(render_markup(&Markup::Remove).is_some());
    }
}
