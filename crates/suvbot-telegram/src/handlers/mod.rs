//! Telegram update handlers.
//!
//! Each update is classified into the transport-agnostic `UserInput` and
//! handed to the core flow; whatever comes back is rendered into Telegram
//! messages. Only private chats drive the conversation, the staff group only
//! receives notifications.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use suvbot_core::{
    domain::{ChatId, GeoPoint, UserId, UserInfo},
    flow::{Reply, UserInput},
};

use crate::router::AppState;

mod callback;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }

    let info = user_info(user);
    let chat = ChatId(msg.chat.id.0);

    let is_start = msg
        .text()
        .map(|t| {
            let t = t.trim();
            t == "/start" || t.starts_with("/start ")
        })
        .unwrap_or(false);

    let result = if is_start {
        state.flow.on_start(&info).await
    } else {
        state.flow.on_message(&info, classify(&msg)).await
    };

    let replies = match result {
        Ok(replies) => replies,
        Err(err) => {
            tracing::error!(user = info.id.0, %err, "message handling failed");
            state.flow.recover(&info).await
        }
    };

    deliver(&state, chat, replies).await;
    Ok(())
}

pub(crate) fn user_info(user: &teloxide::types::User) -> UserInfo {
    UserInfo {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        full_name: user.full_name(),
    }
}

fn classify(msg: &Message) -> UserInput {
    if let Some(contact) = msg.contact() {
        return UserInput::ContactCard {
            phone: contact.phone_number.clone(),
        };
    }
    if let Some(location) = msg.location() {
        return UserInput::Location(GeoPoint {
            lat: location.latitude,
            lon: location.longitude,
        });
    }
    if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        return UserInput::Photo {
            file_id: best.file.id.clone(),
        };
    }
    if let Some(text) = msg.text() {
        return UserInput::Text(text.to_string());
    }
    UserInput::Other
}

pub(crate) async fn deliver(state: &AppState, chat: ChatId, replies: Vec<Reply>) {
    for reply in replies {
        if let Err(err) = state
            .messenger
            .send_text(chat, &reply.text, reply.markup)
            .await
        {
            tracing::warn!(chat = chat.0, %err, "failed to send reply");
        }
    }
}
