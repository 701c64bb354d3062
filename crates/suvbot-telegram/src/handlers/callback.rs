//! Inline-button callbacks: order confirm/cancel, staff status controls, and
//! the staff data-management mini-flow.

use std::sync::Arc;

use teloxide::{prelude::*, types::CallbackQuery};

use suvbot_core::{
    domain::{ChatId, Lang, MessageId, MessageRef, OrderId, StaffActor, StatusAction, UserInfo},
    flow::{AdminAction, AdminOutcome, ConfirmDecision, ConfirmOutcome},
    format,
    i18n::texts,
    messaging::types::Markup,
    Error,
};

use crate::{
    handlers::{deliver, user_info},
    router::AppState,
};

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(data) = q.data.clone() else {
        let _ = state.messenger.answer_callback(&q.id, None, false).await;
        return Ok(());
    };
    let info = user_info(&q.from);
    let origin = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });

    let result = if let Some(rest) = data.strip_prefix("order:") {
        order_callback(&state, &q.id, &info, origin, rest).await
    } else if let Some(rest) = data.strip_prefix("status:") {
        status_callback(&state, &q.id, &info, origin, rest).await
    } else if let Some(rest) = data.strip_prefix("db:") {
        admin_callback(&state, &q.id, &info, origin, rest).await
    } else {
        tracing::warn!(data = %data, "unrecognized callback data");
        state.messenger.answer_callback(&q.id, None, false).await
    };

    if let Err(err) = result {
        tracing::error!(user = info.id.0, data = %data, %err, "callback handling failed");
        let _ = state
            .messenger
            .answer_callback(&q.id, Some(texts(Lang::Ru).error_processing), true)
            .await;
    }
    Ok(())
}

async fn order_callback(
    state: &AppState,
    callback_id: &str,
    info: &UserInfo,
    origin: Option<MessageRef>,
    rest: &str,
) -> suvbot_core::Result<()> {
    let decision = match rest {
        "confirm" => ConfirmDecision::Confirm,
        "cancel" => ConfirmDecision::Cancel,
        _ => {
            return state.messenger.answer_callback(callback_id, None, false).await;
        }
    };

    let chat = ChatId(info.id.0);
    match state.flow.on_confirm(info, decision).await? {
        ConfirmOutcome::Stale => {
            state
                .messenger
                .answer_callback(callback_id, Some(texts(Lang::Ru).invalid_input), false)
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
        }
        ConfirmOutcome::Cancelled {
            lang,
            note,
            followups,
        } => {
            state
                .messenger
                .answer_callback(callback_id, Some(texts(lang).cancel_ack), false)
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
            state.messenger.send_text(chat, &note, Markup::Remove).await?;
            deliver(state, chat, followups).await;
        }
        ConfirmOutcome::Committed {
            lang,
            note,
            followups,
            order,
            client,
        } => {
            state
                .messenger
                .answer_callback(callback_id, Some(texts(lang).confirm_ack), false)
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
            state.messenger.send_text(chat, &note, Markup::Remove).await?;
            deliver(state, chat, followups).await;
            state.notifier.order_committed(&order, client.as_ref()).await;
        }
        ConfirmOutcome::Inconsistent {
            lang: _,
            note,
            followups,
        } => {
            state
                .messenger
                .answer_callback(callback_id, Some(note.as_str()), true)
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
            deliver(state, chat, followups).await;
        }
    }
    Ok(())
}

async fn status_callback(
    state: &AppState,
    callback_id: &str,
    info: &UserInfo,
    origin: Option<MessageRef>,
    rest: &str,
) -> suvbot_core::Result<()> {
    let parsed = rest.split_once(':').and_then(|(id, action)| {
        Some((
            OrderId(id.parse::<i64>().ok()?),
            StatusAction::parse(action)?,
        ))
    });
    let Some((order_id, action)) = parsed else {
        tracing::warn!(data = rest, "malformed status callback");
        return state.messenger.answer_callback(callback_id, None, false).await;
    };

    let actor = StaffActor {
        id: info.id,
        name: info.full_name.clone(),
        username: info.username.clone(),
    };

    // Staff chat convention: refusals and acks are Russian.
    let ru = Lang::Ru;
    match state.lifecycle.set_status(&actor, order_id, action).await {
        Ok(change) => {
            state
                .messenger
                .answer_callback(callback_id, Some("Статус обновлён."), false)
                .await?;
            if let Some(msg) = origin {
                let summary = format::SummaryInfo::from_order(
                    &change.order,
                    change.client.as_ref(),
                    state.cfg.price_per_bottle,
                );
                let base = format::staff_order_message(
                    order_id,
                    change.order.user_id,
                    &summary,
                    change.order.order_time,
                );
                let log = format::staff_log_line(order_id, change.order.status, &actor);
                let html = format::apply_status_update(&base, change.order.status, &log);
                if let Err(err) = state.messenger.edit_html(msg, &html, Markup::None).await {
                    tracing::warn!(order = order_id.0, %err, "failed to edit staff message");
                }
            }
            state
                .notifier
                .status_changed(&change.order, change.client.as_ref())
                .await;
        }
        Err(Error::AccessDenied) => {
            state
                .messenger
                .answer_callback(callback_id, Some(texts(ru).access_denied), true)
                .await?;
        }
        Err(Error::AlreadyFinalized { status, .. }) => {
            state
                .messenger
                .answer_callback(
                    callback_id,
                    Some(format::already_finalized(order_id, status, ru).as_str()),
                    true,
                )
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
        }
        Err(Error::InvalidTransition { from, to }) => {
            state
                .messenger
                .answer_callback(
                    callback_id,
                    Some(format::invalid_transition(from, to, ru).as_str()),
                    true,
                )
                .await?;
        }
        Err(Error::OrderNotFound(id)) => {
            state
                .messenger
                .answer_callback(callback_id, Some(format::order_not_found(id, ru).as_str()), true)
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

async fn admin_callback(
    state: &AppState,
    callback_id: &str,
    info: &UserInfo,
    origin: Option<MessageRef>,
    rest: &str,
) -> suvbot_core::Result<()> {
    let action = match rest {
        "clients" => Some(AdminAction::MenuClients),
        "orders" => Some(AdminAction::MenuOrders),
        "confirm:clients:yes" => Some(AdminAction::ConfirmClients(true)),
        "confirm:clients:no" => Some(AdminAction::ConfirmClients(false)),
        "confirm:orders:yes" => Some(AdminAction::ConfirmOrders(true)),
        "confirm:orders:no" => Some(AdminAction::ConfirmOrders(false)),
        _ => None,
    };
    let Some(action) = action else {
        tracing::warn!(data = rest, "malformed admin callback");
        return state.messenger.answer_callback(callback_id, None, false).await;
    };

    let chat = ChatId(info.id.0);
    match state.flow.on_admin(info, action).await? {
        AdminOutcome::Denied { lang } => {
            state
                .messenger
                .answer_callback(callback_id, Some(texts(lang).access_denied), true)
                .await?;
            if let Some(msg) = origin {
                let _ = state.messenger.remove_markup(msg).await;
            }
        }
        AdminOutcome::Ignored => {
            state.messenger.answer_callback(callback_id, None, false).await?;
        }
        AdminOutcome::ShowConfirm { text, markup } => {
            state.messenger.answer_callback(callback_id, None, false).await?;
            if let Some(msg) = origin {
                state.messenger.edit_html(msg, &text, markup).await?;
            } else {
                state.messenger.send_text(chat, &text, markup).await?;
            }
        }
        AdminOutcome::Finished { text, followups } => {
            state.messenger.answer_callback(callback_id, None, false).await?;
            if let Some(msg) = origin {
                state.messenger.edit_html(msg, &text, Markup::None).await?;
            } else {
                state.messenger.send_text(chat, &text, Markup::None).await?;
            }
            deliver(state, chat, followups).await;
        }
    }
    Ok(())
}
