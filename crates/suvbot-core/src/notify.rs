//! Staff and client notifications.
//!
//! Fan-out is best-effort: the order is already committed by the time we get
//! here, so a recipient failure is logged and the remaining recipients still
//! get their copy. Nothing here ever rolls the order back.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::{ChatId, Client, Lang, MessageRef, Order},
    format::{self, SummaryInfo},
    keyboards,
    messaging::{port::MessagingPort, types::Markup},
};

pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    cfg: Arc<Config>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, cfg: Arc<Config>) -> Self {
        Self { messenger, cfg }
    }

    /// Staff recipients: every configured staff id plus the optional group
    /// chat, deduplicated so nobody gets the same order twice.
    fn staff_recipients(&self) -> Vec<ChatId> {
        let mut ids = self.cfg.staff_chat_ids.clone();
        if let Some(group) = self.cfg.group_chat_id {
            ids.push(group);
        }
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(ChatId).collect()
    }

    /// Announce a freshly committed order to every staff recipient: the HTML
    /// summary with inline status controls, followed by the raw geopoint when
    /// one was attached.
    pub async fn order_committed(&self, order: &Order, client: Option<&Client>) -> Vec<MessageRef> {
        let info = SummaryInfo::from_order(order, client, self.cfg.price_per_bottle);
        let text = format::staff_order_message(order.order_id, order.user_id, &info, order.order_time);
        let keyboard = keyboards::staff_order_status(order.order_id);

        let mut sent = Vec::new();
        for chat in self.staff_recipients() {
            match self
                .messenger
                .send_html(chat, &text, keyboard.clone())
                .await
            {
                Ok(msg) => {
                    sent.push(msg);
                    if let Some(point) = order.location {
                        if let Err(err) = self.messenger.send_location(chat, point).await {
                            tracing::warn!(chat = chat.0, order = order.order_id.0, %err,
                                "failed to deliver order geolocation");
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(chat = chat.0, order = order.order_id.0, %err,
                        "failed to deliver order notification");
                }
            }
        }
        sent
    }

    /// Tell the owning client about a status change, in their language.
    pub async fn status_changed(&self, order: &Order, client: Option<&Client>) {
        let lang = client.and_then(|c| c.language).unwrap_or(Lang::Ru);
        let info = SummaryInfo::from_order(order, client, self.cfg.price_per_bottle);
        let text = format::client_status_update(order.order_id, order.status, &info, lang);
        if let Err(err) = self
            .messenger
            .send_text(ChatId(order.user_id.0), &text, Markup::None)
            .await
        {
            tracing::warn!(user = order.user_id.0, order = order.order_id.0, %err,
                "failed to deliver status update to client");
        }
    }
}
