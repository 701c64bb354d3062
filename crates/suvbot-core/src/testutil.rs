//! In-memory fakes shared by the flow/lifecycle/notify tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::atomic::{AtomicI32, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    config::{Config, DEFAULT_PRICE_PER_BOTTLE},
    domain::{
        ChatId, Client, GeoPoint, Lang, MessageId, MessageRef, NewOrder, Order, OrderId,
        OrderStatus, UserId,
    },
    messaging::{port::MessagingPort, types::Markup},
    repo::{ClientRepo, OrderRepo},
    Result,
};

pub fn test_config(staff: &[i64], group: Option<i64>) -> Config {
    Config {
        bot_token: "test-token".into(),
        staff_chat_ids: staff.to_vec(),
        group_chat_id: group,
        price_per_bottle: DEFAULT_PRICE_PER_BOTTLE,
        database_path: PathBuf::from(":memory:"),
        health_addr: "127.0.0.1:0".into(),
    }
}

#[derive(Default)]
pub struct MemClients {
    rows: Mutex<HashMap<UserId, Client>>,
}

impl MemClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, client: Client) {
        self.rows.lock().await.insert(client.user_id, client);
    }
}

#[async_trait]
impl ClientRepo for MemClients {
    async fn upsert_language(
        &self,
        user_id: UserId,
        username: Option<&str>,
        lang: Lang,
    ) -> Result<()> {
        let mut rows = self.rows.lock().await;
        let row = rows.entry(user_id).or_insert_with(|| Client {
            user_id,
            username: None,
            contact: None,
            name: None,
            language: None,
        });
        row.language = Some(lang);
        if username.is_some() {
            row.username = username.map(str::to_string);
        }
        Ok(())
    }

    async fn set_contact(
        &self,
        user_id: UserId,
        contact: &str,
        username: Option<&str>,
    ) -> Result<()> {
        let mut rows = self.rows.lock().await;
        let row = rows.entry(user_id).or_insert_with(|| Client {
            user_id,
            username: None,
            contact: None,
            name: None,
            language: None,
        });
        row.contact = Some(contact.to_string());
        if username.is_some() {
            row.username = username.map(str::to_string);
        }
        Ok(())
    }

    async fn set_name(&self, user_id: UserId, name: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        let row = rows.entry(user_id).or_insert_with(|| Client {
            user_id,
            username: None,
            contact: None,
            name: None,
            language: None,
        });
        row.name = Some(name.to_string());
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Client>> {
        Ok(self.rows.lock().await.get(&user_id).cloned())
    }

    async fn language_of(&self, user_id: UserId) -> Result<Option<Lang>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&user_id)
            .and_then(|c| c.language))
    }

    async fn is_registered(&self, user_id: UserId) -> Result<bool> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&user_id)
            .is_some_and(Client::is_registered))
    }

    async fn clear_all(&self) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        let n = rows.len() as u64;
        rows.clear();
        Ok(n)
    }
}

#[derive(Default)]
pub struct MemOrders {
    rows: Mutex<Vec<Order>>,
}

impl MemOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, order: Order) {
        self.rows.lock().await.push(order);
    }

    pub async fn status_of(&self, id: OrderId) -> Option<OrderStatus> {
        self.rows
            .lock()
            .await
            .iter()
            .find(|o| o.order_id == id)
            .map(|o| o.status)
    }
}

#[async_trait]
impl OrderRepo for MemOrders {
    async fn insert(&self, order: &NewOrder) -> Result<OrderId> {
        let mut rows = self.rows.lock().await;
        let id = OrderId(rows.len() as i64 + 1);
        rows.push(Order {
            order_id: id,
            user_id: order.user_id,
            contact: order.contact.clone(),
            additional_contact: order.additional_contact.clone(),
            location: order.location,
            address: order.address.clone(),
            quantity: order.quantity,
            order_time: order.order_time,
            status: OrderStatus::Pending,
        });
        Ok(id)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|o| o.order_id == id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = self.rows.lock().await;
        let mut out: Vec<Order> = rows.iter().filter(|o| o.user_id == user_id).cloned().collect();
        out.reverse();
        Ok(out)
    }

    async fn transition(&self, id: OrderId, from: OrderStatus, to: OrderStatus) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let Some(order) = rows.iter_mut().find(|o| o.order_id == id) else {
            return Ok(false);
        };
        if order.status != from {
            return Ok(false);
        }
        order.status = to;
        Ok(true)
    }

    async fn clear_all(&self) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        let n = rows.len() as u64;
        rows.clear();
        Ok(n)
    }
}

/// Everything the fake messenger was asked to send, in order.
#[derive(Clone, Debug)]
pub enum Sent {
    Text {
        chat: ChatId,
        text: String,
        markup: Markup,
    },
    Html {
        chat: ChatId,
        html: String,
        markup: Markup,
    },
    Edit {
        msg: MessageRef,
        html: String,
        markup: Markup,
    },
    RemoveMarkup(MessageRef),
    Location {
        chat: ChatId,
        point: GeoPoint,
    },
    Callback {
        id: String,
        text: Option<String>,
        alert: bool,
    },
}

#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn log(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    fn next_ref(&self, chat_id: ChatId) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        }
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str, markup: Markup) -> Result<MessageRef> {
        self.sent.lock().await.push(Sent::Text {
            chat: chat_id,
            text: text.to_string(),
            markup,
        });
        Ok(self.next_ref(chat_id))
    }

    async fn send_html(&self, chat_id: ChatId, html: &str, markup: Markup) -> Result<MessageRef> {
        self.sent.lock().await.push(Sent::Html {
            chat: chat_id,
            html: html.to_string(),
            markup,
        });
        Ok(self.next_ref(chat_id))
    }

    async fn edit_html(&self, msg: MessageRef, html: &str, markup: Markup) -> Result<()> {
        self.sent.lock().await.push(Sent::Edit {
            msg,
            html: html.to_string(),
            markup,
        });
        Ok(())
    }

    async fn remove_markup(&self, msg: MessageRef) -> Result<()> {
        self.sent.lock().await.push(Sent::RemoveMarkup(msg));
        Ok(())
    }

    async fn send_location(&self, chat_id: ChatId, point: GeoPoint) -> Result<MessageRef> {
        self.sent.lock().await.push(Sent::Location {
            chat: chat_id,
            point,
        });
        Ok(self.next_ref(chat_id))
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        self.sent.lock().await.push(Sent::Callback {
            id: callback_id.to_string(),
            text: text.map(str::to_string),
            alert: show_alert,
        });
        Ok(())
    }
}
