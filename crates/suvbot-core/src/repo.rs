//! Repository ports for the durable store.
//!
//! SQLite is the first implementation (`suvbot-store`); the flow and lifecycle
//! logic only ever see these traits, so tests run against in-memory fakes.

use async_trait::async_trait;

use crate::{
    domain::{Client, Lang, NewOrder, Order, OrderId, OrderStatus, UserId},
    Result,
};

#[async_trait]
pub trait ClientRepo: Send + Sync {
    /// Insert-or-update the client row with a language choice. Creates the row
    /// on first language selection; never touches the name.
    async fn upsert_language(
        &self,
        user_id: UserId,
        username: Option<&str>,
        lang: Lang,
    ) -> Result<()>;

    async fn set_contact(&self, user_id: UserId, contact: &str, username: Option<&str>)
        -> Result<()>;

    async fn set_name(&self, user_id: UserId, name: &str) -> Result<()>;

    async fn get(&self, user_id: UserId) -> Result<Option<Client>>;

    async fn language_of(&self, user_id: UserId) -> Result<Option<Lang>>;

    /// Registration gate. Always recomputed from the store; conversation state
    /// is not authoritative for this.
    async fn is_registered(&self, user_id: UserId) -> Result<bool>;

    /// Bulk-clear; cascades to orders. Returns the number of deleted clients.
    async fn clear_all(&self) -> Result<u64>;
}

#[async_trait]
pub trait OrderRepo: Send + Sync {
    async fn insert(&self, order: &NewOrder) -> Result<OrderId>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Orders of one client, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Atomic conditional transition: the status is updated only if it still
    /// equals `from` at write time. Returns whether the update applied, so a
    /// lost race (double-click) is observable instead of silently double-firing.
    async fn transition(&self, id: OrderId, from: OrderStatus, to: OrderStatus) -> Result<bool>;

    /// Bulk-clear orders only; clients stay untouched.
    async fn clear_all(&self) -> Result<u64>;
}
