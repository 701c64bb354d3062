//! Staff-driven order status lifecycle.
//!
//! The status write is an atomic conditional update keyed on the previously
//! observed status, so two staff members pressing buttons on the same
//! notification cannot both apply: the loser of the race gets a precise
//! refusal instead of a silent double-fire.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::{Client, Order, OrderId, StaffActor, StatusAction},
    repo::{ClientRepo, OrderRepo},
    Error, Result,
};

/// A successfully applied status change, with everything notification
/// rendering needs.
#[derive(Debug)]
pub struct StatusChange {
    pub order: Order,
    pub client: Option<Client>,
}

pub struct Lifecycle {
    clients: Arc<dyn ClientRepo>,
    orders: Arc<dyn OrderRepo>,
    cfg: Arc<Config>,
}

impl Lifecycle {
    pub fn new(
        clients: Arc<dyn ClientRepo>,
        orders: Arc<dyn OrderRepo>,
        cfg: Arc<Config>,
    ) -> Self {
        Self {
            clients,
            orders,
            cfg,
        }
    }

    /// Apply a staff status action to an order.
    ///
    /// Refusal order: access check, existence, terminal-state check, lifecycle
    /// legality, then the conditional write. A lost write race is re-read and
    /// reported as the refusal the new status implies.
    pub async fn set_status(
        &self,
        actor: &StaffActor,
        order_id: OrderId,
        action: StatusAction,
    ) -> Result<StatusChange> {
        if !self.cfg.is_staff(actor.id.0) {
            tracing::warn!(user = actor.id.0, order = order_id.0, "status change denied");
            return Err(Error::AccessDenied);
        }

        let Some(order) = self.orders.get(order_id).await? else {
            return Err(Error::OrderNotFound(order_id));
        };

        let from = order.status;
        let to = action.target();
        if from.is_terminal() {
            return Err(Error::AlreadyFinalized {
                order: order_id,
                status: from,
            });
        }
        if !from.can_transition_to(to) {
            return Err(Error::InvalidTransition { from, to });
        }

        if !self.orders.transition(order_id, from, to).await? {
            // Someone else changed the status between read and write.
            let Some(current) = self.orders.get(order_id).await? else {
                return Err(Error::OrderNotFound(order_id));
            };
            if current.status.is_terminal() {
                return Err(Error::AlreadyFinalized {
                    order: order_id,
                    status: current.status,
                });
            }
            return Err(Error::InvalidTransition {
                from: current.status,
                to,
            });
        }

        tracing::info!(
            order = order_id.0,
            from = from.as_str(),
            to = to.as_str(),
            admin = actor.id.0,
            "order status changed"
        );

        let client = self.clients.get(order.user_id).await?;
        Ok(StatusChange {
            order: Order {
                status: to,
                ..order
            },
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{NewOrder, OrderStatus, UserId},
        testutil::{test_config, MemClients, MemOrders},
    };
    use chrono::Utc;

    fn actor(id: i64) -> StaffActor {
        StaffActor {
            id: UserId(id),
            name: "Admin".into(),
            username: Some("boss".into()),
        }
    }

    async fn fixture() -> (Lifecycle, Arc<MemOrders>, OrderId) {
        let clients = Arc::new(MemClients::new());
        let orders = Arc::new(MemOrders::new());
        let id = orders
            .insert(&NewOrder {
                user_id: UserId(100),
                contact: "+998901234567".into(),
                additional_contact: None,
                location: None,
                address: Some("Чиланзар".into()),
                quantity: 3,
                order_time: Utc::now(),
            })
            .await
            .unwrap();
        let lifecycle = Lifecycle::new(clients, orders.clone(), Arc::new(test_config(&[1], None)));
        (lifecycle, orders, id)
    }

    #[tokio::test]
    async fn accept_moves_pending_to_accepted() {
        let (lifecycle, orders, id) = fixture().await;
        let change = lifecycle
            .set_status(&actor(1), id, StatusAction::Accept)
            .await
            .unwrap();
        assert_eq!(change.order.status, OrderStatus::Accepted);
        assert_eq!(orders.status_of(id).await, Some(OrderStatus::Accepted));
    }

    #[tokio::test]
    async fn non_staff_is_denied() {
        let (lifecycle, orders, id) = fixture().await;
        let err = lifecycle
            .set_status(&actor(99), id, StatusAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccessDenied));
        assert_eq!(orders.status_of(id).await, Some(OrderStatus::Pending));
    }

    #[tokio::test]
    async fn terminal_orders_refuse_further_changes() {
        let (lifecycle, _, id) = fixture().await;
        lifecycle
            .set_status(&actor(1), id, StatusAction::Reject)
            .await
            .unwrap();

        let err = lifecycle
            .set_status(&actor(1), id, StatusAction::Complete)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AlreadyFinalized {
                status: OrderStatus::Rejected,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn pending_cannot_jump_to_in_progress_but_may_complete() {
        let (lifecycle, orders, id) = fixture().await;
        // Direct completion of a pending order is allowed (express delivery).
        let change = lifecycle
            .set_status(&actor(1), id, StatusAction::Complete)
            .await
            .unwrap();
        assert_eq!(change.order.status, OrderStatus::Completed);
        assert_eq!(orders.status_of(id).await, Some(OrderStatus::Completed));
    }

    #[tokio::test]
    async fn missing_order_reports_not_found() {
        let (lifecycle, _, _) = fixture().await;
        let err = lifecycle
            .set_status(&actor(1), OrderId(9999), StatusAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OrderNotFound(OrderId(9999))));
    }

    /// Order repo whose first `get` serves a stale snapshot, simulating a
    /// concurrent change between read and conditional write.
    struct StaleReadOrders {
        inner: Arc<MemOrders>,
        stale: tokio::sync::Mutex<Option<Order>>,
    }

    #[async_trait::async_trait]
    impl crate::repo::OrderRepo for StaleReadOrders {
        async fn insert(&self, order: &NewOrder) -> Result<OrderId> {
            self.inner.insert(order).await
        }

        async fn get(&self, id: OrderId) -> Result<Option<Order>> {
            if let Some(stale) = self.stale.lock().await.take() {
                return Ok(Some(stale));
            }
            self.inner.get(id).await
        }

        async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
            self.inner.list_for_user(user_id).await
        }

        async fn transition(
            &self,
            id: OrderId,
            from: OrderStatus,
            to: OrderStatus,
        ) -> Result<bool> {
            self.inner.transition(id, from, to).await
        }

        async fn clear_all(&self) -> Result<u64> {
            self.inner.clear_all().await
        }
    }

    #[tokio::test]
    async fn lost_race_is_reported_not_reapplied() {
        let clients = Arc::new(MemClients::new());
        let orders = Arc::new(MemOrders::new());
        let id = orders
            .insert(&NewOrder {
                user_id: UserId(100),
                contact: "+998901234567".into(),
                additional_contact: None,
                location: None,
                address: Some("Чиланзар".into()),
                quantity: 3,
                order_time: Utc::now(),
            })
            .await
            .unwrap();

        // Snapshot while still pending, then let another admin finalize.
        let stale = orders.get(id).await.unwrap().unwrap();
        orders
            .transition(id, OrderStatus::Pending, OrderStatus::Rejected)
            .await
            .unwrap();

        let racing = Arc::new(StaleReadOrders {
            inner: orders.clone(),
            stale: tokio::sync::Mutex::new(Some(stale)),
        });
        let lifecycle = Lifecycle::new(clients, racing, Arc::new(test_config(&[1], None)));

        let err = lifecycle
            .set_status(&actor(1), id, StatusAction::Accept)
            .await
            .unwrap_err();
        // The conditional write fails, the refetch reports the real state.
        assert!(matches!(
            err,
            Error::AlreadyFinalized {
                status: OrderStatus::Rejected,
                ..
            }
        ));
        assert_eq!(orders.status_of(id).await, Some(OrderStatus::Rejected));
    }
}
