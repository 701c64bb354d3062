//! SQLite persistence for clients and orders.
//!
//! Two tables with a cascading foreign key: deleting a client removes their
//! orders. Status transitions are conditional updates so concurrent staff
//! actions cannot both apply.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};

use suvbot_core::{
    domain::{Client, GeoPoint, Lang, NewOrder, Order, OrderId, OrderStatus, UserId},
    repo::{ClientRepo, OrderRepo},
    Error, Result,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    user_id   INTEGER PRIMARY KEY,
    username  TEXT,
    contact   TEXT,
    name      TEXT,
    language  TEXT
);

CREATE TABLE IF NOT EXISTS orders (
    order_id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id            INTEGER NOT NULL REFERENCES clients(user_id) ON DELETE CASCADE,
    contact            TEXT NOT NULL,
    additional_contact TEXT,
    location_lat       REAL,
    location_lon       REAL,
    address            TEXT,
    quantity           INTEGER NOT NULL,
    order_time         TEXT NOT NULL,
    status             TEXT NOT NULL DEFAULT 'pending'
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
"#;

fn db_err(e: sqlx::Error) -> Error {
    Error::Storage(e.to_string())
}

/// Shared handle over the SQLite pool. Implements both repository ports.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if missing) the database file and apply the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(db_err)?;
        let db = Self { pool };
        db.migrate().await?;
        tracing::info!(path = %path.display(), "database ready");
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // Statement-per-call; SQLite will not run a multi-statement batch
        // through the prepared-statement path.
        for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt).execute(&self.pool).await.map_err(db_err)?;
        }
        Ok(())
    }
}

fn client_from_row(row: &SqliteRow) -> Result<Client> {
    let language: Option<String> = row.try_get("language").map_err(db_err)?;
    Ok(Client {
        user_id: UserId(row.try_get("user_id").map_err(db_err)?),
        username: row.try_get("username").map_err(db_err)?,
        contact: row.try_get("contact").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        language: language.as_deref().and_then(Lang::parse),
    })
}

fn order_from_row(row: &SqliteRow) -> Result<Order> {
    let lat: Option<f64> = row.try_get("location_lat").map_err(db_err)?;
    let lon: Option<f64> = row.try_get("location_lon").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;
    let order_time: DateTime<Utc> = row.try_get("order_time").map_err(db_err)?;
    Ok(Order {
        order_id: OrderId(row.try_get("order_id").map_err(db_err)?),
        user_id: UserId(row.try_get("user_id").map_err(db_err)?),
        contact: row.try_get("contact").map_err(db_err)?,
        additional_contact: row.try_get("additional_contact").map_err(db_err)?,
        location: match (lat, lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        },
        address: row.try_get("address").map_err(db_err)?,
        quantity: row.try_get("quantity").map_err(db_err)?,
        order_time,
        status: OrderStatus::parse(&status)
            .ok_or_else(|| Error::Storage(format!("unknown order status '{status}'")))?,
    })
}

#[async_trait]
impl ClientRepo for Db {
    async fn upsert_language(
        &self,
        user_id: UserId,
        username: Option<&str>,
        lang: Lang,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO clients (user_id, username, language) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
               language = excluded.language,
               username = COALESCE(excluded.username, clients.username)",
        )
        .bind(user_id.0)
        .bind(username)
        .bind(lang.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn set_contact(
        &self,
        user_id: UserId,
        contact: &str,
        username: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO clients (user_id, contact, username) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
               contact = excluded.contact,
               username = COALESCE(excluded.username, clients.username)",
        )
        .bind(user_id.0)
        .bind(contact)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn set_name(&self, user_id: UserId, name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO clients (user_id, name) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET name = excluded.name",
        )
        .bind(user_id.0)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE user_id = ?1")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn language_of(&self, user_id: UserId) -> Result<Option<Lang>> {
        let row = sqlx::query("SELECT language FROM clients WHERE user_id = ?1")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let language: Option<String> = row.try_get("language").map_err(db_err)?;
        Ok(language.as_deref().and_then(Lang::parse))
    }

    async fn is_registered(&self, user_id: UserId) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM clients WHERE user_id = ?1 AND name IS NOT NULL AND name != ''",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.is_some())
    }

    async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM clients")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OrderRepo for Db {
    async fn insert(&self, order: &NewOrder) -> Result<OrderId> {
        let result = sqlx::query(
            "INSERT INTO orders
               (user_id, contact, additional_contact, location_lat, location_lon,
                address, quantity, order_time, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending')",
        )
        .bind(order.user_id.0)
        .bind(&order.contact)
        .bind(&order.additional_contact)
        .bind(order.location.map(|p| p.lat))
        .bind(order.location.map(|p| p.lon))
        .bind(&order.address)
        .bind(order.quantity)
        .bind(order.order_time)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(OrderId(result.last_insert_rowid()))
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_id = ?1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE user_id = ?1 ORDER BY order_id DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(order_from_row).collect()
    }

    async fn transition(&self, id: OrderId, from: OrderStatus, to: OrderStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?1 WHERE order_id = ?2 AND status = ?3",
        )
        .bind(to.as_str())
        .bind(id.0)
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM orders")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // In-memory SQLite: a single connection, or every acquire would see a
    // fresh empty database.
    async fn memory_db() -> Db {
        let opts = SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .unwrap();
        let db = Db { pool };
        db.migrate().await.unwrap();
        db
    }

    fn new_order(user: i64, quantity: i64) -> NewOrder {
        NewOrder {
            user_id: UserId(user),
            contact: "+998901234567".into(),
            additional_contact: None,
            location: Some(GeoPoint {
                lat: 41.31,
                lon: 69.24,
            }),
            address: Some("Чиланзар, д. 5".into()),
            quantity,
            order_time: Utc::now(),
        }
    }

    async fn register(db: &Db, user: i64) {
        let uid = UserId(user);
        db.upsert_language(uid, Some("ivan"), Lang::Ru).await.unwrap();
        db.set_contact(uid, "+998901234567", Some("ivan")).await.unwrap();
        db.set_name(uid, "Иван Петров").await.unwrap();
    }

    #[tokio::test]
    async fn registration_gate_requires_a_name() {
        let db = memory_db().await;
        let uid = UserId(100);

        db.upsert_language(uid, Some("ivan"), Lang::Uz).await.unwrap();
        assert!(!db.is_registered(uid).await.unwrap());
        assert_eq!(db.language_of(uid).await.unwrap(), Some(Lang::Uz));

        db.set_contact(uid, "+998901234567", None).await.unwrap();
        assert!(!db.is_registered(uid).await.unwrap());

        db.set_name(uid, "Иван Петров").await.unwrap();
        assert!(db.is_registered(uid).await.unwrap());

        let client = ClientRepo::get(&db, uid).await.unwrap().unwrap();
        // A later None username must not erase the stored one.
        assert_eq!(client.username.as_deref(), Some("ivan"));
    }

    #[tokio::test]
    async fn order_round_trips_with_location_and_time() {
        let db = memory_db().await;
        register(&db, 100).await;

        let id = OrderRepo::insert(&db, &new_order(100, 3)).await.unwrap();
        let order = OrderRepo::get(&db, id).await.unwrap().unwrap();
        assert_eq!(order.quantity, 3);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.location.unwrap().lat, 41.31);
        assert_eq!(order.address.as_deref(), Some("Чиланзар, д. 5"));
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let db = memory_db().await;
        register(&db, 100).await;

        let first = OrderRepo::insert(&db, &new_order(100, 1)).await.unwrap();
        let second = OrderRepo::insert(&db, &new_order(100, 2)).await.unwrap();

        let orders = db.list_for_user(UserId(100)).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id, second);
        assert_eq!(orders[1].order_id, first);
    }

    #[tokio::test]
    async fn conditional_transition_refuses_a_stale_from_status() {
        let db = memory_db().await;
        register(&db, 100).await;
        let id = OrderRepo::insert(&db, &new_order(100, 3)).await.unwrap();

        assert!(db
            .transition(id, OrderStatus::Pending, OrderStatus::Accepted)
            .await
            .unwrap());
        // Second press of the same button: the row is no longer pending.
        assert!(!db
            .transition(id, OrderStatus::Pending, OrderStatus::Accepted)
            .await
            .unwrap());
        assert!(db
            .transition(id, OrderStatus::Accepted, OrderStatus::Completed)
            .await
            .unwrap());

        let order = OrderRepo::get(&db, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn clearing_clients_cascades_to_their_orders() {
        let db = memory_db().await;
        register(&db, 100).await;
        register(&db, 200).await;
        let id = OrderRepo::insert(&db, &new_order(100, 3)).await.unwrap();

        let deleted = ClientRepo::clear_all(&db).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(OrderRepo::get(&db, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clearing_orders_leaves_clients_alone() {
        let db = memory_db().await;
        register(&db, 100).await;
        OrderRepo::insert(&db, &new_order(100, 3)).await.unwrap();
        OrderRepo::insert(&db, &new_order(100, 5)).await.unwrap();

        let deleted = OrderRepo::clear_all(&db).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(db.is_registered(UserId(100)).await.unwrap());
        assert!(db.list_for_user(UserId(100)).await.unwrap().is_empty());
    }
}
