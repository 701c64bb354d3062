use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric). Staff group chats are negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message (for later edits).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Sequential order identifier (SQLite rowid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

/// Supported interface languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lang {
    Ru,
    Uz,
}

impl Lang {
    pub fn as_str(self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::Uz => "uz",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ru" => Some(Lang::Ru),
            "uz" => Some(Lang::Uz),
            _ => None,
        }
    }
}

/// A delivery geopoint as received from the messenger.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Prefix marking a name that was submitted as a passport photo instead of text.
pub const PHOTO_NAME_PREFIX: &str = "photo:";

/// Build the sentinel name for an identity submitted as a photo.
pub fn photo_name_sentinel(file_id: &str) -> String {
    format!("{PHOTO_NAME_PREFIX}{file_id}")
}

pub fn is_photo_name(name: &str) -> bool {
    name.starts_with(PHOTO_NAME_PREFIX)
}

/// Order status lifecycle. `Completed` and `Rejected` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "accepted" => Some(OrderStatus::Accepted),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "rejected" => Some(OrderStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }

    /// Whether `self -> to` is a permitted lifecycle step.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        // `complete` is offered on the staff keyboard while an order is still
        // pending, so Pending -> Completed is a legal shortcut.
        matches!(
            (self, to),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Pending, Completed)
                | (Accepted, InProgress)
                | (Accepted, Rejected)
                | (Accepted, Completed)
                | (InProgress, Completed)
        )
    }
}

/// Staff action token carried in inline-button callback data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusAction {
    Accept,
    Reject,
    Complete,
}

impl StatusAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusAction::Accept => "accept",
            StatusAction::Reject => "reject",
            StatusAction::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(StatusAction::Accept),
            "reject" => Some(StatusAction::Reject),
            "complete" => Some(StatusAction::Complete),
            _ => None,
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            StatusAction::Accept => OrderStatus::Accepted,
            StatusAction::Reject => OrderStatus::Rejected,
            StatusAction::Complete => OrderStatus::Completed,
        }
    }
}

/// A registered or partially-registered end user.
#[derive(Clone, Debug, PartialEq)]
pub struct Client {
    pub user_id: UserId,
    pub username: Option<String>,
    pub contact: Option<String>,
    pub name: Option<String>,
    pub language: Option<Lang>,
}

impl Client {
    /// Registration gate: a client is registered iff a non-empty name exists.
    pub fn is_registered(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// A persisted delivery request.
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub contact: String,
    pub additional_contact: Option<String>,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub quantity: i64,
    pub order_time: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Insert payload for a freshly confirmed order.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    pub contact: String,
    pub additional_contact: Option<String>,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub quantity: i64,
    pub order_time: DateTime<Utc>,
}

/// Identity of the user driving the current update.
#[derive(Clone, Debug)]
pub struct UserInfo {
    pub id: UserId,
    pub username: Option<String>,
    pub full_name: String,
}

/// Staff identity attributed in lifecycle log lines.
#[derive(Clone, Debug)]
pub struct StaffActor {
    pub id: UserId,
    pub name: String,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_allow_no_transitions() {
        for from in [OrderStatus::Completed, OrderStatus::Rejected] {
            for to in [
                OrderStatus::Pending,
                OrderStatus::Accepted,
                OrderStatus::InProgress,
                OrderStatus::Completed,
                OrderStatus::Rejected,
            ] {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn pending_moves_forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Accepted));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Rejected));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn status_round_trips_through_db_strings() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Rejected,
        ] {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("cancelled"), None);
    }

    #[test]
    fn photo_sentinel_counts_as_registered() {
        let c = Client {
            user_id: UserId(1),
            username: None,
            contact: Some("+998901234567".into()),
            name: Some(photo_name_sentinel("AgACAgQAAx")),
            language: Some(Lang::Uz),
        };
        assert!(c.is_registered());
        assert!(is_photo_name(c.name.as_deref().unwrap()));
    }
}
