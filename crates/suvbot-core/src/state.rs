//! Transient per-user conversation state.
//!
//! Each variant carries exactly the fields legitimately collected up to that
//! point, so "field present but meaningless in this state" cannot be
//! represented. State lives behind `StateStore` (get/set/clear by user id);
//! the in-memory implementation is the default and loses everything on
//! restart, which is accepted: the user simply starts over.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    domain::{GeoPoint, Lang, UserId},
    Result,
};

/// Fully collected order fields, ready for the confirmation screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub contact: String,
    pub name: String,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub additional_contact: Option<String>,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConversationState {
    Idle,
    LanguageSelect,
    Contact {
        lang: Lang,
    },
    Name {
        lang: Lang,
        contact: String,
    },
    Location {
        lang: Lang,
        contact: String,
        name: String,
    },
    Address {
        lang: Lang,
        contact: String,
        name: String,
        location: Option<GeoPoint>,
    },
    AdditionalContact {
        lang: Lang,
        contact: String,
        name: String,
        location: Option<GeoPoint>,
        address: String,
    },
    Quantity {
        lang: Lang,
        contact: String,
        name: String,
        location: Option<GeoPoint>,
        address: String,
        additional_contact: Option<String>,
    },
    Confirm {
        lang: Lang,
        draft: OrderDraft,
    },
    // Staff data-management mini-flow.
    AdminMenu {
        lang: Lang,
    },
    AdminConfirmClearClients {
        lang: Lang,
    },
    AdminConfirmClearOrders {
        lang: Lang,
    },
}

impl ConversationState {
    /// Whether this state is part of the order form (the global `Cancel`
    /// signal applies here).
    pub fn in_order_form(&self) -> bool {
        matches!(
            self,
            ConversationState::Contact { .. }
                | ConversationState::Name { .. }
                | ConversationState::Location { .. }
                | ConversationState::Address { .. }
                | ConversationState::AdditionalContact { .. }
                | ConversationState::Quantity { .. }
                | ConversationState::Confirm { .. }
        )
    }

    /// Language collected so far, if any.
    pub fn lang(&self) -> Option<Lang> {
        match self {
            ConversationState::Idle | ConversationState::LanguageSelect => None,
            ConversationState::Contact { lang }
            | ConversationState::Name { lang, .. }
            | ConversationState::Location { lang, .. }
            | ConversationState::Address { lang, .. }
            | ConversationState::AdditionalContact { lang, .. }
            | ConversationState::Quantity { lang, .. }
            | ConversationState::Confirm { lang, .. }
            | ConversationState::AdminMenu { lang }
            | ConversationState::AdminConfirmClearClients { lang }
            | ConversationState::AdminConfirmClearOrders { lang } => Some(*lang),
        }
    }
}

/// Keyed transient-state store.
///
/// The in-memory map is the default backend; the trait keeps the state machine
/// oblivious to where state actually lives (memory, file, cache).
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<ConversationState>;
    async fn set(&self, user_id: UserId, state: ConversationState) -> Result<()>;
    async fn clear(&self, user_id: UserId) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryStateStore {
    inner: Mutex<HashMap<UserId, ConversationState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, user_id: UserId) -> Result<ConversationState> {
        let map = self.inner.lock().await;
        Ok(map.get(&user_id).cloned().unwrap_or(ConversationState::Idle))
    }

    async fn set(&self, user_id: UserId, state: ConversationState) -> Result<()> {
        let mut map = self.inner.lock().await;
        map.insert(user_id, state);
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<()> {
        let mut map = self.inner.lock().await;
        map.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_state_reads_as_idle() {
        let store = MemoryStateStore::new();
        assert_eq!(store.get(UserId(7)).await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn set_get_clear_round_trip() {
        let store = MemoryStateStore::new();
        let uid = UserId(7);
        store
            .set(uid, ConversationState::Contact { lang: Lang::Ru })
            .await
            .unwrap();
        assert_eq!(
            store.get(uid).await.unwrap(),
            ConversationState::Contact { lang: Lang::Ru }
        );
        store.clear(uid).await.unwrap();
        assert_eq!(store.get(uid).await.unwrap(), ConversationState::Idle);
    }

    #[test]
    fn order_form_membership() {
        assert!(ConversationState::Contact { lang: Lang::Ru }.in_order_form());
        assert!(!ConversationState::Idle.in_order_form());
        assert!(!ConversationState::LanguageSelect.in_order_form());
        assert!(!ConversationState::AdminMenu { lang: Lang::Uz }.in_order_form());
    }
}
