//! Conversation state machine for registration + order entry.
//!
//! Dispatch is an explicit match on (state, input category). Button signals
//! are recognized first (most specific match wins), then the state decides
//! what free-form input means. Every repo access goes through the ports in
//! `repo`, so the whole flow is testable against in-memory fakes.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::Config,
    domain::{photo_name_sentinel, Client, GeoPoint, Lang, NewOrder, Order, OrderStatus, UserInfo},
    format::{self, SummaryInfo},
    i18n::{self, buttons, texts},
    keyboards,
    messaging::types::Markup,
    phone,
    repo::{ClientRepo, OrderRepo},
    state::{ConversationState, OrderDraft, StateStore},
    Result,
};

/// Largest bottle count accepted from a single order; anything above is
/// treated like any other invalid quantity and re-prompted.
pub const MAX_QUANTITY: i64 = 10_000;

/// Inbound content, already classified by the transport adapter.
#[derive(Clone, Debug)]
pub enum UserInput {
    Text(String),
    ContactCard { phone: String },
    Location(GeoPoint),
    Photo { file_id: String },
    Other,
}

/// Button signals recognized across both languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    LangRu,
    LangUz,
    Cancel,
    Back,
    Skip,
    StartOver,
    ChangeLang,
    MyOrders,
    ManageDb,
    EnterAddress,
}

/// Match text against the localized button labels of both languages.
pub fn signal_of(text: &str) -> Option<Signal> {
    if text == i18n::LANG_BUTTON_RU {
        return Some(Signal::LangRu);
    }
    if text == i18n::LANG_BUTTON_UZ {
        return Some(Signal::LangUz);
    }
    for lang in [Lang::Ru, Lang::Uz] {
        let btn = buttons(lang);
        let matched = match text {
            t if t == btn.cancel => Some(Signal::Cancel),
            t if t == btn.back => Some(Signal::Back),
            t if t == btn.skip => Some(Signal::Skip),
            t if t == btn.start_over => Some(Signal::StartOver),
            t if t == btn.change_lang => Some(Signal::ChangeLang),
            t if t == btn.my_orders => Some(Signal::MyOrders),
            t if t == btn.manage_db => Some(Signal::ManageDb),
            t if t == btn.enter_address => Some(Signal::EnterAddress),
            _ => None,
        };
        if matched.is_some() {
            return matched;
        }
    }
    None
}

/// One outgoing message addressed to the user driving the update.
#[derive(Clone, Debug)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
}

impl Reply {
    pub fn new(text: impl Into<String>, markup: Markup) -> Self {
        Self {
            text: text.into(),
            markup,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmDecision {
    Confirm,
    Cancel,
}

/// Result of the inline confirm/cancel press under the order summary.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// The press did not come from a live `Confirm` state (stale button).
    Stale,
    Cancelled {
        lang: Lang,
        note: String,
        followups: Vec<Reply>,
    },
    Committed {
        lang: Lang,
        note: String,
        followups: Vec<Reply>,
        order: Order,
        client: Option<Client>,
    },
    /// Commit preconditions violated; treated as an internal inconsistency.
    Inconsistent {
        lang: Lang,
        note: String,
        followups: Vec<Reply>,
    },
}

/// Staff data-management callback actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminAction {
    MenuClients,
    MenuOrders,
    ConfirmClients(bool),
    ConfirmOrders(bool),
}

#[derive(Debug)]
pub enum AdminOutcome {
    Denied { lang: Lang },
    /// State mismatch or stale callback; answer and do nothing.
    Ignored,
    ShowConfirm { text: String, markup: Markup },
    Finished { text: String, followups: Vec<Reply> },
}

pub struct OrderFlow {
    clients: Arc<dyn ClientRepo>,
    orders: Arc<dyn OrderRepo>,
    states: Arc<dyn StateStore>,
    cfg: Arc<Config>,
}

impl OrderFlow {
    pub fn new(
        clients: Arc<dyn ClientRepo>,
        orders: Arc<dyn OrderRepo>,
        states: Arc<dyn StateStore>,
        cfg: Arc<Config>,
    ) -> Self {
        Self {
            clients,
            orders,
            states,
            cfg,
        }
    }

    /// `/start` (and the "start over" button): reset state; registered clients
    /// with a saved contact jump straight to the location step, everyone else
    /// begins with language selection.
    pub async fn on_start(&self, user: &UserInfo) -> Result<Vec<Reply>> {
        self.states.clear(user.id).await?;

        let client = self.clients.get(user.id).await?;
        if let Some(c) = &client {
            let lang = c.language.unwrap_or(Lang::Ru);
            if c.is_registered() {
                if let Some(contact) = c.contact.clone().filter(|s| !s.is_empty()) {
                    let name = c.name.clone().unwrap_or_default();
                    let greeting = format::greeting(&name, lang);
                    self.states
                        .set(
                            user.id,
                            ConversationState::Location {
                                lang,
                                contact,
                                name,
                            },
                        )
                        .await?;
                    return Ok(vec![Reply::new(
                        format!("{greeting}{}", texts(lang).send_location),
                        keyboards::location(lang),
                    )]);
                }
                // Registered but without a stored contact: collect it again
                // before taking an order.
                self.states
                    .set(user.id, ConversationState::Contact { lang })
                    .await?;
                return Ok(vec![Reply::new(
                    texts(lang).send_contact,
                    keyboards::contact(lang),
                )]);
            }
        }

        self.states
            .set(user.id, ConversationState::LanguageSelect)
            .await?;
        Ok(vec![Reply::new(
            texts(Lang::Ru).choose_language,
            keyboards::language_select(),
        )])
    }

    /// Main entry point for a classified user message.
    pub async fn on_message(&self, user: &UserInfo, input: UserInput) -> Result<Vec<Reply>> {
        let state = self.states.get(user.id).await?;

        // Signals first: the most specific match wins over free-text handling.
        if let UserInput::Text(text) = &input {
            match signal_of(text) {
                Some(Signal::StartOver) => return self.on_start(user).await,
                Some(Signal::ChangeLang) => return self.change_language(user).await,
                Some(Signal::MyOrders) => return self.my_orders(user, &state).await,
                Some(Signal::ManageDb) => return self.manage_db(user, &state).await,
                Some(Signal::Cancel) if state.in_order_form() => {
                    return self.cancel_process(user, &state).await;
                }
                _ => {}
            }
        }

        match state {
            ConversationState::Idle => self.fallthrough(user, &state).await,
            ConversationState::LanguageSelect => self.step_language(user, input).await,
            ConversationState::Contact { lang } => self.step_contact(user, lang, input).await,
            ConversationState::Name { lang, contact } => {
                self.step_name(user, lang, contact, input).await
            }
            ConversationState::Location {
                lang,
                contact,
                name,
            } => self.step_location(user, lang, contact, name, input).await,
            ConversationState::Address {
                lang,
                contact,
                name,
                location,
            } => {
                self.step_address(user, lang, contact, name, location, input)
                    .await
            }
            ConversationState::AdditionalContact {
                lang,
                contact,
                name,
                location,
                address,
            } => {
                self.step_additional(user, lang, contact, name, location, address, input)
                    .await
            }
            ConversationState::Quantity {
                lang,
                contact,
                name,
                location,
                address,
                additional_contact,
            } => {
                self.step_quantity(
                    user,
                    lang,
                    contact,
                    name,
                    location,
                    address,
                    additional_contact,
                    input,
                )
                .await
            }
            // Confirm and the admin mini-flow are driven by inline buttons;
            // stray messages fall back to the main menu.
            ConversationState::Confirm { .. }
            | ConversationState::AdminMenu { .. }
            | ConversationState::AdminConfirmClearClients { .. }
            | ConversationState::AdminConfirmClearOrders { .. } => {
                self.fallthrough(user, &state).await
            }
        }
    }

    // ---- individual steps ----

    async fn step_language(&self, user: &UserInfo, input: UserInput) -> Result<Vec<Reply>> {
        let lang = match &input {
            UserInput::Text(t) => match signal_of(t) {
                Some(Signal::LangRu) => Some(Lang::Ru),
                Some(Signal::LangUz) => Some(Lang::Uz),
                _ => None,
            },
            _ => None,
        };
        let Some(lang) = lang else {
            return Ok(vec![Reply::new(
                texts(Lang::Ru).choose_language,
                keyboards::language_select(),
            )]);
        };

        self.clients
            .upsert_language(user.id, user.username.as_deref(), lang)
            .await?;
        tracing::info!(user = user.id.0, lang = lang.as_str(), "language selected");

        self.states
            .set(user.id, ConversationState::Contact { lang })
            .await?;
        Ok(vec![Reply::new(
            texts(lang).send_contact,
            keyboards::contact(lang),
        )])
    }

    async fn step_contact(
        &self,
        user: &UserInfo,
        lang: Lang,
        input: UserInput,
    ) -> Result<Vec<Reply>> {
        let UserInput::ContactCard { phone } = input else {
            return Ok(vec![Reply::new(
                texts(lang).prompt_contact,
                keyboards::contact(lang),
            )]);
        };

        let normalized = phone::normalize(&phone);
        self.clients
            .set_contact(user.id, &normalized, user.username.as_deref())
            .await?;
        tracing::info!(user = user.id.0, "contact saved");

        self.states
            .set(
                user.id,
                ConversationState::Name {
                    lang,
                    contact: normalized,
                },
            )
            .await?;
        Ok(vec![Reply::new(
            texts(lang).contact_saved,
            keyboards::cancel_only(lang),
        )])
    }

    async fn step_name(
        &self,
        user: &UserInfo,
        lang: Lang,
        contact: String,
        input: UserInput,
    ) -> Result<Vec<Reply>> {
        let name = match input {
            UserInput::Text(text) if signal_of(&text).is_none() => {
                let trimmed = text.trim();
                // First + last name: at least two whitespace-separated tokens.
                if trimmed.split_whitespace().count() >= 2 {
                    Some(trimmed.to_string())
                } else {
                    None
                }
            }
            UserInput::Photo { file_id } => Some(photo_name_sentinel(&file_id)),
            _ => None,
        };
        let Some(name) = name else {
            return Ok(vec![Reply::new(
                texts(lang).please_full_name,
                keyboards::cancel_only(lang),
            )]);
        };

        self.clients.set_name(user.id, &name).await?;
        tracing::info!(user = user.id.0, "name saved");

        let shown = if crate::domain::is_photo_name(&name) {
            texts(lang).by_photo.to_string()
        } else {
            name.clone()
        };
        self.states
            .set(
                user.id,
                ConversationState::Location {
                    lang,
                    contact,
                    name,
                },
            )
            .await?;
        Ok(vec![Reply::new(
            format::name_saved(&shown, lang),
            keyboards::location(lang),
        )])
    }

    async fn step_location(
        &self,
        user: &UserInfo,
        lang: Lang,
        contact: String,
        name: String,
        input: UserInput,
    ) -> Result<Vec<Reply>> {
        let location = match &input {
            UserInput::Location(point) => Some(Some(*point)),
            UserInput::Text(t) if signal_of(t) == Some(Signal::EnterAddress) => Some(None),
            _ => None,
        };
        let Some(location) = location else {
            // Free text here is never interpreted as an address.
            let t = texts(lang);
            return Ok(vec![Reply::new(
                format!("{}\n\n{}", t.invalid_input, t.send_location),
                keyboards::location(lang),
            )]);
        };

        self.states
            .set(
                user.id,
                ConversationState::Address {
                    lang,
                    contact,
                    name,
                    location,
                },
            )
            .await?;
        Ok(vec![Reply::new(
            texts(lang).address_prompt,
            keyboards::back_cancel(lang),
        )])
    }

    #[allow(clippy::too_many_arguments)]
    async fn step_address(
        &self,
        user: &UserInfo,
        lang: Lang,
        contact: String,
        name: String,
        location: Option<GeoPoint>,
        input: UserInput,
    ) -> Result<Vec<Reply>> {
        if let UserInput::Text(t) = &input {
            if signal_of(t) == Some(Signal::Back) {
                // Back to the location step; the partial address is dropped.
                self.states
                    .set(
                        user.id,
                        ConversationState::Location {
                            lang,
                            contact,
                            name,
                        },
                    )
                    .await?;
                return Ok(vec![Reply::new(
                    texts(lang).send_location,
                    keyboards::location(lang),
                )]);
            }
        }

        let address = match &input {
            UserInput::Text(t) if !t.trim().is_empty() && signal_of(t).is_none() => {
                Some(t.trim().to_string())
            }
            _ => None,
        };
        let Some(address) = address else {
            return Ok(vec![Reply::new(
                texts(lang).address_prompt,
                keyboards::back_cancel(lang),
            )]);
        };

        self.states
            .set(
                user.id,
                ConversationState::AdditionalContact {
                    lang,
                    contact,
                    name,
                    location,
                    address,
                },
            )
            .await?;
        Ok(vec![Reply::new(
            texts(lang).additional_prompt,
            keyboards::additional_contact(lang),
        )])
    }

    #[allow(clippy::too_many_arguments)]
    async fn step_additional(
        &self,
        user: &UserInfo,
        lang: Lang,
        contact: String,
        name: String,
        location: Option<GeoPoint>,
        address: String,
        input: UserInput,
    ) -> Result<Vec<Reply>> {
        let additional = match &input {
            UserInput::Text(t) => match signal_of(t) {
                Some(Signal::Skip) => Some(None),
                Some(Signal::Back) => {
                    self.states
                        .set(
                            user.id,
                            ConversationState::Address {
                                lang,
                                contact,
                                name,
                                location,
                            },
                        )
                        .await?;
                    return Ok(vec![Reply::new(
                        texts(lang).address_prompt,
                        keyboards::back_cancel(lang),
                    )]);
                }
                None if !t.trim().is_empty() => Some(Some(t.trim().to_string())),
                _ => None,
            },
            _ => None,
        };
        let Some(additional_contact) = additional else {
            return Ok(vec![Reply::new(
                texts(lang).additional_prompt,
                keyboards::additional_contact(lang),
            )]);
        };

        self.states
            .set(
                user.id,
                ConversationState::Quantity {
                    lang,
                    contact,
                    name,
                    location,
                    address,
                    additional_contact,
                },
            )
            .await?;
        Ok(vec![Reply::new(
            format::input_quantity(self.cfg.price_per_bottle, lang),
            keyboards::back_cancel(lang),
        )])
    }

    #[allow(clippy::too_many_arguments)]
    async fn step_quantity(
        &self,
        user: &UserInfo,
        lang: Lang,
        contact: String,
        name: String,
        location: Option<GeoPoint>,
        address: String,
        additional_contact: Option<String>,
        input: UserInput,
    ) -> Result<Vec<Reply>> {
        if let UserInput::Text(t) = &input {
            if signal_of(t) == Some(Signal::Back) {
                self.states
                    .set(
                        user.id,
                        ConversationState::AdditionalContact {
                            lang,
                            contact,
                            name,
                            location,
                            address,
                        },
                    )
                    .await?;
                return Ok(vec![Reply::new(
                    texts(lang).additional_prompt,
                    keyboards::additional_contact(lang),
                )]);
            }
        }

        let quantity = match &input {
            UserInput::Text(t) if signal_of(t).is_none() => t.trim().parse::<i64>().ok(),
            _ => None,
        };
        let Some(quantity) = quantity.filter(|q| (1..=MAX_QUANTITY).contains(q)) else {
            let t = texts(lang);
            return Ok(vec![Reply::new(
                format!("{} {}", t.invalid_input, t.positive_number_required),
                keyboards::back_cancel(lang),
            )]);
        };

        // The store is authoritative for name/username on the summary; the
        // conversation copy may be older than a parallel registration update.
        let client = self.clients.get(user.id).await?;
        let summary_name = client
            .as_ref()
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| name.clone());
        let username = client
            .as_ref()
            .and_then(|c| c.username.clone())
            .or_else(|| user.username.clone());

        let draft = OrderDraft {
            contact,
            name,
            location,
            address: Some(address),
            additional_contact,
            quantity,
        };
        let info = SummaryInfo {
            name: Some(summary_name.as_str()),
            username: username.as_deref(),
            contact: Some(draft.contact.as_str()),
            additional_contact: draft.additional_contact.as_deref(),
            address: draft.address.as_deref(),
            has_location: draft.location.is_some(),
            quantity: draft.quantity,
            price_per_bottle: self.cfg.price_per_bottle,
        };
        let summary = format::confirm_summary(&info, lang);

        self.states
            .set(user.id, ConversationState::Confirm { lang, draft })
            .await?;
        Ok(vec![Reply::new(summary, keyboards::order_confirm())])
    }

    /// Inline confirm/cancel under the order summary.
    pub async fn on_confirm(
        &self,
        user: &UserInfo,
        decision: ConfirmDecision,
    ) -> Result<ConfirmOutcome> {
        let state = self.states.get(user.id).await?;
        let ConversationState::Confirm { lang, draft } = state else {
            return Ok(ConfirmOutcome::Stale);
        };

        if decision == ConfirmDecision::Cancel {
            self.states.clear(user.id).await?;
            let followups = self.menu_replies(user, lang).await?;
            return Ok(ConfirmOutcome::Cancelled {
                lang,
                note: texts(lang).order_cancelled.to_string(),
                followups,
            });
        }

        // Commit precondition; a violation here is an internal inconsistency,
        // not user error.
        let complete = !draft.contact.is_empty()
            && (draft.address.as_deref().is_some_and(|a| !a.is_empty())
                || draft.location.is_some())
            && draft.quantity > 0;
        if !complete {
            tracing::error!(user = user.id.0, ?draft, "order draft incomplete at confirm");
            self.states.clear(user.id).await?;
            let followups = self.menu_replies(user, lang).await?;
            return Ok(ConfirmOutcome::Inconsistent {
                lang,
                note: texts(lang).error_processing.to_string(),
                followups,
            });
        }

        let new_order = NewOrder {
            user_id: user.id,
            contact: draft.contact.clone(),
            additional_contact: draft.additional_contact.clone(),
            location: draft.location,
            address: draft.address.clone(),
            quantity: draft.quantity,
            order_time: Utc::now(),
        };
        let order_id = self.orders.insert(&new_order).await?;
        tracing::info!(order = order_id.0, user = user.id.0, "order committed");

        let order = Order {
            order_id,
            user_id: new_order.user_id,
            contact: new_order.contact,
            additional_contact: new_order.additional_contact,
            location: new_order.location,
            address: new_order.address,
            quantity: new_order.quantity,
            order_time: new_order.order_time,
            status: OrderStatus::Pending,
        };
        let client = self.clients.get(user.id).await?;

        self.states.clear(user.id).await?;
        let followups = self.menu_replies(user, lang).await?;
        Ok(ConfirmOutcome::Committed {
            lang,
            note: texts(lang).order_confirmed.to_string(),
            followups,
            order,
            client,
        })
    }

    /// Staff data-management inline actions.
    pub async fn on_admin(&self, user: &UserInfo, action: AdminAction) -> Result<AdminOutcome> {
        let state = self.states.get(user.id).await?;
        let lang = self.lang_for(user, &state).await?;

        if !self.cfg.is_staff(user.id.0) {
            self.states.clear(user.id).await?;
            return Ok(AdminOutcome::Denied { lang });
        }

        match (state, action) {
            (ConversationState::AdminMenu { lang }, AdminAction::MenuClients) => {
                self.states
                    .set(user.id, ConversationState::AdminConfirmClearClients { lang })
                    .await?;
                Ok(AdminOutcome::ShowConfirm {
                    text: texts(lang).clear_clients_confirm.to_string(),
                    markup: keyboards::admin_confirm(lang, "clients"),
                })
            }
            (ConversationState::AdminMenu { lang }, AdminAction::MenuOrders) => {
                self.states
                    .set(user.id, ConversationState::AdminConfirmClearOrders { lang })
                    .await?;
                Ok(AdminOutcome::ShowConfirm {
                    text: texts(lang).clear_orders_confirm.to_string(),
                    markup: keyboards::admin_confirm(lang, "orders"),
                })
            }
            (
                ConversationState::AdminConfirmClearClients { lang },
                AdminAction::ConfirmClients(yes),
            ) => {
                let text = if yes {
                    let n = self.clients.clear_all().await?;
                    tracing::info!(admin = user.id.0, deleted = n, "clients cleared (cascade)");
                    texts(lang).db_clients_cleared.to_string()
                } else {
                    texts(lang).action_cancelled.to_string()
                };
                self.states.clear(user.id).await?;
                let followups = self.menu_replies(user, lang).await?;
                Ok(AdminOutcome::Finished { text, followups })
            }
            (
                ConversationState::AdminConfirmClearOrders { lang },
                AdminAction::ConfirmOrders(yes),
            ) => {
                let text = if yes {
                    let n = self.orders.clear_all().await?;
                    tracing::info!(admin = user.id.0, deleted = n, "orders cleared");
                    texts(lang).db_orders_cleared.to_string()
                } else {
                    texts(lang).action_cancelled.to_string()
                };
                self.states.clear(user.id).await?;
                let followups = self.menu_replies(user, lang).await?;
                Ok(AdminOutcome::Finished { text, followups })
            }
            _ => Ok(AdminOutcome::Ignored),
        }
    }

    /// Defensive reset used by the transport when a step fails with a storage
    /// error: log happened at the call site, here we only bring the user back
    /// to a consistent place.
    pub async fn recover(&self, user: &UserInfo) -> Vec<Reply> {
        let lang = match self.states.get(user.id).await {
            Ok(state) => match self.lang_for(user, &state).await {
                Ok(l) => l,
                Err(_) => Lang::Ru,
            },
            Err(_) => Lang::Ru,
        };
        let _ = self.states.clear(user.id).await;

        let mut replies = vec![Reply::new(texts(lang).error_processing, Markup::Remove)];
        match self.menu_replies(user, lang).await {
            Ok(mut menu) => replies.append(&mut menu),
            Err(_) => replies.push(Reply::new(
                texts(lang).back_to_main,
                keyboards::main_menu(lang, self.cfg.is_staff(user.id.0), false),
            )),
        }
        replies
    }

    // ---- global overrides ----

    async fn change_language(&self, user: &UserInfo) -> Result<Vec<Reply>> {
        self.states.clear(user.id).await?;
        self.states
            .set(user.id, ConversationState::LanguageSelect)
            .await?;
        Ok(vec![Reply::new(
            texts(Lang::Ru).choose_language,
            keyboards::language_select(),
        )])
    }

    async fn my_orders(&self, user: &UserInfo, state: &ConversationState) -> Result<Vec<Reply>> {
        let lang = self.lang_for(user, state).await?;
        self.states.clear(user.id).await?;

        // Gate on the store, not on conversation state.
        if !self.clients.is_registered(user.id).await? {
            let menu = self.menu_markup(user, lang).await?;
            return Ok(vec![Reply::new(texts(lang).access_denied, menu)]);
        }

        let orders = self.orders.list_for_user(user.id).await?;
        let menu = self.menu_markup(user, lang).await?;
        if orders.is_empty() {
            return Ok(vec![Reply::new(texts(lang).no_orders, menu)]);
        }

        let mut blocks = vec![texts(lang).my_orders_title.to_string()];
        blocks.extend(orders.iter().map(|o| format::order_info_line(o, lang)));
        Ok(vec![Reply::new(blocks.join("\n\n"), menu)])
    }

    async fn manage_db(&self, user: &UserInfo, state: &ConversationState) -> Result<Vec<Reply>> {
        let lang = self.lang_for(user, state).await?;
        self.states.clear(user.id).await?;

        if !self.cfg.is_staff(user.id.0) {
            let menu = self.menu_markup(user, lang).await?;
            return Ok(vec![Reply::new(texts(lang).access_denied, menu)]);
        }

        self.states
            .set(user.id, ConversationState::AdminMenu { lang })
            .await?;
        Ok(vec![Reply::new(
            texts(lang).choose_admin_action,
            keyboards::admin_db(lang),
        )])
    }

    async fn cancel_process(
        &self,
        user: &UserInfo,
        state: &ConversationState,
    ) -> Result<Vec<Reply>> {
        let lang = self.lang_for(user, state).await?;
        self.states.clear(user.id).await?;
        let menu = self.menu_markup(user, lang).await?;
        Ok(vec![Reply::new(texts(lang).process_cancelled, menu)])
    }

    /// Unexpected input outside of a live form step: short refusal + menu,
    /// state reset.
    async fn fallthrough(&self, user: &UserInfo, state: &ConversationState) -> Result<Vec<Reply>> {
        let lang = self.lang_for(user, state).await?;
        self.states.clear(user.id).await?;
        let t = texts(lang);
        let menu = self.menu_markup(user, lang).await?;
        Ok(vec![Reply::new(
            format!("{} {}", t.invalid_input, t.back_to_main),
            menu,
        )])
    }

    // ---- helpers ----

    async fn lang_for(&self, user: &UserInfo, state: &ConversationState) -> Result<Lang> {
        if let Some(lang) = state.lang() {
            return Ok(lang);
        }
        Ok(self
            .clients
            .language_of(user.id)
            .await?
            .unwrap_or(Lang::Ru))
    }

    async fn menu_markup(&self, user: &UserInfo, lang: Lang) -> Result<Markup> {
        let registered = self.clients.is_registered(user.id).await?;
        Ok(keyboards::main_menu(
            lang,
            self.cfg.is_staff(user.id.0),
            registered,
        ))
    }

    async fn menu_replies(&self, user: &UserInfo, lang: Lang) -> Result<Vec<Reply>> {
        let menu = self.menu_markup(user, lang).await?;
        Ok(vec![Reply::new(texts(lang).back_to_main, menu)])
    }
}
