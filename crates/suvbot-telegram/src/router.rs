use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use suvbot_core::{
    config::Config,
    flow::OrderFlow,
    lifecycle::Lifecycle,
    messaging::port::MessagingPort,
    notify::Notifier,
    repo::{ClientRepo, OrderRepo},
    state::MemoryStateStore,
};

use crate::{handlers, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub flow: Arc<OrderFlow>,
    pub lifecycle: Arc<Lifecycle>,
    pub notifier: Arc<Notifier>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Wire everything together and run long polling until shutdown.
pub async fn run_polling(
    cfg: Arc<Config>,
    clients: Arc<dyn ClientRepo>,
    orders: Arc<dyn OrderRepo>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!(bot = me.username(), "bot started");
    }
    tracing::info!(
        staff = cfg.staff_chat_ids.len(),
        group = cfg.group_chat_id,
        "staff routing configured"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let states = Arc::new(MemoryStateStore::new());

    let state = Arc::new(AppState {
        flow: Arc::new(OrderFlow::new(
            clients.clone(),
            orders.clone(),
            states,
            cfg.clone(),
        )),
        lifecycle: Arc::new(Lifecycle::new(clients, orders, cfg.clone())),
        notifier: Arc::new(Notifier::new(messenger.clone(), cfg.clone())),
        messenger,
        cfg,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
