//! Keyboard layouts for each conversation step.

use crate::{
    domain::{Lang, OrderId},
    i18n::{self, buttons},
    messaging::types::{InlineButton, InlineKeyboard, Markup, ReplyButton, ReplyKeyboard},
};

/// Main menu. The contact button is only offered while the user is
/// unregistered; the data-management entry only to staff.
pub fn main_menu(lang: Lang, is_staff: bool, is_registered: bool) -> Markup {
    let btn = buttons(lang);
    let mut rows = Vec::new();
    if !is_registered {
        rows.push(vec![ReplyButton::request_contact(btn.send_contact)]);
    }
    rows.push(vec![ReplyButton::text(btn.my_orders)]);
    rows.push(vec![ReplyButton::text(btn.start_over)]);
    if is_staff {
        rows.push(vec![ReplyButton::text(btn.manage_db)]);
    }
    rows.push(vec![ReplyButton::text(btn.change_lang)]);
    Markup::Reply(ReplyKeyboard { rows })
}

pub fn language_select() -> Markup {
    Markup::Reply(ReplyKeyboard {
        rows: vec![vec![
            ReplyButton::text(i18n::LANG_BUTTON_RU),
            ReplyButton::text(i18n::LANG_BUTTON_UZ),
        ]],
    })
}

pub fn contact(lang: Lang) -> Markup {
    let btn = buttons(lang);
    Markup::Reply(ReplyKeyboard {
        rows: vec![
            vec![ReplyButton::request_contact(btn.send_contact)],
            vec![ReplyButton::text(btn.cancel)],
        ],
    })
}

pub fn cancel_only(lang: Lang) -> Markup {
    let btn = buttons(lang);
    Markup::Reply(ReplyKeyboard {
        rows: vec![vec![ReplyButton::text(btn.cancel)]],
    })
}

pub fn location(lang: Lang) -> Markup {
    let btn = buttons(lang);
    Markup::Reply(ReplyKeyboard {
        rows: vec![
            vec![ReplyButton::request_location(btn.send_location)],
            vec![ReplyButton::text(btn.enter_address)],
            vec![ReplyButton::text(btn.cancel)],
        ],
    })
}

pub fn back_cancel(lang: Lang) -> Markup {
    let btn = buttons(lang);
    Markup::Reply(ReplyKeyboard {
        rows: vec![
            vec![ReplyButton::text(btn.back)],
            vec![ReplyButton::text(btn.cancel)],
        ],
    })
}

pub fn additional_contact(lang: Lang) -> Markup {
    let btn = buttons(lang);
    Markup::Reply(ReplyKeyboard {
        rows: vec![
            vec![ReplyButton::text(btn.skip)],
            vec![ReplyButton::text(btn.back)],
            vec![ReplyButton::text(btn.cancel)],
        ],
    })
}

/// Inline confirm/cancel pair under the order summary.
pub fn order_confirm() -> Markup {
    Markup::Inline(InlineKeyboard {
        rows: vec![
            vec![InlineButton::new("✅", "order:confirm")],
            vec![InlineButton::new("❌", "order:cancel")],
        ],
    })
}

/// Inline status controls under a staff order notification. Staff buttons are
/// always rendered in Russian, matching the shared staff chat convention.
pub fn staff_order_status(order_id: OrderId) -> Markup {
    let btn = buttons(Lang::Ru);
    Markup::Inline(InlineKeyboard {
        rows: vec![
            vec![
                InlineButton::new(btn.status_accept, format!("status:{}:accept", order_id.0)),
                InlineButton::new(btn.status_reject, format!("status:{}:reject", order_id.0)),
            ],
            vec![InlineButton::new(
                btn.status_complete,
                format!("status:{}:complete", order_id.0),
            )],
        ],
    })
}

pub fn admin_db(lang: Lang) -> Markup {
    let btn = buttons(lang);
    Markup::Inline(InlineKeyboard {
        rows: vec![
            vec![InlineButton::new(btn.clear_clients, "db:clients")],
            vec![InlineButton::new(btn.clear_orders, "db:orders")],
        ],
    })
}

pub fn admin_confirm(lang: Lang, target: &str) -> Markup {
    let btn = buttons(lang);
    Markup::Inline(InlineKeyboard {
        rows: vec![vec![
            InlineButton::new(btn.confirm_yes, format!("db:confirm:{target}:yes")),
            InlineButton::new(btn.confirm_no, format!("db:confirm:{target}:no")),
        ]],
    })
}
