//! Message rendering: order summaries, staff notifications, status edits.

use chrono::{DateTime, Utc};

use crate::{
    domain::{is_photo_name, Client, Lang, Order, OrderId, OrderStatus, StaffActor, UserId},
    i18n::{format_thousands, localize_date, status_label, texts},
};

/// Minimal HTML escaping for user-controlled fields embedded in HTML messages.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Everything needed to render the 5-line order block.
#[derive(Clone, Debug)]
pub struct SummaryInfo<'a> {
    pub name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub contact: Option<&'a str>,
    pub additional_contact: Option<&'a str>,
    pub address: Option<&'a str>,
    pub has_location: bool,
    pub quantity: i64,
    pub price_per_bottle: i64,
}

impl<'a> SummaryInfo<'a> {
    pub fn total(&self) -> i64 {
        // Quantity is bounded at intake, but stored rows are rendered too.
        self.quantity.saturating_mul(self.price_per_bottle)
    }

    /// Build a summary from a persisted order; client identity fields come
    /// from the client row when one exists.
    pub fn from_order(
        order: &'a Order,
        client: Option<&'a Client>,
        price_per_bottle: i64,
    ) -> Self {
        Self {
            name: client.and_then(|c| c.name.as_deref()),
            username: client.and_then(|c| c.username.as_deref()),
            contact: Some(order.contact.as_str()),
            additional_contact: order.additional_contact.as_deref(),
            address: order.address.as_deref(),
            has_location: order.location.is_some(),
            quantity: order.quantity,
            price_per_bottle,
        }
    }
}

fn display_name(info: &SummaryInfo<'_>, lang: Lang) -> String {
    let t = texts(lang);
    let base = match info.name {
        Some(n) if is_photo_name(n) => t.by_photo.to_string(),
        Some(n) if !n.is_empty() => n.to_string(),
        _ => t.not_specified.to_string(),
    };
    match info.username {
        Some(u) if !u.is_empty() => format!("{base} (@{u})"),
        _ => base,
    }
}

fn display_address(info: &SummaryInfo<'_>, lang: Lang) -> String {
    let t = texts(lang);
    match info.address {
        Some(a) if !a.is_empty() => a.to_string(),
        _ if info.has_location => t.location_attached.to_string(),
        _ => t.location_not_specified.to_string(),
    }
}

/// The order block shared by the confirmation screen, staff notifications and
/// client status updates.
pub fn order_block(info: &SummaryInfo<'_>, lang: Lang) -> String {
    let t = texts(lang);
    format!(
        "👤 {name}\n📞 Основной: {contact}\n📞 Доп.: {extra}\n📍 Адрес: {addr}\n🔢 Количество: {qty} {units} (Общая сумма: {total} {cur})",
        name = display_name(info, lang),
        contact = info.contact.filter(|c| !c.is_empty()).unwrap_or(t.not_specified),
        extra = info.additional_contact.filter(|c| !c.is_empty()).unwrap_or("–"),
        addr = display_address(info, lang),
        qty = info.quantity,
        units = t.units,
        total = format_thousands(info.total()),
        cur = t.currency,
    )
}

/// Confirmation screen shown to the user before commit.
pub fn confirm_summary(info: &SummaryInfo<'_>, lang: Lang) -> String {
    format!("{}\n\n{}", texts(lang).order_summary_title, order_block(info, lang))
}

/// HTML staff notification for a freshly committed order. Staff messages are
/// always rendered in Russian.
pub fn staff_order_message(
    order_id: OrderId,
    user_id: UserId,
    info: &SummaryInfo<'_>,
    order_time: DateTime<Utc>,
) -> String {
    format!(
        "📣 <b>Новый заказ</b> (№{id})\n\n{block}\n⏰ Время заказа: {time}\n🆔 User ID: <code>{uid}</code>\n✨ Статус: {status}",
        id = order_id.0,
        block = escape_html(&order_block(info, Lang::Ru)),
        time = localize_date(order_time, Lang::Ru),
        uid = user_id.0,
        status = status_label(OrderStatus::Pending, Lang::Ru),
    )
}

/// Localized status-change notification for the owning client.
pub fn client_status_update(
    order_id: OrderId,
    status: OrderStatus,
    info: &SummaryInfo<'_>,
    lang: Lang,
) -> String {
    let template = match lang {
        Lang::Ru => "📦 Статус вашего заказа №{order_id} обновлен: {status}",
        Lang::Uz => "📦 Sizning №{order_id} buyurtmangiz holati yangilandi: {status}",
    };
    let head = template
        .replace("{order_id}", &order_id.0.to_string())
        .replace("{status}", status_label(status, lang));
    format!("{head}\n\n{}", order_block(info, lang))
}

/// Attribution line appended to the staff message after a status change.
pub fn staff_log_line(order_id: OrderId, status: OrderStatus, actor: &StaffActor) -> String {
    format!(
        "Заказ №{id} переведен в статус '{status}' админом {name} (@{username}).",
        id = order_id.0,
        status = status_label(status, Lang::Ru),
        name = actor.name,
        username = actor.username.as_deref().unwrap_or("N/A"),
    )
}

const STATUS_LINE_PREFIX: &str = "✨ Статус: ";
const LOG_BLOCK_PREFIX: &str = "\n\n<i>";

/// Rewrite the staff message for a status change: replace the status line
/// (or append one if missing) and replace/append the italic attribution block.
pub fn apply_status_update(original: &str, status: OrderStatus, log_line: &str) -> String {
    let new_status_line = format!("{STATUS_LINE_PREFIX}{}", status_label(status, Lang::Ru));

    let mut updated = if original.contains(STATUS_LINE_PREFIX) {
        original
            .lines()
            .map(|line| {
                if line.starts_with(STATUS_LINE_PREFIX) {
                    new_status_line.clone()
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        format!("{original}\n{new_status_line}")
    };

    // One attribution block only: the latest change replaces the previous one.
    if let Some(idx) = updated.find(LOG_BLOCK_PREFIX) {
        updated.truncate(idx);
    }
    format!("{updated}{LOG_BLOCK_PREFIX}{}</i>", escape_html(log_line))
}

/// One line of the "my orders" listing.
pub fn order_info_line(order: &Order, lang: Lang) -> String {
    let t = texts(lang);
    let addr = match order.address.as_deref() {
        Some(a) if !a.is_empty() => a.to_string(),
        _ if order.location.is_some() => t.location_attached.to_string(),
        _ => t.location_not_specified.to_string(),
    };
    let (status_word, addr_word) = match lang {
        Lang::Ru => ("Статус", "Адрес"),
        Lang::Uz => ("Holati", "Manzil"),
    };
    format!(
        "№{id} | {time} | {qty} {units} | {status_word}: {status}\n{addr_word}: {addr}",
        id = order.order_id.0,
        time = localize_date(order.order_time, lang),
        qty = order.quantity,
        units = t.units,
        status = status_label(order.status, lang),
    )
}

/// Greeting used by /start for a registered client.
pub fn greeting(name: &str, lang: Lang) -> String {
    let shown = if is_photo_name(name) {
        texts(lang).by_photo
    } else {
        name
    };
    match lang {
        Lang::Ru => format!("👋 Добро пожаловать, {shown}!\n\n"),
        Lang::Uz => format!("👋 Xush kelibsiz, {shown}!\n\n"),
    }
}

/// Post-name prompt ("thanks, now send a location").
pub fn name_saved(name: &str, lang: Lang) -> String {
    match lang {
        Lang::Ru => format!("Спасибо, {name}! Теперь отправьте локацию или введите адрес вручную."),
        Lang::Uz => format!(
            "Rahmat, {name}! Endi joylashuvingizni yuboring yoki manzilingizni qo'lda kiriting."
        ),
    }
}

/// Quantity prompt with the configured unit price.
pub fn input_quantity(price_per_bottle: i64, lang: Lang) -> String {
    match lang {
        Lang::Ru => format!(
            "Введите количество бутылей (шт.).\nЦена за бутылку: {} сум.",
            format_thousands(price_per_bottle)
        ),
        Lang::Uz => format!(
            "Iltimos, butilkalar sonini kiriting (dona).\nButilka narxi: {} so'm.",
            format_thousands(price_per_bottle)
        ),
    }
}

/// Finalized-order refusal shown to staff on a stale button press.
pub fn already_finalized(order_id: OrderId, status: OrderStatus, lang: Lang) -> String {
    match lang {
        Lang::Ru => format!(
            "Статус заказа №{} уже финальный ({}). Изменение невозможно.",
            order_id.0,
            status_label(status, lang)
        ),
        Lang::Uz => format!(
            "№{} buyurtmasining holati allaqachon yakunlangan ({}). O'zgartirish mumkin emas.",
            order_id.0,
            status_label(status, lang)
        ),
    }
}

/// Staff-facing refusal for an illegal lifecycle step.
pub fn invalid_transition(from: OrderStatus, to: OrderStatus, lang: Lang) -> String {
    match lang {
        Lang::Ru => format!(
            "Недопустимый переход статуса: '{}' → '{}'.",
            status_label(from, lang),
            status_label(to, lang)
        ),
        Lang::Uz => format!(
            "Holatni o'zgartirish mumkin emas: '{}' → '{}'.",
            status_label(from, lang),
            status_label(to, lang)
        ),
    }
}

pub fn order_not_found(order_id: OrderId, lang: Lang) -> String {
    match lang {
        Lang::Ru => format!("Заказ с ID {} не найден.", order_id.0),
        Lang::Uz => format!("{} ID raqamli buyurtma topilmadi.", order_id.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info() -> SummaryInfo<'static> {
        SummaryInfo {
            name: Some("Ivan Petrov"),
            username: Some("ivan"),
            contact: Some("+998901234567"),
            additional_contact: None,
            address: None,
            has_location: true,
            quantity: 3,
            price_per_bottle: 16_000,
        }
    }

    #[test]
    fn total_is_quantity_times_unit_price() {
        assert_eq!(info().total(), 48_000);
        let block = order_block(&info(), Lang::Ru);
        assert!(block.contains("48,000"));
        assert!(block.contains("Локация"));
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let mut i = info();
        i.quantity = i64::MAX / 2;
        assert_eq!(i.total(), i64::MAX);
        // Rendering a saturated total must not panic.
        let block = order_block(&i, Lang::Ru);
        assert!(block.contains(&format_thousands(i64::MAX)));
    }

    #[test]
    fn address_wins_over_location_in_summary() {
        let mut i = info();
        i.address = Some("Чиланзар, д. 5");
        let block = order_block(&i, Lang::Ru);
        assert!(block.contains("Чиланзар"));
        assert!(!block.contains("Локация\n"));
    }

    #[test]
    fn photo_sentinel_renders_as_by_photo() {
        let mut i = info();
        i.name = Some("photo:AgACAgQ");
        let block = order_block(&i, Lang::Uz);
        assert!(block.contains("fotosurat orqali"));
        assert!(!block.contains("photo:"));
    }

    #[test]
    fn staff_message_carries_id_and_pending_status() {
        let ts = Utc.with_ymd_and_hms(2026, 5, 5, 9, 0, 0).unwrap();
        let msg = staff_order_message(OrderId(7), UserId(100), &info(), ts);
        assert!(msg.contains("№7"));
        assert!(msg.contains("✨ Статус: Ожидание обработки"));
        assert!(msg.contains("<code>100</code>"));
    }

    #[test]
    fn status_update_replaces_line_and_log_block() {
        let ts = Utc.with_ymd_and_hms(2026, 5, 5, 9, 0, 0).unwrap();
        let original = staff_order_message(OrderId(7), UserId(100), &info(), ts);
        let actor = StaffActor {
            id: UserId(1),
            name: "Admin".into(),
            username: Some("boss".into()),
        };

        let first = apply_status_update(
            &original,
            OrderStatus::Accepted,
            &staff_log_line(OrderId(7), OrderStatus::Accepted, &actor),
        );
        assert!(first.contains("✨ Статус: Принят"));
        assert!(!first.contains("Ожидание обработки"));
        assert!(first.contains("<i>"));

        let second = apply_status_update(
            &first,
            OrderStatus::Completed,
            &staff_log_line(OrderId(7), OrderStatus::Completed, &actor),
        );
        assert!(second.contains("✨ Статус: Выполнен"));
        assert_eq!(second.matches("<i>").count(), 1);
    }

    #[test]
    fn html_escaping_covers_angle_brackets() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
