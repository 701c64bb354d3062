//! Static RU/UZ localization tables.
//!
//! Consulted, never mutated. Message templates that need interpolation live in
//! `format`; this module only owns the raw strings, button labels, status
//! labels and date rendering.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::domain::{Lang, OrderStatus};

/// Language-selection button labels (shown before a language is known).
pub const LANG_BUTTON_RU: &str = "🇷🇺 Русский";
pub const LANG_BUTTON_UZ: &str = "🇺🇿 Ўзбек";

#[derive(Clone, Copy, Debug)]
pub struct Texts {
    pub choose_language: &'static str,
    pub send_contact: &'static str,
    pub prompt_contact: &'static str,
    pub contact_saved: &'static str,
    pub please_full_name: &'static str,
    pub send_location: &'static str,
    pub address_prompt: &'static str,
    pub additional_prompt: &'static str,
    pub order_summary_title: &'static str,
    pub order_confirmed: &'static str,
    pub order_cancelled: &'static str,
    pub my_orders_title: &'static str,
    pub no_orders: &'static str,
    pub access_denied: &'static str,
    pub choose_admin_action: &'static str,
    pub clear_clients_confirm: &'static str,
    pub clear_orders_confirm: &'static str,
    pub db_clients_cleared: &'static str,
    pub db_orders_cleared: &'static str,
    pub action_cancelled: &'static str,
    pub invalid_input: &'static str,
    pub back_to_main: &'static str,
    pub process_cancelled: &'static str,
    pub error_processing: &'static str,
    pub location_not_specified: &'static str,
    pub location_attached: &'static str,
    pub by_photo: &'static str,
    pub not_specified: &'static str,
    pub positive_number_required: &'static str,
    pub confirm_ack: &'static str,
    pub cancel_ack: &'static str,
    pub units: &'static str,
    pub currency: &'static str,
}

pub const RU: Texts = Texts {
    choose_language: "Выберите язык:",
    send_contact: "Для начала, пожалуйста, отправьте ваш номер телефона.",
    prompt_contact: "Пожалуйста, нажмите кнопку '📞 Отправить контакт' для отправки вашего номера.",
    contact_saved: "✅ Контакт сохранён. Теперь введите ваше полное имя (имя и фамилия) или отправьте фото паспорта.",
    please_full_name: "Пожалуйста, введите полное имя и фамилию текстом (например, 'Иван Иванов'), либо отправьте фото паспорта.",
    send_location: "Отправьте геолокацию или введите адрес вручную.",
    address_prompt: "Укажите полный адрес доставки: район, улицу, номер дома и квартиры (если есть).",
    additional_prompt: "Укажите дополнительный контактный номер (например, номер соседей или родственников) или нажмите 'Пропустить'.",
    order_summary_title: "🛍️ Подтвердите ваш заказ:",
    order_confirmed: "✅ Ваш заказ принят! Мы скоро свяжемся с вами для уточнения деталей.",
    order_cancelled: "❌ Заказ отменён. Нажмите /start или '🔄 Начать сначала' для нового заказа.",
    my_orders_title: "📦 Мои заказы:",
    no_orders: "У вас пока нет заказов.",
    access_denied: "🚫 У вас нет доступа к этой команде.",
    choose_admin_action: "🔧 Выберите действие с базой данных:",
    clear_clients_confirm: "⚠️ Вы уверены, что хотите УДАЛИТЬ ВСЕХ клиентов И ИХ ЗАКАЗЫ? Это необратимо.",
    clear_orders_confirm: "⚠️ Вы уверены, что хотите УДАЛИТЬ ВСЕ заказы? Это необратимо.",
    db_clients_cleared: "✅ База данных клиентов (и заказов) очищена.",
    db_orders_cleared: "✅ База данных заказов очищена.",
    action_cancelled: "Действие отменено.",
    invalid_input: "Неверный ввод. Пожалуйста, попробуйте еще раз или отмените процесс.",
    back_to_main: "Возврат в главное меню.",
    process_cancelled: "Процесс отменен.",
    error_processing: "Произошла ошибка при обработке вашего запроса. Пожалуйста, попробуйте снова или свяжитесь с поддержкой.",
    location_not_specified: "Локация не указана",
    location_attached: "Локация",
    by_photo: "по фото",
    not_specified: "Не указано",
    positive_number_required: "Введите положительное число.",
    confirm_ack: "✅ Подтверждено!",
    cancel_ack: "❌ Отменено",
    units: "шт",
    currency: "сум",
};

pub const UZ: Texts = Texts {
    choose_language: "Tilni tanlang:",
    send_contact: "Boshlash uchun, iltimos, telefon raqamingizni yuboring.",
    prompt_contact: "Iltimos, raqamingizni yuborish uchun '📞 Kontaktni yuborish' tugmasini bosing.",
    contact_saved: "✅ Kontakt saqlandi. Endi to'liq ism va familiyangizni kiriting yoki pasport rasmini yuboring.",
    please_full_name: "Iltimos, to'liq ism va familiyangizni matn shaklida kiriting (masalan, 'Ali Aliyev'), yoki pasport rasmini yuboring.",
    send_location: "Geolokatsiyani yuboring yoki manzilni qo'lda kiriting.",
    address_prompt: "To'liq yetkazib berish manzilini kiriting: tuman, ko'cha, uy va kvartira raqami (agar mavjud bo'lsa).",
    additional_prompt: "Qo'shimcha aloqa raqamini kiriting (masalan, qo'shnilar yoki qarindoshlaringiz raqami) yoki 'O'tkazib yuborish' tugmasini bosing.",
    order_summary_title: "🛍️ Buyurtmangizni tasdiqlang:",
    order_confirmed: "✅ Buyurtmangiz qabul qilindi! Tafsilotlarni aniqlash uchun tez orada siz bilan bog'lanamiz.",
    order_cancelled: "❌ Buyurtma bekor qilindi. Yangi buyurtma berish uchun /start yoki '🔄 Yangi boshlash' tugmasini bosing.",
    my_orders_title: "📦 Mening buyurtmalarim:",
    no_orders: "Sizda hali buyurtmalar yo'q.",
    access_denied: "🚫 Bu buyruqqa ruxsat yo'q.",
    choose_admin_action: "🔧 Ma'lumotlar bazasi bilan amalni tanlang:",
    clear_clients_confirm: "⚠️ BARCHA mijozlarni VA ULARNING BUYURTMALARINI O'CHIRIB yubormoqchimisiz? Bu qaytarilmaydigan amal.",
    clear_orders_confirm: "⚠️ BARCHA buyurtmalarni O'CHIRIB yubormoqchimisiz? Bu qaytarilmaydigan amal.",
    db_clients_cleared: "✅ Mijozlar (va buyurtmalar) ma'lumotlar bazasi tozalandi.",
    db_orders_cleared: "✅ Buyurtmalar ma'lumotlar bazasi tozalandi.",
    action_cancelled: "Amal bekor qilindi.",
    invalid_input: "Noto'g'ri kiritish. Iltimos, qaytadan urinib ko'ring yoki jarayonni bekor qiling.",
    back_to_main: "Bosh menyuga qaytish.",
    process_cancelled: "Jarayon bekor qilindi.",
    error_processing: "So'rovingizni qayta ishlashda xatolik yuz berdi. Iltimos, qaytadan urinib ko'ring yoki qo'llab-quvvatlash xizmati bilan bog'laning.",
    location_not_specified: "Joylashuv belgilanmagan",
    location_attached: "Joylashuv",
    by_photo: "fotosurat orqali",
    not_specified: "Belgilangan emas",
    positive_number_required: "Iltimos, musbat raqam kiriting.",
    confirm_ack: "✅ Tasdiqlandi!",
    cancel_ack: "❌ Bekor qilindi",
    units: "dona",
    currency: "so'm",
};

pub fn texts(lang: Lang) -> &'static Texts {
    match lang {
        Lang::Ru => &RU,
        Lang::Uz => &UZ,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Buttons {
    pub send_contact: &'static str,
    pub cancel: &'static str,
    pub send_location: &'static str,
    pub enter_address: &'static str,
    pub start_over: &'static str,
    pub my_orders: &'static str,
    pub manage_db: &'static str,
    pub skip: &'static str,
    pub back: &'static str,
    pub change_lang: &'static str,
    pub clear_clients: &'static str,
    pub clear_orders: &'static str,
    pub confirm_yes: &'static str,
    pub confirm_no: &'static str,
    pub status_accept: &'static str,
    pub status_reject: &'static str,
    pub status_complete: &'static str,
}

pub const BTN_RU: Buttons = Buttons {
    send_contact: "📞 Отправить контакт",
    cancel: "❌ Отменить",
    send_location: "📍 Отправить локацию",
    enter_address: "🏠 Ввести адрес вручную",
    start_over: "🔄 Начать сначала",
    my_orders: "📦 Мои заказы",
    manage_db: "🔧 Управление базой данных",
    skip: "Пропустить",
    back: "⬅️ Назад",
    change_lang: "🔄 Сменить язык",
    clear_clients: "🗑️ Очистить клиентов",
    clear_orders: "🗑️ Очистить заказы",
    confirm_yes: "✅ Да",
    confirm_no: "❌ Нет",
    status_accept: "✅ Принять",
    status_reject: "❌ Отменить",
    status_complete: "📦 Выполнить",
};

pub const BTN_UZ: Buttons = Buttons {
    send_contact: "📞 Kontaktni yuborish",
    cancel: "❌ Bekor qilish",
    send_location: "📍 Joylashuvni yuboring",
    enter_address: "🏠 Manzilni qo'lda kiritish",
    start_over: "🔄 Yangi boshlash",
    my_orders: "📦 Buyurtmalarim",
    manage_db: "🔧 Bazani boshqarish",
    skip: "O'tkazib yuborish",
    back: "⬅️ Orqaga",
    change_lang: "🔄 Tilni almashtirish",
    clear_clients: "🗑️ Mijozlarni tozalash",
    clear_orders: "🗑️ Buyurtmalarni tozalash",
    confirm_yes: "✅ Ha",
    confirm_no: "❌ Yo'q",
    status_accept: "✅ Qabul qilish",
    status_reject: "❌ Bekor qilish",
    status_complete: "📦 Bajarildi",
};

pub fn buttons(lang: Lang) -> &'static Buttons {
    match lang {
        Lang::Ru => &BTN_RU,
        Lang::Uz => &BTN_UZ,
    }
}

pub fn status_label(status: OrderStatus, lang: Lang) -> &'static str {
    match (lang, status) {
        (Lang::Ru, OrderStatus::Pending) => "Ожидание обработки",
        (Lang::Ru, OrderStatus::Accepted) => "Принят",
        (Lang::Ru, OrderStatus::InProgress) => "В работе",
        (Lang::Ru, OrderStatus::Completed) => "Выполнен",
        (Lang::Ru, OrderStatus::Rejected) => "Отменен",
        (Lang::Uz, OrderStatus::Pending) => "Ishlov berish kutilmoqda",
        (Lang::Uz, OrderStatus::Accepted) => "Qabul qilindi",
        (Lang::Uz, OrderStatus::InProgress) => "Jarayonda",
        (Lang::Uz, OrderStatus::Completed) => "Bajarildi",
        (Lang::Uz, OrderStatus::Rejected) => "Bekor qilindi",
    }
}

const MONTHS_RU: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня",
    "июля", "августа", "сентября", "октября", "ноября", "декабря",
];

const MONTHS_UZ: [&str; 12] = [
    "yanvar", "fevral", "mart", "aprel", "may", "iyun",
    "iyul", "avgust", "sentyabr", "oktyabr", "noyabr", "dekabr",
];

/// Render a timestamp with a localized month name ("05 мая 2026 г., 14:30").
pub fn localize_date(dt: DateTime<Utc>, lang: Lang) -> String {
    let month_idx = (dt.month0()) as usize;
    let time = format!("{:02}:{:02}", dt.hour(), dt.minute());
    match lang {
        Lang::Ru => format!(
            "{:02} {} {} г., {}",
            dt.day(),
            MONTHS_RU[month_idx],
            dt.year(),
            time
        ),
        Lang::Uz => format!(
            "{:02} {} {}, {}",
            dt.day(),
            MONTHS_UZ[month_idx],
            dt.year(),
            time
        ),
    }
}

/// Thousands separator used in price rendering (16000 -> "16,000").
pub fn format_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{out}")
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn localized_dates_use_month_names() {
        let dt = Utc.with_ymd_and_hms(2026, 5, 5, 14, 30, 0).unwrap();
        assert_eq!(localize_date(dt, Lang::Ru), "05 мая 2026 г., 14:30");
        assert_eq!(localize_date(dt, Lang::Uz), "05 may 2026, 14:30");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(16_000), "16,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn status_labels_cover_both_languages() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Rejected,
        ] {
            assert!(!status_label(status, Lang::Ru).is_empty());
            assert!(!status_label(status, Lang::Uz).is_empty());
        }
    }
}
