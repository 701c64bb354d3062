use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

pub const DEFAULT_PRICE_PER_BOTTLE: i64 = 16_000;

/// Typed configuration for the bot.
///
/// Everything comes from the environment (with an optional `.env` file), the
/// way the original deployment expected it.
#[derive(Clone, Debug)]
pub struct Config {
    /// Telegram bot API token.
    pub bot_token: String,
    /// Staff identities allowed to change order status and manage the store.
    pub staff_chat_ids: Vec<i64>,
    /// Optional shared channel that receives every order notification.
    pub group_chat_id: Option<i64>,
    /// Unit price used for quantity -> total computation (sum per bottle).
    pub price_per_bottle: i64,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Bind address for the liveness probe.
    pub health_addr: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let staff_chat_ids = parse_csv_i64(env_str("STAFF_CHAT_IDS"));
        if staff_chat_ids.is_empty() {
            tracing::warn!("STAFF_CHAT_IDS is empty; status changes will be denied to everyone");
        }

        let group_chat_id = match env_str("GROUP_CHAT_ID") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(value = %raw, "GROUP_CHAT_ID is not a number; group notifications disabled");
                    None
                }
            },
            None => None,
        };

        let price_per_bottle = match env_str("PRICE_PER_BOTTLE") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(p) if p > 0 => p,
                _ => {
                    tracing::warn!(value = %raw, default = DEFAULT_PRICE_PER_BOTTLE,
                        "PRICE_PER_BOTTLE is invalid; using default");
                    DEFAULT_PRICE_PER_BOTTLE
                }
            },
            None => DEFAULT_PRICE_PER_BOTTLE,
        };

        let database_path =
            PathBuf::from(env_str("DATABASE_PATH").unwrap_or_else(|| "suvbot.db".to_string()));

        let health_addr = env_str("HEALTH_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        Ok(Self {
            bot_token,
            staff_chat_ids,
            group_chat_id,
            price_per_bottle,
            database_path,
            health_addr,
        })
    }

    pub fn is_staff(&self, user_id: i64) -> bool {
        self.staff_chat_ids.contains(&user_id)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_parsing_skips_garbage() {
        let ids = parse_csv_i64(Some("123, 456,, abc, -1001234".to_string()));
        assert_eq!(ids, vec![123, 456, -1001234]);
    }

    #[test]
    fn staff_check_uses_configured_set() {
        let cfg = Config {
            bot_token: "t".into(),
            staff_chat_ids: vec![10, 20],
            group_chat_id: None,
            price_per_bottle: DEFAULT_PRICE_PER_BOTTLE,
            database_path: PathBuf::from("suvbot.db"),
            health_addr: "0.0.0.0:8080".into(),
        };
        assert!(cfg.is_staff(10));
        assert!(!cfg.is_staff(30));
    }
}
