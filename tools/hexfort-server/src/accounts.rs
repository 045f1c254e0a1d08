//! In-memory account store — signup, login, preferences.
//!
//! Credential persistence is out of scope; accounts live for the process
//! lifetime. Player uids start high so they never collide with the
//! reserved AI uid.

use std::collections::BTreeMap;

use hexfort_types::config::GameConfig;
use hexfort_types::Uid;

/// First uid handed to a player account.
const FIRST_PLAYER_UID: Uid = 1000;

#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    password: String,
    pub uid: Uid,
    pub empire_name: String,
    pub preferences: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct AccountStore {
    by_username: BTreeMap<String, Account>,
    next_uid: Uid,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            by_username: BTreeMap::new(),
            next_uid: FIRST_PLAYER_UID,
        }
    }

    /// Create an account. Returns the new uid or a reason string suitable
    /// for the signup response.
    pub fn signup(
        &mut self,
        config: &GameConfig,
        username: &str,
        password: &str,
        empire_name: &str,
    ) -> Result<Uid, String> {
        if username.len() < config.min_username_length
            || username.len() > config.max_username_length
        {
            return Err(format!(
                "Username must be {}-{} characters",
                config.min_username_length, config.max_username_length
            ));
        }
        if password.len() < config.min_password_length {
            return Err(format!(
                "Password must be at least {} characters",
                config.min_password_length
            ));
        }
        if self.by_username.contains_key(username) {
            return Err("Username already taken".to_string());
        }

        let uid = self.next_uid;
        self.next_uid += 1;
        let empire_name = if empire_name.is_empty() {
            format!("{username}'s Empire")
        } else {
            empire_name.to_string()
        };
        self.by_username.insert(
            username.to_string(),
            Account {
                username: username.to_string(),
                password: password.to_string(),
                uid,
                empire_name,
                preferences: BTreeMap::new(),
            },
        );
        Ok(uid)
    }

    /// Check credentials. Returns the uid or a reason string.
    pub fn login(&self, username: &str, password: &str) -> Result<Uid, String> {
        match self.by_username.get(username) {
            Some(account) if account.password == password => Ok(account.uid),
            _ => Err("Unknown username or wrong password".to_string()),
        }
    }

    pub fn by_uid(&self, uid: Uid) -> Option<&Account> {
        self.by_username.values().find(|a| a.uid == uid)
    }

    pub fn by_uid_mut(&mut self, uid: Uid) -> Option<&mut Account> {
        self.by_username.values_mut().find(|a| a.uid == uid)
    }
}
