//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use trading_onboard::config::Config;
use trading_onboard::domain::{User, VerificationToken};
use trading_onboard::errors::{AppError, AppResult};
use trading_onboard::infra::{TokenRepository, UnitOfWork, UserRepository};
use trading_onboard::services::{
    Authenticator, InvalidationSink, LifecycleManager, Mailer, ViewInvalidation,
};

pub const TEST_SECRET: &str = "integration-secret-key-minimum-32-chars";

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUsers {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn insert(&self, user: User) {
        self.rows.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        self.insert(user.clone());
        Ok(user.clone())
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(user.clone())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        match self.rows.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound),
        }
    }

    async fn list_by_approval(&self, approved: bool) -> AppResult<Vec<User>> {
        let rows = self.rows.lock().unwrap();
        let mut users: Vec<User> = rows.values().filter(|u| u.approved == approved).cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[derive(Default)]
pub struct MemoryTokens {
    rows: Mutex<Vec<VerificationToken>>,
}

impl MemoryTokens {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokens {
    async fn replace(&self, token: &VerificationToken) -> AppResult<VerificationToken> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|t| t.email != token.email);
        rows.push(token.clone());
        Ok(token.clone())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<VerificationToken>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|t| t.token == token).cloned())
    }

    async fn delete(&self, token: &VerificationToken) -> AppResult<()> {
        self.rows.lock().unwrap().retain(|t| t.id != token.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub users: Arc<MemoryUsers>,
    pub tokens: Arc<MemoryTokens>,
}

impl UnitOfWork for MemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.tokens.clone()
    }
}

/// Captures every verification email instead of queueing it.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().rev().find(|(to, _)| to == email).map(|(_, token)| token.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send_verification(&self, email: &str, token: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push((email.to_string(), token.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ViewInvalidation>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<ViewInvalidation> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl InvalidationSink for RecordingSink {
    fn emit(&self, view: ViewInvalidation) {
        self.events.lock().unwrap().push(view);
    }
}

/// Fully wired services over in-memory storage.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<Outbox>,
    pub sink: Arc<RecordingSink>,
    pub auth: Arc<Authenticator<MemoryStore>>,
    pub lifecycle: Arc<LifecycleManager<MemoryStore>>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let outbox = Arc::new(Outbox::default());
        let sink = Arc::new(RecordingSink::default());

        let auth = Arc::new(Authenticator::new(
            store.clone(),
            outbox.clone(),
            Config::with_secret(TEST_SECRET),
        ));
        let lifecycle = Arc::new(LifecycleManager::new(store.clone(), sink.clone()));

        Self {
            store,
            outbox,
            sink,
            auth,
            lifecycle,
        }
    }
}

pub fn registration_form(username: &str) -> Value {
    json!({
        "username": username,
        "firstname": "Alice",
        "lastname": "Doe",
        "phone": "+447911123456",
        "country": "GB",
        "metamask": "0xabc",
        "autotrade": format!("{}-auto", username),
        "email": format!("{}@example.com", username),
        "password": "secret1",
        "confirmPassword": "secret1"
    })
}

pub fn approval_form() -> Value {
    json!({
        "groupId": "tier-1",
        "whitelisted": true,
        "allowedTradingAmountFrom": "100",
        "allowedTradingAmountTo": "unlimited",
        "adminFee": 2,
        "userProfit": 70,
        "introducerFee": 1
    })
}
