//! Test doubles for the injectable seams: identity directory and
//! delivery channels. No network, no database.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use courier::CourierError;
use uuid::Uuid;

use server_core::domains::auth::{
    AuthService, ConsoleChannel, DeliveryChannel, DeliveryMethod, Dispatcher, InMemoryOtpStore,
    TokenService,
};
use server_core::domains::user::{KycUpsert, NewUser, User, UserDirectory};

/// In-memory directory with the same uniqueness semantics as the
/// Postgres implementation: create converges on the existing row when
/// the phone is already taken.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Simulate an identity deleted out from under its tokens.
    pub fn remove_by_id(&self, id: Uuid) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.phone == phone)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter().find(|u| u.phone == new_user.phone) {
            return Ok(existing.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            phone: new_user.phone,
            name: new_user.name,
            name_hindi: new_user.name_hindi,
            email: None,
            user_type: new_user.user_type.unwrap_or_else(|| "individual".to_string()),
            kyc_status: "pending".to_string(),
            language_preference: "en".to_string(),
            pin_hash: None,
            aadhaar_hash: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn complete_kyc(&self, upsert: KycUpsert) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.phone == upsert.phone) {
            user.name = upsert.full_name;
            user.email = Some(upsert.email);
            if upsert.pin_hash.is_some() {
                user.pin_hash = upsert.pin_hash;
            }
            user.user_type = upsert.user_type.unwrap_or_else(|| "individual".to_string());
            user.kyc_status = "completed".to_string();
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            phone: upsert.phone,
            name: upsert.full_name,
            name_hindi: None,
            email: Some(upsert.email),
            user_type: upsert.user_type.unwrap_or_else(|| "individual".to_string()),
            kyc_status: "completed".to_string(),
            language_preference: "hi".to_string(),
            pin_hash: upsert.pin_hash,
            aadhaar_hash: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

/// Records every delivery attempt and always succeeds.
pub struct RecordingChannel {
    method: DeliveryMethod,
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingChannel {
    pub fn new(method: DeliveryMethod) -> Self {
        Self {
            method,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    fn method(&self) -> DeliveryMethod {
        self.method
    }

    async fn attempt(&self, phone: &str, message: &str, code: &str) -> Result<(), CourierError> {
        self.sent.lock().unwrap().push((
            phone.to_string(),
            message.to_string(),
            code.to_string(),
        ));
        Ok(())
    }
}

/// Always fails, standing in for a provider outage.
pub struct FailingChannel {
    method: DeliveryMethod,
}

impl FailingChannel {
    pub fn new(method: DeliveryMethod) -> Self {
        Self { method }
    }
}

#[async_trait]
impl DeliveryChannel for FailingChannel {
    fn method(&self) -> DeliveryMethod {
        self.method
    }

    async fn attempt(&self, _: &str, _: &str, _: &str) -> Result<(), CourierError> {
        Err(CourierError::Provider {
            provider: "test",
            detail: "provider unavailable".to_string(),
        })
    }
}

/// Assemble an AuthService around doubles, returning the handles the
/// tests need to poke at its state.
pub fn test_service(
    directory: Arc<InMemoryUserDirectory>,
    channels: Vec<Arc<dyn DeliveryChannel>>,
) -> (AuthService, Arc<InMemoryOtpStore>) {
    let store = Arc::new(InMemoryOtpStore::new());
    let dispatcher = Dispatcher::new(channels, Duration::from_millis(200));
    let tokens = TokenService::new("test_access_secret", "test_refresh_secret");
    let service = AuthService::new(store.clone(), dispatcher, directory, tokens, true);
    (service, store)
}

/// Default console-only service against a fresh directory.
pub fn console_service() -> (AuthService, Arc<InMemoryOtpStore>, Arc<InMemoryUserDirectory>) {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let (service, store) = test_service(directory.clone(), vec![Arc::new(ConsoleChannel)]);
    (service, store, directory)
}
