use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform user, keyed by canonical phone number.
///
/// `pin_hash` and `aadhaar_hash` are sensitive and never serialized;
/// responses go through the [`UserProfile`] projection instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub name_hindi: Option<String>,
    pub email: Option<String>,
    pub user_type: String,
    pub kyc_status: String,
    pub language_preference: String,
    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,
    #[serde(skip_serializing)]
    pub aadhaar_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_pin(&self) -> bool {
        self.pin_hash.is_some()
    }
}

/// User data safe to return in response bodies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub name_hindi: Option<String>,
    pub email: Option<String>,
    pub user_type: String,
    pub kyc_status: String,
    pub language_preference: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            phone: user.phone.clone(),
            name: user.name.clone(),
            name_hindi: user.name_hindi.clone(),
            email: user.email.clone(),
            user_type: user.user_type.clone(),
            kyc_status: user.kyc_status.clone(),
            language_preference: user.language_preference.clone(),
            created_at: user.created_at,
        }
    }
}

/// Identity created on the sign-up verification path.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone: String,
    pub name: String,
    pub name_hindi: Option<String>,
    pub user_type: Option<String>,
}

/// KYC-completion upsert from the register endpoint.
#[derive(Debug, Clone)]
pub struct KycUpsert {
    pub phone: String,
    pub full_name: String,
    pub email: String,
    /// Already hashed; plaintext PINs never reach the directory.
    pub pin_hash: Option<String>,
    pub user_type: Option<String>,
}

pub const DEFAULT_USER_TYPE: &str = "individual";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            phone: "+919999999999".to_string(),
            name: "Asha".to_string(),
            name_hindi: None,
            email: Some("asha@example.com".to_string()),
            user_type: "individual".to_string(),
            kyc_status: "pending".to_string(),
            language_preference: "en".to_string(),
            pin_hash: Some("$2b$10$secret".to_string()),
            aadhaar_hash: Some("deadbeef".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn serialized_user_never_contains_sensitive_hashes() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("pin_hash"));
        assert!(!json.contains("aadhaar"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn profile_projection_keeps_public_fields() {
        let user = sample_user();
        let profile = UserProfile::from(&user);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("+919999999999"));
        assert!(json.contains("userType"));
        assert!(!json.contains("pin"));
        assert!(!json.contains("aadhaar"));
    }
}
