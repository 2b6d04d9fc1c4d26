use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::ModelError, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Client,
    Provider,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Provider => "provider",
            UserType::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Suspended,
}

impl ProviderStatus {
    pub const ALL: [ProviderStatus; 5] = [
        ProviderStatus::Pending,
        ProviderStatus::UnderReview,
        ProviderStatus::Approved,
        ProviderStatus::Rejected,
        ProviderStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Pending => "pending",
            ProviderStatus::UnderReview => "under_review",
            ProviderStatus::Approved => "approved",
            ProviderStatus::Rejected => "rejected",
            ProviderStatus::Suspended => "suspended",
        }
    }

    pub fn can_transition_to(&self, next: ProviderStatus) -> bool {
        use ProviderStatus::*;
        matches!(
            (self, next),
            (Pending, UnderReview)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Suspended)
                | (Suspended, Approved)
                | (Rejected, UnderReview)
        )
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        ProviderStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == norm)
            .ok_or_else(|| ModelError::validation(format!("invalid provider status '{s}'")))
    }
}

/// A service a provider lists on their profile or during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferedService {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub services: Vec<OfferedService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_details: Option<PayoutDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingData {
    #[serde(default)]
    pub services: Vec<OfferedService>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<ProviderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_profile: Option<ProviderProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_data: Option<OnboardingData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_provider(&self) -> bool {
        self.user_type == UserType::Provider
    }

    pub fn is_approved_provider(&self) -> bool {
        self.is_provider() && self.provider_status == Some(ProviderStatus::Approved)
    }

    /// Move a provider to `next`, returning the previous status.
    pub fn transition_provider_status(&mut self, next: ProviderStatus) -> Result<ProviderStatus, ModelError> {
        if !self.is_provider() {
            return Err(ModelError::validation(format!("user {} is not a provider", self.id)));
        }
        let current = self.provider_status.unwrap_or(ProviderStatus::Pending);
        if !current.can_transition_to(next) {
            return Err(ModelError::transition(current, next));
        }
        self.provider_status = Some(next);
        Ok(current)
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn before_save(&mut self) -> Result<(), ModelError> {
        if !self.email.contains('@') {
            return Err(ModelError::validation("invalid email"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::validation("name required"));
        }
        match self.user_type {
            UserType::Provider => {
                self.provider_status.get_or_insert(ProviderStatus::Pending);
            }
            _ => {
                if self.provider_status.is_some() {
                    return Err(ModelError::validation("provider_status is only valid for providers"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub user_type: UserType,
    #[serde(default)]
    pub provider_profile: Option<ProviderProfile>,
    #[serde(default)]
    pub onboarding_data: Option<OnboardingData>,
}

impl UserDraft {
    pub fn into_user(self, now: DateTime<Utc>) -> Result<User, ModelError> {
        if self.user_type == UserType::Admin {
            return Err(ModelError::validation("admin accounts cannot self-register"));
        }
        let provider = self.user_type == UserType::Provider;
        let mut user = User {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone,
            user_type: self.user_type,
            provider_status: provider.then_some(ProviderStatus::Pending),
            provider_profile: if provider { self.provider_profile } else { None },
            onboarding_data: if provider { self.onboarding_data } else { None },
            created_at: now,
            updated_at: now,
        };
        user.before_save()?;
        Ok(user)
    }
}
