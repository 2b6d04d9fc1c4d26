use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::ModelError, Document};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub service_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub client_id: Uuid,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Review {
    const COLLECTION: &'static str = "reviews";

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
        if !(1..=5).contains(&self.rating) {
            return Err(ModelError::validation("rating must be between 1 and 5"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub client_id: Uuid,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReviewDraft {
    pub fn into_review(self, service_id: Uuid, now: DateTime<Utc>) -> Result<Review, ModelError> {
        let mut review = Review {
            id: Uuid::new_v4(),
            service_id,
            booking_id: self.booking_id,
            client_id: self.client_id,
            rating: self.rating,
            comment: self.comment,
            created_at: now,
            updated_at: now,
        };
        review.before_save()?;
        Ok(review)
    }
}
