use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Inquiry, Suggestion};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInquiryRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSuggestionRequest {
    pub name: String,
    pub contact: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplyInquiryRequest {
    pub reply: String,
}

/// Direct admin-to-customer message, delivered through the notification
/// channel.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DirectMessageRequest {
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InquiryList {
    pub items: Vec<Inquiry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionList {
    pub items: Vec<Suggestion>,
}
