use serde::{Deserialize, Serialize};

use crate::screen::screen_model::ScreenContent;

// ============================================================================
// Category enum shared by every channel
// ============================================================================

/// Closed set of transactional email kinds. `GenericTransactional` is the
/// fallback member for anything unrecognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailCategory {
    WelcomeEmail,
    OrderConfirmation,
    ShippingNotification,
    PasswordReset,
    EmailVerification,
    PaymentFailed,
    SubscriptionRenewal,
    AccountDeleted,
    Invoice,
    AppointmentConfirmation,
    FeedbackRequest,
    AbandonedCart,
    GenericTransactional,
}

impl EmailCategory {
    pub const ALL: [EmailCategory; 13] = [
        EmailCategory::WelcomeEmail,
        EmailCategory::OrderConfirmation,
        EmailCategory::ShippingNotification,
        EmailCategory::PasswordReset,
        EmailCategory::EmailVerification,
        EmailCategory::PaymentFailed,
        EmailCategory::SubscriptionRenewal,
        EmailCategory::AccountDeleted,
        EmailCategory::Invoice,
        EmailCategory::AppointmentConfirmation,
        EmailCategory::FeedbackRequest,
        EmailCategory::AbandonedCart,
        EmailCategory::GenericTransactional,
    ];

    /// Wire identifier, e.g. `password_reset`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailCategory::WelcomeEmail => "welcome_email",
            EmailCategory::OrderConfirmation => "order_confirmation",
            EmailCategory::ShippingNotification => "shipping_notification",
            EmailCategory::PasswordReset => "password_reset",
            EmailCategory::EmailVerification => "email_verification",
            EmailCategory::PaymentFailed => "payment_failed",
            EmailCategory::SubscriptionRenewal => "subscription_renewal",
            EmailCategory::AccountDeleted => "account_deleted",
            EmailCategory::Invoice => "invoice",
            EmailCategory::AppointmentConfirmation => "appointment_confirmation",
            EmailCategory::FeedbackRequest => "feedback_request",
            EmailCategory::AbandonedCart => "abandoned_cart",
            EmailCategory::GenericTransactional => "generic_transactional",
        }
    }

    /// Parse a wire identifier, tolerating case, spaces and dashes.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EmailCategory::WelcomeEmail => "Welcome Email",
            EmailCategory::OrderConfirmation => "Order Confirmation",
            EmailCategory::ShippingNotification => "Shipping Notification",
            EmailCategory::PasswordReset => "Password Reset",
            EmailCategory::EmailVerification => "Email Verification",
            EmailCategory::PaymentFailed => "Payment Failed",
            EmailCategory::SubscriptionRenewal => "Subscription Renewal",
            EmailCategory::AccountDeleted => "Account Deleted",
            EmailCategory::Invoice => "Invoice",
            EmailCategory::AppointmentConfirmation => "Appointment Confirmation",
            EmailCategory::FeedbackRequest => "Feedback Request",
            EmailCategory::AbandonedCart => "Abandoned Cart",
            EmailCategory::GenericTransactional => "Transactional Email",
        }
    }

    /// Short description of the user moment that triggers this email.
    pub fn trigger_description(&self) -> &'static str {
        match self {
            EmailCategory::WelcomeEmail => "User creates an account",
            EmailCategory::OrderConfirmation => "User completes a purchase",
            EmailCategory::ShippingNotification => "Order ships to the user",
            EmailCategory::PasswordReset => "User requests a password reset",
            EmailCategory::EmailVerification => "User needs to verify their email address",
            EmailCategory::PaymentFailed => "A payment attempt fails",
            EmailCategory::SubscriptionRenewal => "Subscription is about to renew",
            EmailCategory::AccountDeleted => "User deletes their account",
            EmailCategory::Invoice => "An invoice is issued",
            EmailCategory::AppointmentConfirmation => "User books an appointment",
            EmailCategory::FeedbackRequest => "User is asked for feedback",
            EmailCategory::AbandonedCart => "User leaves items in the cart",
            EmailCategory::GenericTransactional => "User submits an action",
        }
    }
}

impl Default for EmailCategory {
    fn default() -> Self {
        EmailCategory::GenericTransactional
    }
}

impl std::fmt::Display for EmailCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Channel outputs
// ============================================================================

/// Result of one analysis channel for one screen.
///
/// `Fallback` carries the fixed stub substituted when the call or parse
/// failed. Fusion never lets a fallback override a successful source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "analysis", rename_all = "snake_case")]
pub enum ChannelResult<T> {
    Analyzed(T),
    Fallback(T),
}

impl<T> ChannelResult<T> {
    pub fn value(&self) -> &T {
        match self {
            ChannelResult::Analyzed(v) | ChannelResult::Fallback(v) => v,
        }
    }

    pub fn analyzed(&self) -> Option<&T> {
        match self {
            ChannelResult::Analyzed(v) => Some(v),
            ChannelResult::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ChannelResult::Fallback(_))
    }
}

/// Text-channel understanding of a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIAnalysis {
    pub screen_id: String,
    pub detected_purpose: String,
    pub category: EmailCategory,
    pub suggested_name: String,
    pub confidence: f32,
    pub reasoning: String,
    pub suggested_variables: Vec<String>,
}

/// Vision-channel understanding of a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAnalysis {
    pub screen_id: String,
    pub design_summary: String,
    pub user_flow_purpose: String,
    pub key_elements: Vec<String>,
    pub category: EmailCategory,
    pub suggested_name: String,
    pub email_context: String,
    pub confidence: f32,
    /// Data URI of the image that was analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// ============================================================================
// Fused record
// ============================================================================

/// Contextual data attached to an opportunity. Every field is explicit so
/// channels cannot drift apart on shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_action: Option<String>,
    pub detected_variables: Vec<String>,
}

/// Output of the heuristic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicMatch {
    pub category: EmailCategory,
    pub confidence: f32,
    pub context: OpportunityContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailOpportunity {
    pub id: String,
    pub category: EmailCategory,
    pub screen_name: String,
    pub screen_id: String,
    /// Display name resolved from the highest-precedence source.
    pub suggested_name: String,
    pub confidence: f32,
    pub context: OpportunityContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ScreenContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<HeuristicMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_analysis: Option<ChannelResult<AIAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_analysis: Option<ChannelResult<VisualAnalysis>>,
}

// ============================================================================
// Cross-screen summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub index: usize,
    pub screen_name: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedEmail {
    pub category: EmailCategory,
    pub name: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub product_type: String,
    pub narrative: String,
    pub screen_count: usize,
    pub steps: Vec<FlowStep>,
    pub suggested_emails: Vec<SuggestedEmail>,
    pub aggregate_confidence: f32,
}
