use serde::Serialize;

use crate::email::email_model::{EmailCategory, EmailOpportunity};

/// Plain-text email handed to the document-mutation service. Variables stay
/// as `{{name}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDraft {
    pub opportunity_id: String,
    pub category: EmailCategory,
    pub subject: String,
    pub preheader: String,
    pub body: String,
}

fn template(category: EmailCategory) -> (&'static str, &'static str, &'static str) {
    match category {
        EmailCategory::WelcomeEmail => (
            "Welcome to {{company_name}}!",
            "Your account is ready.",
            "Thanks for signing up. Your account is ready to go.",
        ),
        EmailCategory::OrderConfirmation => (
            "Order {{order_number}} confirmed",
            "We've received your order.",
            "Thanks for your order. We'll let you know as soon as it ships.",
        ),
        EmailCategory::ShippingNotification => (
            "Your order is on its way",
            "Track your package.",
            "Good news: your order has shipped.",
        ),
        EmailCategory::PasswordReset => (
            "Reset your password",
            "This link expires soon.",
            "We received a request to reset your password. Use the link below to choose a new one. If you didn't ask for this, you can ignore this email.",
        ),
        EmailCategory::EmailVerification => (
            "Verify your email address",
            "One quick step to finish setting up.",
            "Please confirm this is your email address by following the link below.",
        ),
        EmailCategory::PaymentFailed => (
            "Your payment didn't go through",
            "Update your payment details.",
            "We couldn't process your latest payment. Please update your payment method to avoid interruption.",
        ),
        EmailCategory::SubscriptionRenewal => (
            "Your subscription renews soon",
            "No action needed.",
            "Your subscription will renew automatically. You can review your plan at any time.",
        ),
        EmailCategory::AccountDeleted => (
            "Your account has been deleted",
            "We're sorry to see you go.",
            "Your account and its data have been deleted as requested.",
        ),
        EmailCategory::Invoice => (
            "Your invoice from {{company_name}}",
            "Invoice attached.",
            "Here is your latest invoice. Thank you for your business.",
        ),
        EmailCategory::AppointmentConfirmation => (
            "Your appointment is confirmed",
            "See you soon.",
            "Your appointment is booked. Add it to your calendar so you don't miss it.",
        ),
        EmailCategory::FeedbackRequest => (
            "How did we do?",
            "Tell us in one minute.",
            "We'd love to hear about your experience. Your feedback helps us improve.",
        ),
        EmailCategory::AbandonedCart => (
            "You left something behind",
            "Your cart is waiting.",
            "Items are still waiting in your cart. Complete your purchase before they sell out.",
        ),
        EmailCategory::GenericTransactional => (
            "Update from {{company_name}}",
            "Details inside.",
            "Here is an update about your recent activity.",
        ),
    }
}

/// Draft the email for one opportunity.
pub fn draft_for(opportunity: &EmailOpportunity) -> EmailDraft {
    let (subject, preheader, intro) = template(opportunity.category);

    let mut body = String::from("Hi {{user_name}},\n\n");
    body.push_str(intro);
    body.push('\n');

    let details: Vec<&String> = opportunity
        .context
        .detected_variables
        .iter()
        .filter(|v| v.as_str() != "user_name")
        .collect();
    if !details.is_empty() {
        body.push_str("\nDetails:\n");
        for var in details {
            body.push_str(&format!("- {}: {{{{{}}}}}\n", humanize(var), var));
        }
    }

    body.push_str("\nThanks,\nThe {{company_name}} team\n");

    EmailDraft {
        opportunity_id: opportunity.id.clone(),
        category: opportunity.category,
        subject: subject.to_string(),
        preheader: preheader.to_string(),
        body,
    }
}

pub fn draft_all(opportunities: &[EmailOpportunity]) -> Vec<EmailDraft> {
    opportunities.iter().map(draft_for).collect()
}

/// `order_number` → `Order number`
fn humanize(var: &str) -> String {
    let spaced = var.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
