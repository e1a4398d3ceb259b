use crate::email::email_model::{EmailCategory, HeuristicMatch, OpportunityContext};

/// One keyword group of the heuristic classifier.
struct PatternGroup {
    category: EmailCategory,
    confidence: f32,
    keywords: &'static [&'static str],
    user_action: &'static str,
    variables: &'static [&'static str],
}

/// Evaluated top to bottom; the first group whose keywords match wins, even
/// when a later group would also match. Keywords match whole words, except the
/// last word of a keyword may be a prefix ("order" matches "Orders").
const NAME_GROUPS: [PatternGroup; 4] = [
    PatternGroup {
        category: EmailCategory::WelcomeEmail,
        confidence: 0.9,
        keywords: &["sign up", "signup", "sign-up", "register", "create account", "welcome", "onboarding"],
        user_action: "user_signup",
        variables: &["user_name", "user_email"],
    },
    PatternGroup {
        category: EmailCategory::OrderConfirmation,
        confidence: 0.95,
        keywords: &["checkout", "order", "purchase", "payment"],
        user_action: "order_placed",
        variables: &["order_number", "order_total", "order_items"],
    },
    PatternGroup {
        category: EmailCategory::PasswordReset,
        confidence: 0.92,
        keywords: &["reset password", "password reset", "forgot password", "forgot"],
        user_action: "password_reset_requested",
        variables: &["reset_link", "user_name"],
    },
    PatternGroup {
        category: EmailCategory::EmailVerification,
        confidence: 0.88,
        keywords: &["verify", "verification", "confirm email", "activate"],
        user_action: "email_verification_requested",
        variables: &["verification_link", "user_email"],
    },
];

const ACTION_VERBS: [&str; 3] = ["submit", "confirm", "send"];

pub const ACTION_VERB_CONFIDENCE: f32 = 0.6;

/// Classify a screen from its name, falling back to its interactive labels.
///
/// Pure and deterministic: the same input always yields the same result.
pub fn classify_screen(name: &str, interactive_labels: &[String]) -> Option<HeuristicMatch> {
    let words = tokenize(name);

    if let Some(group) = NAME_GROUPS
        .iter()
        .find(|g| g.keywords.iter().any(|k| contains_keyword(&words, k)))
    {
        return Some(HeuristicMatch {
            category: group.category,
            confidence: group.confidence,
            context: OpportunityContext {
                product_type: None,
                user_action: Some(group.user_action.to_string()),
                detected_variables: group.variables.iter().map(|v| v.to_string()).collect(),
            },
        });
    }

    let verb = interactive_labels.iter().find_map(|label| {
        let label_words = tokenize(label);
        ACTION_VERBS.iter().find(|v| contains_keyword(&label_words, v))
    })?;

    Some(HeuristicMatch {
        category: EmailCategory::GenericTransactional,
        confidence: ACTION_VERB_CONFIDENCE,
        context: OpportunityContext {
            product_type: None,
            user_action: Some(format!("{}_action", verb)),
            detected_variables: vec![],
        },
    })
}

/// Lowercase words of `text`; every non-alphanumeric character separates
/// words, so "Sign_Up", "sign-up" and "sign up" tokenize the same.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `keyword` occurs in `words` starting at a word boundary. All of its
/// words must match exactly except the last, which may be a prefix.
pub fn contains_keyword(words: &[String], keyword: &str) -> bool {
    let parts = tokenize(keyword);
    let Some((last, leading)) = parts.split_last() else {
        return false;
    };

    words.windows(parts.len()).any(|window| {
        window[..leading.len()] == *leading && window[leading.len()].starts_with(last.as_str())
    })
}
