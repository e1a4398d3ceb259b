use email_detection::email::email_model::EmailCategory;
use email_detection::screen::classifier::{ACTION_VERB_CONFIDENCE, classify_screen};

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Name patterns
// ============================================================================

#[test]
fn signup_names_are_welcome_emails() {
    for name in ["Sign Up", "signup", "Register", "Create Account", "Welcome", "Onboarding"] {
        let m = classify_screen(name, &[]).expect(name);
        assert_eq!(m.category, EmailCategory::WelcomeEmail, "{}", name);
        assert_eq!(m.confidence, 0.9, "{}", name);
    }
}

#[test]
fn scenario_names_get_fixed_confidences() {
    let signup = classify_screen("Sign Up", &[]).unwrap();
    let checkout = classify_screen("Checkout", &[]).unwrap();
    let reset = classify_screen("Reset Password", &[]).unwrap();

    assert_eq!(signup.category, EmailCategory::WelcomeEmail);
    assert_eq!(checkout.category, EmailCategory::OrderConfirmation);
    assert_eq!(reset.category, EmailCategory::PasswordReset);

    assert_eq!(signup.confidence, 0.9);
    assert_eq!(checkout.confidence, 0.95);
    assert_eq!(reset.confidence, 0.92);
}

#[test]
fn verification_names_match() {
    let m = classify_screen("Verify Email", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::EmailVerification);
    assert_eq!(m.confidence, 0.88);
}

#[test]
fn name_matching_two_groups_resolves_to_earlier_group() {
    // checkout is tested before verification
    let m = classify_screen("Checkout - Verify Card", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::OrderConfirmation);

    // signup is tested before verification
    let m = classify_screen("Sign Up Verification", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::WelcomeEmail);
}

#[test]
fn separators_and_case_are_normalized() {
    let m = classify_screen("  SIGN_UP / step 1 ", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::WelcomeEmail);
}

#[test]
fn keywords_do_not_match_inside_other_words() {
    assert!(classify_screen("Border Styles", &[]).is_none());
    assert!(classify_screen("Deactivate Account", &[]).is_none());
    assert!(classify_screen("Recorder", &[]).is_none());
}

#[test]
fn keyword_may_prefix_the_last_word() {
    let m = classify_screen("Past Orders", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::OrderConfirmation);

    let m = classify_screen("Signups", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::WelcomeEmail);
}

#[test]
fn phrases_match_across_separators() {
    let m = classify_screen("Forgot-Password", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::PasswordReset);

    let m = classify_screen("sign-up", &[]).unwrap();
    assert_eq!(m.category, EmailCategory::WelcomeEmail);
}

#[test]
fn name_match_carries_context() {
    let m = classify_screen("Checkout", &[]).unwrap();
    assert_eq!(m.context.user_action.as_deref(), Some("order_placed"));
    assert!(m.context.detected_variables.contains(&"order_number".to_string()));
    assert!(m.context.product_type.is_none());
}

// ============================================================================
// Interactive label fallback
// ============================================================================

#[test]
fn action_verbs_give_generic_classification() {
    let m = classify_screen("Contact", &labels(&["Cancel", "Send message"])).unwrap();
    assert_eq!(m.category, EmailCategory::GenericTransactional);
    assert_eq!(m.confidence, ACTION_VERB_CONFIDENCE);
    assert_eq!(m.context.user_action.as_deref(), Some("send_action"));
}

#[test]
fn action_verbs_match_whole_words() {
    assert!(classify_screen("Profile", &labels(&["Resend code"])).is_none());
}

#[test]
fn name_pattern_beats_action_verbs() {
    let m = classify_screen("Register", &labels(&["Submit"])).unwrap();
    assert_eq!(m.category, EmailCategory::WelcomeEmail);
}

#[test]
fn unmatched_screen_returns_none() {
    assert!(classify_screen("Home", &labels(&["Learn more"])).is_none());
    assert!(classify_screen("", &[]).is_none());
}

#[test]
fn classification_is_deterministic() {
    let a = classify_screen("Forgot Password", &labels(&["Send link"]));
    let b = classify_screen("Forgot Password", &labels(&["Send link"]));
    assert_eq!(a, b);
}
