pub mod draft;
pub mod email_model;
pub mod identity;
