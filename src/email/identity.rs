use sha1::{Digest, Sha1};

/// Stable opportunity id for a screen: the same screen id always maps to the
/// same opportunity id, across passes and processes.
pub fn opportunity_id(screen_id: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(screen_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("opp-{}", &digest[..12])
}
