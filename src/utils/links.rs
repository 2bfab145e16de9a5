// Link token derivation.
//
// A link token is the filesystem- and URL-safe identity of a documented
// node. Overloads share a fully-qualified name, so the token carries a short
// hash of the parameter list to stay unique and stable.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::text::despace;

static UNSAFE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

/// Derive a link token from a fully-qualified name, plus the despaced
/// parameter list for overloadable members.
pub fn link_from_name(full_name: &str, params: Option<&str>) -> String {
    let mut token = UNSAFE_RUN
        .replace_all(&full_name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();
    if token.is_empty() {
        token = "index".to_string();
    }
    if let Some(params) = params {
        let digest = md5::compute(despace(params).as_bytes());
        let hex = format!("{:x}", digest);
        token.push('-');
        token.push_str(&hex[..8]);
    }
    token
}
