//! Canonical route-token inflection

/// Canonicalizes module/controller/action names into URL tokens
pub trait Inflector: Send + Sync {
    fn to_route_token(&self, value: &str) -> String;
}

/// Lowercase, hyphenated, ASCII alphanumerics only
///
/// `UserProfile`, `user_profile` and `User Profile!` all become
/// `user-profile`. Idempotent on its own output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTokenInflector;

impl Inflector for RouteTokenInflector {
    fn to_route_token(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 4);
        let mut prev_lower = false;

        for c in value.trim().chars() {
            if c.is_ascii_uppercase() {
                if prev_lower {
                    push_separator(&mut out);
                }
                out.push(c.to_ascii_lowercase());
                prev_lower = false;
            } else if c.is_ascii_alphanumeric() {
                out.push(c);
                prev_lower = true;
            } else if matches!(c, '-' | '_' | ' ' | '.' | '/' | '\t') {
                push_separator(&mut out);
                prev_lower = false;
            }
        }

        out.trim_end_matches('-').to_string()
    }
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('-') {
        out.push('-');
    }
}
