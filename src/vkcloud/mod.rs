pub mod client;
pub mod types;

/// TTL, in seconds, of every challenge record created.
pub const CHALLENGE_TTL: u32 = 60;

/// Header carrying the bearer token on DNS API calls.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Zone names compare equal once a single trailing '.' is dropped from each.
pub fn zone_names_match(provider_zone: &str, resolved_zone: &str) -> bool {
    strip_root(provider_zone) == strip_root(resolved_zone)
}

fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
