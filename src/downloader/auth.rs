// Client and cookie-browser enumeration
//
// Cookie fallback cascading only happens when the caller did not pick a
// browser: an explicit choice is tried alone.

use tracing::debug;

use super::errors::ConfigError;
use super::models::ClientCandidate;

/// Browser tried first when nothing is configured
pub const PRIMARY_COOKIE_BROWSER: &str = "chrome";

/// Appended after the primary, skipping ones already listed
pub const FALLBACK_COOKIE_BROWSERS: [&str; 3] = ["chrome", "safari", "firefox"];

const DISABLED_SENTINELS: [&str; 3] = ["none", "off", "false"];

/// Ordered client candidates; `[auto]` when nothing was supplied
pub fn clients(explicit: Option<&[String]>) -> Result<Vec<ClientCandidate>, ConfigError> {
    let Some(raw) = explicit else {
        return Ok(vec![ClientCandidate::auto()]);
    };

    let mut names: Vec<String> = Vec::new();
    for name in raw.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        return Err(ConfigError::EmptyClientList);
    }
    debug!(clients = ?names, "Using explicit backend clients");
    Ok(names.into_iter().map(ClientCandidate::named).collect())
}

/// Ordered cookie browsers to try after the unauthenticated attempts.
///
/// `explicit` is the caller's choice; `env_default` is the captured
/// `YT_COOKIES_FROM_BROWSER` value. Either may be a disabled sentinel.
pub fn cookie_browsers(explicit: Option<&str>, env_default: Option<&str>) -> Vec<String> {
    if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
        if is_disabled(name) {
            return Vec::new();
        }
        return vec![name.to_string()];
    }

    let primary = match env_default.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) if is_disabled(name) => return Vec::new(),
        Some(name) => name.to_string(),
        None => PRIMARY_COOKIE_BROWSER.to_string(),
    };

    let mut browsers = vec![primary];
    for fallback in FALLBACK_COOKIE_BROWSERS {
        if !browsers.iter().any(|b| b.eq_ignore_ascii_case(fallback)) {
            browsers.push(fallback.to_string());
        }
    }
    browsers
}

fn is_disabled(name: &str) -> bool {
    DISABLED_SENTINELS
        .iter()
        .any(|s| name.eq_ignore_ascii_case(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_clients_use_auto_mode() {
        assert_eq!(clients(None).unwrap(), vec![ClientCandidate::auto()]);
    }

    #[test]
    fn test_explicit_clients_are_normalized() {
        let raw = strings(&[" web ", "", "ios", "web"]);
        assert_eq!(
            clients(Some(&raw)).unwrap(),
            vec![ClientCandidate::named("web"), ClientCandidate::named("ios")]
        );
    }

    #[test]
    fn test_blank_client_list_is_rejected() {
        let raw = strings(&[" ", ""]);
        assert_eq!(clients(Some(&raw)), Err(ConfigError::EmptyClientList));
    }

    #[test]
    fn test_default_cookie_browser_has_fallbacks() {
        assert_eq!(
            cookie_browsers(None, None),
            strings(&["chrome", "safari", "firefox"])
        );
    }

    #[test]
    fn test_env_default_leads_the_cascade() {
        assert_eq!(
            cookie_browsers(None, Some("firefox")),
            strings(&["firefox", "chrome", "safari"])
        );
    }

    #[test]
    fn test_explicit_cookie_browser_disables_fallbacks() {
        assert_eq!(
            cookie_browsers(Some("safari"), Some("firefox")),
            strings(&["safari"])
        );
    }

    #[test]
    fn test_disabled_sentinels() {
        assert!(cookie_browsers(Some("NONE"), None).is_empty());
        assert!(cookie_browsers(Some("off"), None).is_empty());
        assert!(cookie_browsers(None, Some("False")).is_empty());
    }
}
