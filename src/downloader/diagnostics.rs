// Backend failure diagnostics
//
// Classifies backend error messages by substring. A matched marker means the
// failure depends on the (client, auth, format) combination and another
// attempt may succeed; anything else (malformed URL, removed video, missing
// tool) aborts the whole search.


/// Known failure markers that make an attempt retryable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMarker {
    /// Requested format selector matched nothing
    FormatUnavailable,

    /// Only storyboard images were offered for this client
    ImageOnlyStream,

    /// Anti-bot or signature challenge could not be solved
    AntiBotChallenge,

    /// DRM-protected formats for this client
    DrmProtected,

    /// Extractor returned an empty format list
    NoFormatsFound,

    /// Stream request answered with HTTP 403
    Http403Forbidden,

    /// Browser cookie store could not be read or was rejected
    CookieFailure,
}

impl FailureMarker {
    /// Markers in classification order
    pub const ALL: [FailureMarker; 7] = [
        Self::FormatUnavailable,
        Self::ImageOnlyStream,
        Self::AntiBotChallenge,
        Self::DrmProtected,
        Self::NoFormatsFound,
        Self::Http403Forbidden,
        Self::CookieFailure,
    ];

    /// Lowercase substrings that identify this marker
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Self::FormatUnavailable => &["requested format is not available", "format is not available"],
            Self::ImageOnlyStream => &["only images are available"],
            Self::AntiBotChallenge => &[
                "confirm you're not a bot",
                "confirm you\u{2019}re not a bot",
                "challenge solving failed",
                "n challenge",
                "signature extraction failed",
            ],
            Self::DrmProtected => &["drm protected", "drm-protected", "widevine"],
            Self::NoFormatsFound => &["no video formats found", "no formats found"],
            Self::Http403Forbidden => &["http error 403", "403: forbidden", "403 forbidden"],
            Self::CookieFailure => &["cookie"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FormatUnavailable => "requested format not available",
            Self::ImageOnlyStream => "only image streams available",
            Self::AntiBotChallenge => "anti-bot challenge failed",
            Self::DrmProtected => "DRM-protected formats",
            Self::NoFormatsFound => "no formats found",
            Self::Http403Forbidden => "HTTP 403 Forbidden",
            Self::CookieFailure => "cookie import failed",
        }
    }
}

/// First retryable marker found in a backend error message
pub fn classify_failure(message: &str) -> Option<FailureMarker> {
    let lower = message.to_lowercase();
    FailureMarker::ALL
        .into_iter()
        .find(|marker| marker.patterns().iter().any(|p| lower.contains(p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unavailable_detection() {
        let error = "ERROR: [youtube] abc: Requested format is not available. Use --list-formats";
        assert_eq!(classify_failure(error), Some(FailureMarker::FormatUnavailable));
    }

    #[test]
    fn test_image_only_detection() {
        let error = "WARNING: Only images are available for download. use --list-formats to see them";
        assert_eq!(classify_failure(error), Some(FailureMarker::ImageOnlyStream));
    }

    #[test]
    fn test_bot_challenge_detection() {
        let error = "ERROR: [youtube] abc: Sign in to confirm you\u{2019}re not a bot";
        assert_eq!(classify_failure(error), Some(FailureMarker::AntiBotChallenge));
    }

    #[test]
    fn test_403_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 403: Forbidden";
        assert_eq!(classify_failure(error), Some(FailureMarker::Http403Forbidden));
    }

    #[test]
    fn test_drm_detection() {
        assert_eq!(
            classify_failure("ERROR: This video is DRM protected"),
            Some(FailureMarker::DrmProtected)
        );
    }

    #[test]
    fn test_no_formats_detection() {
        assert_eq!(
            classify_failure("ERROR: No video formats found!"),
            Some(FailureMarker::NoFormatsFound)
        );
    }

    #[test]
    fn test_cookie_detection() {
        let error = "ERROR: Could not copy Chrome cookie database. See issue #7271";
        assert_eq!(classify_failure(error), Some(FailureMarker::CookieFailure));
    }

    #[test]
    fn test_unknown_errors_are_fatal() {
        assert_eq!(classify_failure("ERROR: Unsupported URL: https://example.com/"), None);
        assert_eq!(classify_failure("ERROR: [youtube] abc: Video unavailable"), None);
        assert_eq!(classify_failure("ERROR: Interrupted by user"), None);
        assert_eq!(classify_failure(""), None);
    }
}
