use url::Url;

use crate::ValidationError;

const WATCH_HOSTS: [&str; 2] = ["youtube.com", "www.youtube.com"];
const SHORT_LINK_HOST: &str = "youtu.be";

/// Where the target video URL comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource<'a> {
    /// URL of the active tab, if the host could report one.
    ActiveTab(Option<&'a str>),
    /// Free text typed by the user.
    Manual(&'a str),
}

/// Resolves and validates the video URL to submit. Pure.
pub fn resolve(source: UrlSource<'_>) -> Result<String, ValidationError> {
    match source {
        UrlSource::ActiveTab(tab_url) => match tab_url {
            Some(url) if is_watch_page(url) => Ok(url.to_string()),
            _ => Err(ValidationError::NotAVideoPage),
        },
        UrlSource::Manual(input) => {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                Err(ValidationError::EmptyInput)
            } else if is_video_url(trimmed) {
                Ok(trimmed.to_string())
            } else {
                Err(ValidationError::InvalidUrl)
            }
        }
    }
}

/// Accepts watch pages on any `youtube.com` host, including mobile subdomains.
pub fn is_watch_page(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let youtube_host = host == "youtube.com" || host.ends_with(".youtube.com");
    youtube_host && url.path().starts_with("/watch")
}

/// Shapes accepted for manual input: a root-domain watch URL or a short link.
pub fn is_video_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host_str() {
        Some(SHORT_LINK_HOST) => true,
        Some(host) if WATCH_HOSTS.contains(&host) => url.path().contains("/watch"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_mode_accepts_watch_pages() {
        let url = "https://m.youtube.com/watch?v=abc123";
        assert_eq!(resolve(UrlSource::ActiveTab(Some(url))), Ok(url.to_string()));
    }

    #[test]
    fn tab_mode_rejects_other_pages() {
        assert_eq!(
            resolve(UrlSource::ActiveTab(Some("https://www.youtube.com/feed/trending"))),
            Err(ValidationError::NotAVideoPage)
        );
        assert_eq!(
            resolve(UrlSource::ActiveTab(Some("https://example.com/watch?v=1"))),
            Err(ValidationError::NotAVideoPage)
        );
        assert_eq!(
            resolve(UrlSource::ActiveTab(None)),
            Err(ValidationError::NotAVideoPage)
        );
    }

    #[test]
    fn manual_mode_trims_and_accepts_short_links() {
        assert_eq!(
            resolve(UrlSource::Manual("  https://youtu.be/abc123 \n")),
            Ok("https://youtu.be/abc123".to_string())
        );
        assert_eq!(
            resolve(UrlSource::Manual("https://youtube.com/watch?v=x")),
            Ok("https://youtube.com/watch?v=x".to_string())
        );
    }

    #[test]
    fn manual_mode_errors() {
        assert_eq!(
            resolve(UrlSource::Manual("   ")),
            Err(ValidationError::EmptyInput)
        );
        assert_eq!(
            resolve(UrlSource::Manual("not a url")),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(
            resolve(UrlSource::Manual("https://m.youtube.com/watch?v=x")),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(
            resolve(UrlSource::Manual("https://www.youtube.com/channel/x")),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(
            resolve(UrlSource::Manual("ftp://youtu.be/abc")),
            Err(ValidationError::InvalidUrl)
        );
    }
}
