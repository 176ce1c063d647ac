use log::debug;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("malformed URL '{url}': {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no handler could open '{url}': {source}")]
    NoHandler {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Hands a URL to whatever opens it.
pub trait UrlOpener: Send {
    fn open(&self, url: &str) -> Result<(), OpenError>;
}

/// Opens URLs with the user's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        let parsed = parse(url)?;

        open::that(parsed.as_str()).map_err(|source| OpenError::NoHandler {
            url: url.to_string(),
            source,
        })?;

        debug!("Opened {parsed}");
        Ok(())
    }
}

/// Validate a URL without opening it
pub fn parse(url: &str) -> Result<url::Url, OpenError> {
    url::Url::parse(url.trim()).map_err(|source| OpenError::Malformed {
        url: url.to_string(),
        source,
    })
}
