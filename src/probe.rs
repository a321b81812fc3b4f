//! HTTP probe for deployed applications
//!
//! A single GET against the project's root URL, classified down to a
//! bare status code. HTTP error responses keep their real status (a 404
//! is reported as 404); transport failures and malformed responses are
//! collapsed to 500 so the caller only ever sees a number.

/// Probe seam used by the runner
pub trait HttpProbe {
    /// Fetch `url` and classify the response. Never fails; anything
    /// that is not a well-formed HTTP response counts as 500.
    fn status(&self, url: &str) -> u16;
}

/// Blocking probe using `ureq`.
///
/// No timeout is applied; an unreachable-but-accepting server hangs the
/// probing project, matching the push wait.
pub struct UreqProbe;

impl HttpProbe for UreqProbe {
    fn status(&self, url: &str) -> u16 {
        match ureq::get(url).call() {
            Ok(response) => response.status(),
            Err(ureq::Error::Status(code, _)) => code,
            Err(ureq::Error::Transport(_)) => 500,
        }
    }
}
