//! `leadsync authorize`

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use leadsync_common::auth::{AuthSession, Credentials, TokenEndpoint, TokenManager};
use tracing::info;
use url::Url;

/// Extract `(code, state)` from what the user pasted
///
/// Accepts the full redirect URL or the two values separated by whitespace.
///
/// # Errors
/// When the redirect carries an OAuth `error`, or neither form matches.
pub fn parse_callback(input: &str) -> Result<(String, String)> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input) {
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => bail!("authorization was denied: {value}"),
                _ => {}
            }
        }
        return match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() => Ok((code, state)),
            _ => Err(anyhow!("redirect URL has no `code` and `state` parameters")),
        };
    }

    let mut parts = input.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(code), Some(state), None) => Ok((code.to_string(), state.to_string())),
        _ => bail!("expected the redirect URL or `<code> <state>`"),
    }
}

/// Run the authorization-code flow interactively
///
/// Prints the consent URL to `output`, reads the redirect from `input`,
/// exchanges the code and finally writes the credentials as JSON.
///
/// # Errors
/// On I/O failure, an unparsable redirect, or any [`TokenManager`] error.
pub async fn authorize<C, R, W>(
    manager: &TokenManager<C>,
    mut input: R,
    mut output: W,
) -> Result<Credentials>
where
    C: TokenEndpoint,
    R: BufRead,
    W: Write,
{
    let mut session = AuthSession::new();
    let url = manager.build_authorization_url(&mut session);

    writeln!(output, "Open this URL in your browser and approve access:\n\n  {url}\n")?;
    writeln!(output, "Paste the URL you were redirected to (or `<code> <state>`):")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("reading redirect from stdin")?;
    let (code, state) = parse_callback(&line)?;

    manager.authenticate(&mut session, &code, &state).await?;
    let credentials =
        session.credentials().cloned().context("token exchange stored no credentials")?;
    info!(location_id = ?credentials.location_id, "Authorization complete");

    serde_json::to_writer_pretty(&mut output, &credentials)?;
    writeln!(output)?;
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_redirect_url() {
        let (code, state) =
            parse_callback("http://localhost:8501/?code=abc%2B1&state=XyZ123\n").unwrap();
        assert_eq!(code, "abc+1");
        assert_eq!(state, "XyZ123");
    }

    #[test]
    fn parses_code_and_state_pair() {
        let (code, state) = parse_callback("  abc  XyZ123 ").unwrap();
        assert_eq!((code.as_str(), state.as_str()), ("abc", "XyZ123"));
    }

    #[test]
    fn reports_denied_consent() {
        let err = parse_callback("http://localhost:8501/?error=access_denied&state=s").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn rejects_redirect_without_code() {
        assert!(parse_callback("http://localhost:8501/?state=s").is_err());
        assert!(parse_callback("just-one-token").is_err());
        assert!(parse_callback("").is_err());
    }
}
