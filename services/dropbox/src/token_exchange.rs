// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Three-legged OAuth 1.0a handshake against dropbox.
//!
//! The flow only moves forward:
//!
//! 1. [`TokenExchange::request_token`] fetches an unauthorized request token.
//! 2. [`TokenExchange::authorize_uri`] builds the page the user approves it on.
//! 3. [`TokenExchange::access_token`] trades the approved request token for
//!    an access token.
//!
//! Between 2 and 3 the caller either receives an [`AuthorizationCallback`]
//! or polls with [`TokenExchange::wait_for_access_token`]. Any failure means
//! starting over from 1.
//!
//! [`AuthorizationCallback`]: crate::AuthorizationCallback

use std::time::Duration;

use bytes::Bytes;
use http::{Method, StatusCode, Uri};
use log::{debug, error};
use oauthsign_core::{Context, Error, ErrorKind, Result, SignRequest};
use percent_encoding::percent_decode_str;

use crate::config::Config;
use crate::constants::*;
use crate::credential::{Credential, Token};
use crate::encode::oauth_encode;
use crate::sign_request::RequestSigner;

/// Backoff used while waiting for the user to approve a request token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Upper bound of the delay between two attempts.
    pub max_interval: Duration,
    /// Factor applied to the delay after every attempt.
    pub multiplier: u32,
    /// Give up once this much time passed since the first attempt.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            multiplier: 2,
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollOptions {
    /// Set the delay before the first retry.
    pub fn with_initial_interval(mut self, v: Duration) -> Self {
        self.initial_interval = v;
        self
    }

    /// Set the maximum delay between attempts.
    pub fn with_max_interval(mut self, v: Duration) -> Self {
        self.max_interval = v;
        self
    }

    /// Set the backoff factor.
    pub fn with_multiplier(mut self, v: u32) -> Self {
        self.multiplier = v;
        self
    }

    /// Set the overall timeout.
    ///
    /// A timeout too large to be represented as a deadline, like
    /// [`Duration::MAX`], means polling never times out.
    pub fn with_timeout(mut self, v: Duration) -> Self {
        self.timeout = v;
        self
    }

    /// Check the delays between attempts are not zero.
    pub fn validate(&self) -> Result<()> {
        if self.initial_interval.is_zero() || self.max_interval.is_zero() {
            return Err(Error::config_invalid(format!(
                "poll interval must be positive, got initial {:?} and max {:?}",
                self.initial_interval, self.max_interval
            )));
        }
        Ok(())
    }
}

/// Drive the OAuth handshake with the dropbox endpoints.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    config: Config,
    consumer: Credential,
    signer: RequestSigner,
}

impl TokenExchange {
    /// Create a token exchange for the consumer in config.
    ///
    /// Any access token in config is ignored, the handshake is how one is
    /// obtained.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let (Some(key), Some(secret)) = (&config.consumer_key, &config.consumer_secret) else {
            return Err(Error::config_invalid(
                "consumer key and consumer secret are required for the token exchange",
            ));
        };
        let consumer = Credential::new(key.clone(), secret.clone());
        consumer.check()?;

        Ok(Self {
            config,
            consumer,
            signer: RequestSigner::new(),
        })
    }

    /// Replace the request signer, for example to sign with a header.
    pub fn with_request_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    /// Credential signing API calls on behalf of the user owning `access_token`.
    pub fn credential(&self, access_token: Token) -> Credential {
        self.consumer.clone().with_token(access_token)
    }

    /// Fetch an unauthorized request token.
    pub async fn request_token(&self, ctx: &Context) -> Result<Token> {
        let token = self.fetch_token(ctx, REQUEST_TOKEN_PATH, None).await?;
        debug!("request token obtained: {}", token.value);
        Ok(token)
    }

    /// Build the uri of the page where the user approves `request_token`.
    ///
    /// Only `oauth_token` and `oauth_callback` are embedded.
    pub fn authorize_uri(&self, request_token: &Token, callback: Option<&str>) -> Result<Uri> {
        let mut uri = format!(
            "{}{AUTHORIZE_PATH}?{OAUTH_TOKEN}={}",
            self.config.authorize_base(),
            oauth_encode(&request_token.value)
        );
        if let Some(callback) = callback {
            uri.push_str(&format!("&{OAUTH_CALLBACK}={}", oauth_encode(callback)));
        }

        uri.parse()
            .map_err(|e| Error::request_invalid(format!("invalid authorize uri: {uri}")).with_source(e))
    }

    /// Trade an approved request token for an access token.
    pub async fn access_token(&self, ctx: &Context, request_token: &Token) -> Result<Token> {
        let token = self
            .fetch_token(ctx, ACCESS_TOKEN_PATH, Some(request_token))
            .await?;
        debug!("access token obtained: {}", token.value);
        Ok(token)
    }

    /// Poll the access token endpoint until the user approved `request_token`.
    ///
    /// `401` and `403` mean the approval is still pending, every other error
    /// is returned as is. Fails with [`ErrorKind::AuthorizationTimeout`] once
    /// `opts.timeout` is reached, and with [`ErrorKind::ConfigInvalid`] when an
    /// interval in `opts` is zero. Dropping the future stops polling.
    pub async fn wait_for_access_token(
        &self,
        ctx: &Context,
        request_token: &Token,
        opts: &PollOptions,
    ) -> Result<Token> {
        opts.validate()?;
        let deadline = tokio::time::Instant::now().checked_add(opts.timeout);
        let mut interval = opts.initial_interval;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.access_token(ctx, request_token).await {
                Ok(token) => return Ok(token),
                Err(err) if is_pending(&err) => {
                    debug!("authorization pending after {attempts} attempts: {err}");
                }
                Err(err) => return Err(err),
            }

            let delay = match deadline {
                Some(deadline) => {
                    let now = tokio::time::Instant::now();
                    if now >= deadline {
                        return Err(Error::authorization_timeout(format!(
                            "request token {} not approved after {attempts} attempts in {:?}",
                            request_token.value, opts.timeout
                        )));
                    }
                    interval.min(deadline - now)
                }
                None => interval,
            };

            tokio::time::sleep(delay).await;
            interval = interval
                .saturating_mul(opts.multiplier.max(1))
                .min(opts.max_interval);
        }
    }

    async fn fetch_token(&self, ctx: &Context, path: &str, token: Option<&Token>) -> Result<Token> {
        let cred = match token {
            Some(token) => self.consumer.clone().with_token(token.clone()),
            None => self.consumer.clone(),
        };
        let uri: Uri = format!("{}{path}", self.config.api_base())
            .parse()
            .map_err(|e| Error::config_invalid("invalid api base").with_source(e))?;

        let mut parts = http::Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(())?
            .into_parts()
            .0;
        self.signer
            .sign_request(ctx, &mut parts, Some(&cred), None)
            .await?;

        let req = http::Request::from_parts(parts, Bytes::new());
        let resp = ctx.http_send_as_string(req).await?;
        let status = resp.status();
        let body = resp.into_body();

        if !status.is_success() {
            error!("token request to {path} failed with {status}");
            return Err(Error::auth_server(status, body));
        }

        parse_token_response(&body)
    }
}

fn is_pending(err: &Error) -> bool {
    err.kind() == ErrorKind::AuthServer
        && matches!(
            err.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
}

/// Parse a `oauth_token=...&oauth_token_secret=...` body.
///
/// Keys are matched by name, in any order. Both must be present exactly
/// once and non empty. Other keys such as `uid` are ignored.
pub fn parse_token_response(body: &str) -> Result<Token> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::response_malformed("empty token response"));
    }

    let mut value = None;
    let mut secret = None;
    for segment in body.split('&') {
        let Some((k, v)) = segment.split_once('=') else {
            return Err(Error::response_malformed(format!(
                "token response segment without '=': {segment}"
            )));
        };

        let slot = match k {
            OAUTH_TOKEN => &mut value,
            OAUTH_TOKEN_SECRET => &mut secret,
            _ => continue,
        };
        let v = percent_decode_str(v)
            .decode_utf8()
            .map_err(|e| {
                Error::response_malformed(format!("{k} is not valid utf-8")).with_source(e)
            })?
            .into_owned();
        if slot.replace(v).is_some() {
            return Err(Error::response_malformed(format!(
                "{k} appears more than once in token response"
            )));
        }
    }

    match (value, secret) {
        (Some(value), Some(secret)) if !value.is_empty() && !secret.is_empty() => {
            Ok(Token::new(value, secret))
        }
        (None, _) => Err(Error::response_malformed(
            "token response without oauth_token",
        )),
        (_, None) => Err(Error::response_malformed(
            "token response without oauth_token_secret",
        )),
        _ => Err(Error::response_malformed(
            "token response with an empty oauth_token or oauth_token_secret",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_poll_options_validate() {
        assert!(PollOptions::default().validate().is_ok());
        assert!(PollOptions::default()
            .with_timeout(Duration::MAX)
            .validate()
            .is_ok());

        for opts in [
            PollOptions::default().with_initial_interval(Duration::ZERO),
            PollOptions::default().with_max_interval(Duration::ZERO),
        ] {
            let err = opts.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        }
    }

    #[test]
    fn test_parse_token_response() -> Result<()> {
        assert_eq!(
            parse_token_response("oauth_token_secret=rsec&oauth_token=rtok")?,
            Token::new("rtok", "rsec")
        );
        assert_eq!(
            parse_token_response("oauth_token=atok&oauth_token_secret=asec&uid=12345")?,
            Token::new("atok", "asec")
        );
        assert_eq!(
            parse_token_response("oauth_token=a%2Bb&oauth_token_secret=c%3Dd\n")?,
            Token::new("a+b", "c=d")
        );
        Ok(())
    }

    #[test_case(""; "empty body")]
    #[test_case("oauth_token=rtok"; "missing secret")]
    #[test_case("oauth_token_secret=rsec"; "missing token")]
    #[test_case("oauth_token=rtok&oauth_token_secret"; "segment without equals")]
    #[test_case("rsec&rtok"; "positional body")]
    #[test_case("oauth_token=a&oauth_token=b&oauth_token_secret=c"; "duplicated token")]
    #[test_case("oauth_token=&oauth_token_secret=rsec"; "empty token")]
    #[test_case("<html>rate limited</html>"; "html body")]
    fn test_parse_token_response_malformed(body: &str) {
        let err = parse_token_response(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseMalformed);
    }

    fn exchange() -> TokenExchange {
        TokenExchange::new(
            Config::default()
                .with_consumer_key("key1")
                .with_consumer_secret("secret1"),
        )
        .expect("config must be valid")
    }

    #[test]
    fn test_new_requires_consumer() {
        let err = TokenExchange::new(Config::default().with_consumer_key("key1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = TokenExchange::new(
            Config::default()
                .with_consumer_key("key1")
                .with_consumer_secret(""),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[test]
    fn test_authorize_uri() -> Result<()> {
        let token = Token::new("rtok", "rsec");

        let uri = exchange().authorize_uri(&token, None)?;
        assert_eq!(uri.to_string(), "https://www.dropbox.com/1/oauth/authorize?oauth_token=rtok");

        let uri = exchange().authorize_uri(&token, Some("https://example.com/Home/Authorized"))?;
        assert_eq!(
            uri.to_string(),
            "https://www.dropbox.com/1/oauth/authorize?oauth_token=rtok&oauth_callback=https%3A%2F%2Fexample.com%2FHome%2FAuthorized"
        );
        assert!(!uri.to_string().contains("rsec"));
        Ok(())
    }

    #[test]
    fn test_poll_options() {
        let opts = PollOptions::default()
            .with_initial_interval(Duration::from_millis(100))
            .with_max_interval(Duration::from_secs(1))
            .with_multiplier(3)
            .with_timeout(Duration::from_secs(10));

        assert_eq!(opts.initial_interval, Duration::from_millis(100));
        assert_eq!(opts.max_interval, Duration::from_secs(1));
        assert_eq!(opts.multiplier, 3);
        assert_eq!(opts.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_is_pending() {
        assert!(is_pending(&Error::auth_server(StatusCode::UNAUTHORIZED, "")));
        assert!(is_pending(&Error::auth_server(StatusCode::FORBIDDEN, "")));
        assert!(!is_pending(&Error::auth_server(StatusCode::INTERNAL_SERVER_ERROR, "")));
        assert!(!is_pending(&Error::transport("connection reset")));
    }
}
