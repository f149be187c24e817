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

use std::fmt::{Debug, Formatter};

use http::Uri;
use oauthsign_core::{utils::Redact, Context, Error, Result};

use crate::constants::*;
use crate::credential::{Credential, Token};

/// Config carries all the configuration for Dropbox services.
#[derive(Clone, Default)]
pub struct Config {
    /// `consumer_key` of the application.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`DROPBOX_CONSUMER_KEY`]
    pub consumer_key: Option<String>,
    /// `consumer_secret` of the application.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`DROPBOX_CONSUMER_SECRET`]
    pub consumer_secret: Option<String>,
    /// `access_token` obtained by a previous handshake.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`DROPBOX_ACCESS_TOKEN`]
    pub access_token: Option<String>,
    /// `access_token_secret` paired with `access_token`.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`DROPBOX_ACCESS_TOKEN_SECRET`]
    pub access_token_secret: Option<String>,
    /// Base of the api host, defaults to `https://api.dropbox.com/1/`.
    pub api_base: Option<String>,
    /// Base of the content host, defaults to `https://api-content.dropbox.com/1/`.
    pub content_base: Option<String>,
    /// Base of the authorize page, defaults to `https://www.dropbox.com/1/`.
    pub authorize_base: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("consumer_key", &Redact::from(&self.consumer_key))
            .field("consumer_secret", &Redact::from(&self.consumer_secret))
            .field("access_token", &Redact::from(&self.access_token))
            .field("access_token_secret", &Redact::from(&self.access_token_secret))
            .field("api_base", &self.api_base)
            .field("content_base", &self.content_base)
            .field("authorize_base", &self.authorize_base)
            .finish()
    }
}

impl Config {
    /// Set the consumer key.
    pub fn with_consumer_key(mut self, v: impl Into<String>) -> Self {
        self.consumer_key = Some(v.into());
        self
    }

    /// Set the consumer secret.
    pub fn with_consumer_secret(mut self, v: impl Into<String>) -> Self {
        self.consumer_secret = Some(v.into());
        self
    }

    /// Set the access token and its secret.
    pub fn with_access_token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self.access_token_secret = Some(secret.into());
        self
    }

    /// Set the api base, for example to point at a mock server.
    pub fn with_api_base(mut self, v: impl Into<String>) -> Self {
        self.api_base = Some(v.into());
        self
    }

    /// Set the content base.
    pub fn with_content_base(mut self, v: impl Into<String>) -> Self {
        self.content_base = Some(v.into());
        self
    }

    /// Set the authorize base.
    pub fn with_authorize_base(mut self, v: impl Into<String>) -> Self {
        self.authorize_base = Some(v.into());
        self
    }

    /// Load config from env.
    ///
    /// Fields already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.consumer_key.is_none() {
            self.consumer_key = envs.get(DROPBOX_CONSUMER_KEY).cloned();
        }
        if self.consumer_secret.is_none() {
            self.consumer_secret = envs.get(DROPBOX_CONSUMER_SECRET).cloned();
        }
        if self.access_token.is_none() {
            self.access_token = envs.get(DROPBOX_ACCESS_TOKEN).cloned();
        }
        if self.access_token_secret.is_none() {
            self.access_token_secret = envs.get(DROPBOX_ACCESS_TOKEN_SECRET).cloned();
        }

        self
    }

    /// Api base in use, with a trailing `/`.
    pub fn api_base(&self) -> String {
        with_trailing_slash(self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))
    }

    /// Content base in use, with a trailing `/`.
    pub fn content_base(&self) -> String {
        with_trailing_slash(self.content_base.as_deref().unwrap_or(DEFAULT_CONTENT_BASE))
    }

    /// Authorize base in use, with a trailing `/`.
    pub fn authorize_base(&self) -> String {
        with_trailing_slash(
            self.authorize_base
                .as_deref()
                .unwrap_or(DEFAULT_AUTHORIZE_BASE),
        )
    }

    /// Check that every configured base is an absolute `http(s)` uri.
    pub fn validate(&self) -> Result<()> {
        for (name, base) in [
            ("api_base", self.api_base()),
            ("content_base", self.content_base()),
            ("authorize_base", self.authorize_base()),
        ] {
            let uri: Uri = base
                .parse()
                .map_err(|e| Error::config_invalid(format!("{name} is not a valid uri: {base}")).with_source(e))?;
            match uri.scheme_str() {
                Some("http") | Some("https") if uri.host().is_some() => {}
                _ => {
                    return Err(Error::config_invalid(format!(
                        "{name} must be an absolute http(s) uri: {base}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Build a credential from this config.
    ///
    /// Returns `None` unless both consumer key and secret are set. The token
    /// is only attached when both access token and its secret are set.
    pub fn credential(&self) -> Option<Credential> {
        let (Some(key), Some(secret)) = (&self.consumer_key, &self.consumer_secret) else {
            return None;
        };

        let mut cred = Credential::new(key.clone(), secret.clone());
        if let (Some(token), Some(token_secret)) = (&self.access_token, &self.access_token_secret) {
            cred = cred.with_token(Token::new(token.clone(), token_secret.clone()));
        }
        Some(cred)
    }
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}
