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

use oauthsign_core::{utils::Redact, Error, Result, SigningCredential};

/// An OAuth token and its secret.
///
/// The same type is used for the request token (short lived, only used
/// during authorization) and the access token (used for every API call
/// afterwards). Persisting the access token is up to the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// Value sent as `oauth_token`.
    pub value: String,
    /// Secret used in the signing key, never sent on the wire.
    pub secret: String,
}

impl Token {
    /// Create a new token.
    pub fn new(value: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: secret.into(),
        }
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &self.value)
            .field("secret", &Redact::from(&self.secret))
            .finish()
    }
}

/// Credential used to sign dropbox requests.
///
/// Holds the consumer key/secret of the application and, once the user
/// authorized it, the token to sign with.
#[derive(Clone)]
pub struct Credential {
    /// Consumer key of the application.
    pub consumer_key: String,
    /// Consumer secret of the application.
    pub consumer_secret: String,
    /// Token to sign with, `None` while fetching a request token.
    pub token: Option<Token>,
}

impl Credential {
    /// Create a new credential without token.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    /// Attach a token to this credential.
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Check the signing preconditions on this credential.
    pub(crate) fn check(&self) -> Result<()> {
        if self.consumer_key.is_empty() {
            return Err(Error::credential_invalid("consumer key is empty"));
        }
        if self.consumer_secret.is_empty() {
            return Err(Error::credential_invalid("consumer secret is empty"));
        }
        Ok(())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("consumer_key", &Redact::from(&self.consumer_key))
            .field("consumer_secret", &Redact::from(&self.consumer_secret))
            .field("token", &self.token)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential::new("consumer_key_1", "consumer_secret_1")
            .with_token(Token::new("atok", "access_token_secret"));
        let out = format!("{cred:?}");

        assert!(!out.contains("consumer_secret_1"));
        assert!(!out.contains("access_token_secret"));
        assert!(out.contains("atok"));
    }

    #[test]
    fn test_is_valid() {
        assert!(Credential::new("key1", "secret1").is_valid());
        assert!(!Credential::new("", "secret1").is_valid());
        assert!(!Credential::new("key1", "").is_valid());
    }
}
