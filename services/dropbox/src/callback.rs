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

use http::Uri;
use log::warn;
use oauthsign_core::{parse_query, Error, Result};

use crate::constants::OAUTH_TOKEN;
use crate::credential::Token;

/// Parameters dropbox appends to `oauth_callback` once the user approved
/// the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    /// The request token that was approved.
    pub oauth_token: String,
    /// Dropbox user id, if sent.
    pub uid: Option<String>,
}

impl AuthorizationCallback {
    /// Parse the callback from the uri dropbox redirected to.
    pub fn from_uri(uri: &Uri) -> Result<Self> {
        Self::from_query(uri.query().unwrap_or_default())
    }

    /// Parse the callback from a raw query string.
    pub fn from_query(query: &str) -> Result<Self> {
        let mut oauth_token = None;
        let mut uid = None;

        for (k, v) in parse_query(query) {
            match k.as_str() {
                OAUTH_TOKEN => {
                    if oauth_token.replace(v).is_some() {
                        return Err(Error::response_malformed(
                            "callback carries oauth_token more than once",
                        ));
                    }
                }
                "uid" => uid = Some(v),
                _ => {}
            }
        }

        match oauth_token {
            Some(oauth_token) if !oauth_token.is_empty() => Ok(Self { oauth_token, uid }),
            _ => Err(Error::response_malformed("callback without oauth_token")),
        }
    }

    /// Check the callback is about the request token we asked to authorize.
    pub fn verify(&self, request_token: &Token) -> Result<()> {
        if self.oauth_token != request_token.value {
            warn!(
                "rejected authorization callback for token {}, expected {}",
                self.oauth_token, request_token.value
            );
            return Err(Error::response_malformed(
                "callback oauth_token doesn't match the request token",
            ));
        }
        Ok(())
    }
}
