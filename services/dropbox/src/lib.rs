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

//! Dropbox API v1 OAuth 1.0a signing for oauthsign.
//!
//! This crate signs requests with HMAC-SHA1 and runs the three-legged
//! handshake used to obtain an access token.
//!
//! ## Signing API calls
//!
//! ```no_run
//! use oauthsign_core::{Context, OsEnv, Result, Signer};
//! use oauthsign_dropbox::{DefaultCredentialProvider, Endpoints, RequestSigner, Root};
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
//!
//! let ep = Endpoints::default().metadata(Root::Dropbox, "/Photos")?;
//! let mut parts = http::Request::builder()
//!     .method(ep.method)
//!     .uri(ep.uri)
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Obtaining an access token
//!
//! ```no_run
//! use oauthsign_core::{Context, Result};
//! use oauthsign_dropbox::{Config, PollOptions, TokenExchange};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let config = Config::default()
//!     .with_consumer_key("app key")
//!     .with_consumer_secret("app secret");
//! let exchange = TokenExchange::new(config)?;
//!
//! let request_token = exchange.request_token(&ctx).await?;
//! println!("approve at {}", exchange.authorize_uri(&request_token, None)?);
//!
//! let access_token = exchange
//!     .wait_for_access_token(&ctx, &request_token, &PollOptions::default())
//!     .await?;
//! // Persist access_token, it's the caller's job.
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod constants;
pub use constants::{
    DEFAULT_API_BASE, DEFAULT_AUTHORIZE_BASE, DEFAULT_CONTENT_BASE, DROPBOX_ACCESS_TOKEN,
    DROPBOX_ACCESS_TOKEN_SECRET, DROPBOX_CONSUMER_KEY, DROPBOX_CONSUMER_SECRET,
};

mod callback;
pub use callback::AuthorizationCallback;

mod config;
pub use config::Config;

mod credential;
pub use credential::{Credential, Token};

pub mod encode;
pub use encode::{oauth_encode, Encoder};

mod endpoint;
pub use endpoint::{Endpoint, Endpoints, Root};

mod nonce;
pub use nonce::{generate_nonce, generate_timestamp};

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::{Placement, RequestSigner};

pub mod signature;
pub use signature::{OAuthParams, Signature, SignatureMethod};

mod token_exchange;
pub use token_exchange::{parse_token_response, PollOptions, TokenExchange};
