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

//! Sign OAuth 1.0a requests without effort.
//!
//! `oauthsign` bundles [`oauthsign_core`] with the services built on top
//! of it. Each service lives behind a feature of the same name.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> oauthsign::Result<()> {
//! // Reads DROPBOX_CONSUMER_KEY, DROPBOX_CONSUMER_SECRET and the access token from env.
//! let signer = oauthsign::dropbox::default_signer();
//!
//! let mut req = http::Request::builder()
//!     .method("GET")
//!     .uri("https://api.dropbox.com/1/account/info")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign(&mut req, None).await?;
//! # Ok(())
//! # }
//! ```

pub use oauthsign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

#[cfg(feature = "dropbox")]
pub mod dropbox;
