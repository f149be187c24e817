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

//! Dropbox API v1 support with convenience APIs.

pub use oauthsign_dropbox::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Signer};

/// Signer for dropbox requests.
#[cfg(feature = "default-context")]
pub type DefaultSigner = Signer<Credential>;

/// Create a dropbox signer with the default setup:
///
/// - the default context (reqwest http client and OS environment)
/// - [`DefaultCredentialProvider`], reading `DROPBOX_*` env vars
/// - [`RequestSigner`] placing the parameters in the query
///
/// # Customization
///
/// ```no_run
/// use oauthsign::dropbox::{default_signer, Placement, RequestSigner, StaticCredentialProvider};
///
/// let signer = default_signer()
///     .with_credential_provider(StaticCredentialProvider::with_access_token(
///         "app key",
///         "app secret",
///         "access token",
///         "access token secret",
///     ))
///     .with_request_signer(RequestSigner::new().with_placement(Placement::Header));
/// ```
#[cfg(feature = "default-context")]
pub fn default_signer() -> DefaultSigner {
    Signer::new(
        default_context(),
        DefaultCredentialProvider::new(),
        RequestSigner::new(),
    )
}
