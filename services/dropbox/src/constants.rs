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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Env values used in dropbox.

/// Env name of the consumer key.
pub const DROPBOX_CONSUMER_KEY: &str = "DROPBOX_CONSUMER_KEY";
/// Env name of the consumer secret.
pub const DROPBOX_CONSUMER_SECRET: &str = "DROPBOX_CONSUMER_SECRET";
/// Env name of the access token.
pub const DROPBOX_ACCESS_TOKEN: &str = "DROPBOX_ACCESS_TOKEN";
/// Env name of the access token secret.
pub const DROPBOX_ACCESS_TOKEN_SECRET: &str = "DROPBOX_ACCESS_TOKEN_SECRET";

/// Default base of the api host.
pub const DEFAULT_API_BASE: &str = "https://api.dropbox.com/1/";
/// Default base of the content host, used for file download and upload.
pub const DEFAULT_CONTENT_BASE: &str = "https://api-content.dropbox.com/1/";
/// Default base of the authorize page.
pub const DEFAULT_AUTHORIZE_BASE: &str = "https://www.dropbox.com/1/";

pub const REQUEST_TOKEN_PATH: &str = "oauth/request_token";
pub const ACCESS_TOKEN_PATH: &str = "oauth/access_token";
pub const AUTHORIZE_PATH: &str = "oauth/authorize";

// OAuth protocol parameters.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_TOKEN: &str = "oauth_token";
pub const OAUTH_TOKEN_SECRET: &str = "oauth_token_secret";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_VERSION: &str = "oauth_version";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_CALLBACK: &str = "oauth_callback";

pub const OAUTH_VERSION_1_0: &str = "1.0";

/// RFC 3986 section 2.3 unreserved characters: `ALPHA / DIGIT / "-" / "." / "_" / "~"`.
pub static OAUTH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
