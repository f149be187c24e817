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

//! OAuth 1.0a signature generation (RFC 5849 section 3.4).

use std::fmt;
use std::str::FromStr;

use http::{Method, Uri};
use log::debug;
use oauthsign_core::hash::base64_hmac_sha1;
use oauthsign_core::{parse_query, Error, Result};

use crate::constants::*;
use crate::credential::Credential;
use crate::encode::oauth_encode;
use crate::nonce::{generate_nonce, generate_timestamp};

/// Signature method used to sign requests.
///
/// HMAC-SHA1 is the only method dropbox accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum SignatureMethod {
    /// `HMAC-SHA1`
    #[default]
    HmacSha1,
}

impl SignatureMethod {
    /// Value sent as `oauth_signature_method`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            v => Err(Error::request_invalid(format!(
                "unsupported signature method: {v}"
            ))),
        }
    }
}

/// Per-request protocol values: nonce, timestamp and signature method.
///
/// These must be fresh for every request, use [`OAuthParams::generate`]
/// unless you need a deterministic signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParams {
    /// `oauth_nonce`
    pub nonce: String,
    /// `oauth_timestamp`, unix epoch seconds.
    pub timestamp: String,
    /// `oauth_signature_method`
    pub signature_method: SignatureMethod,
}

impl OAuthParams {
    /// Create params with a fixed nonce and timestamp.
    pub fn new(nonce: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
            timestamp: timestamp.into(),
            signature_method: SignatureMethod::default(),
        }
    }

    /// Create params with a fresh nonce and the current timestamp.
    pub fn generate() -> Self {
        Self::new(generate_nonce(), generate_timestamp())
    }

    /// Set the signature method.
    pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
        self.signature_method = method;
        self
    }

    /// OAuth protocol parameters, in the order they're sent on the wire.
    ///
    /// `oauth_signature` is not part of them, it's always appended last.
    pub fn protocol_params(&self, cred: &Credential) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        params.push((OAUTH_CONSUMER_KEY, cred.consumer_key.clone()));
        if let Some(token) = &cred.token {
            params.push((OAUTH_TOKEN, token.value.clone()));
        }
        params.push((OAUTH_NONCE, self.nonce.clone()));
        params.push((OAUTH_TIMESTAMP, self.timestamp.clone()));
        params.push((
            OAUTH_SIGNATURE_METHOD,
            self.signature_method.as_str().to_string(),
        ));
        params.push((OAUTH_VERSION, OAUTH_VERSION_1_0.to_string()));
        params
    }
}

/// Output of the signature engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Base64 signature, NOT percent-encoded yet.
    pub signature: String,
    /// `scheme://host[:port]/path` used in the base string.
    pub normalized_url: String,
    /// Sorted and encoded `k=v&k=v` parameters.
    pub parameter_string: String,
    /// `METHOD&url&params`, the string the HMAC was computed over.
    pub base_string: String,
}

/// Sign a request whose parameters all live in the uri query.
pub fn sign(
    method: &Method,
    uri: &Uri,
    cred: &Credential,
    params: &OAuthParams,
) -> Result<Signature> {
    sign_with_params(method, uri, &[], cred, params)
}

/// Sign a request with extra parameters, typically a decoded
/// `application/x-www-form-urlencoded` body.
pub fn sign_with_params(
    method: &Method,
    uri: &Uri,
    extra: &[(String, String)],
    cred: &Credential,
    params: &OAuthParams,
) -> Result<Signature> {
    cred.check()?;
    let normalized_url = normalize_url(uri)?;

    let protocol = params.protocol_params(cred);
    let query = uri.query().map(parse_query).unwrap_or_default();

    let all = protocol
        .iter()
        .map(|(k, v)| (*k, v.as_str()))
        .chain(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .chain(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        // A stale signature on the uri must not sign itself.
        .filter(|(k, _)| *k != OAUTH_SIGNATURE);
    let parameter_string = normalize_parameters(all);

    let base_string = signature_base_string(method, &normalized_url, &parameter_string);
    debug!("signature base string: {base_string}");

    let key = signing_key(
        &cred.consumer_secret,
        cred.token.as_ref().map(|t| t.secret.as_str()),
    );
    let signature = match params.signature_method {
        SignatureMethod::HmacSha1 => base64_hmac_sha1(key.as_bytes(), base_string.as_bytes()),
    };

    Ok(Signature {
        signature,
        normalized_url,
        parameter_string,
        base_string,
    })
}

/// Normalize the request url for the base string.
///
/// Scheme and host are lowercased, default ports dropped, query and fragment
/// stripped. The path is kept exactly as sent.
pub fn normalize_url(uri: &Uri) -> Result<String> {
    let scheme = uri
        .scheme_str()
        .ok_or_else(|| Error::request_invalid(format!("uri without scheme: {uri}")))?
        .to_ascii_lowercase();
    let host = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::request_invalid(format!("uri without host: {uri}")))?
        .to_ascii_lowercase();

    let port = match (scheme.as_str(), uri.port_u16()) {
        ("http", Some(80)) | ("https", Some(443)) | (_, None) => String::new(),
        (_, Some(port)) => format!(":{port}"),
    };
    let path = match uri.path() {
        "" => "/",
        p => p,
    };

    Ok(format!("{scheme}://{host}{port}{path}"))
}

/// Encode every key and value, sort by key then value, and join them.
pub fn normalize_parameters<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (oauth_encode(k), oauth_encode(v)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build `METHOD&enc(url)&enc(params)`.
///
/// The parameter string is encoded again as a whole, so its own `=` and
/// `&` end up as `%3D` and `%26`.
pub fn signature_base_string(method: &Method, normalized_url: &str, parameter_string: &str) -> String {
    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        oauth_encode(normalized_url),
        oauth_encode(parameter_string)
    )
}

/// Build `enc(consumer_secret)&enc(token_secret)`.
///
/// The `&` is always present, even without a token.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        oauth_encode(consumer_secret),
        oauth_encode(token_secret.unwrap_or_default())
    )
}
