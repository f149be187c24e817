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

use std::time::Duration;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::{HeaderValue, Method, Uri};
use log::debug;
use oauthsign_core::{parse_query, Context, Error, Result, SignRequest, SigningRequest};

use crate::constants::*;
use crate::credential::Credential;
use crate::encode::oauth_encode;
use crate::signature::{sign_with_params, OAuthParams};

/// Where the OAuth protocol parameters are placed on a signed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// Append them to the query string, after the existing parameters.
    #[default]
    Query,
    /// Send them in an `Authorization: OAuth ...` header.
    Header,
}

/// RequestSigner that implements OAuth 1.0a HMAC-SHA1 signing for dropbox.
///
/// - [OAuth Core 1.0a](https://oauth.net/core/1.0a/)
/// - [RFC 5849](https://www.rfc-editor.org/rfc/rfc5849)
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    placement: Placement,
    params: Option<OAuthParams>,
}

impl RequestSigner {
    /// Create a new request signer placing parameters in the query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set where the protocol parameters go.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Specify a fixed nonce and timestamp.
    ///
    /// # Note
    ///
    /// We should always use a fresh nonce and the current time to sign
    /// requests. Only use this function for testing.
    pub fn with_oauth_params(mut self, params: OAuthParams) -> Self {
        self.params = Some(params);
        self
    }

    fn oauth_params(&self) -> OAuthParams {
        self.params.clone().unwrap_or_else(OAuthParams::generate)
    }

    /// Sign the uri, returning it with the protocol parameters appended to
    /// its query and `oauth_signature` last.
    ///
    /// The configured placement is ignored, a uri has nowhere else to carry
    /// the parameters.
    pub fn sign_uri(&self, method: &Method, uri: &Uri, cred: &Credential) -> Result<Uri> {
        let mut parts = http::Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .body(())?
            .into_parts()
            .0;

        self.sign_parts(&mut parts, cred, Placement::Query)?;
        Ok(parts.uri)
    }

    /// Sign an `application/x-www-form-urlencoded` body.
    ///
    /// The body parameters take part in the signature, and the returned
    /// body has the protocol parameters appended.
    pub fn sign_form_body(
        &self,
        method: &Method,
        uri: &Uri,
        body: &str,
        cred: &Credential,
    ) -> Result<String> {
        let params = self.oauth_params();
        let mut extra = parse_query(body);
        extra.retain(|(k, _)| !is_protocol_param(k));
        let signature = sign_with_params(method, uri, &extra, cred, &params)?;

        // Re-signing must not duplicate the previous protocol parameters.
        let mut out = body
            .split('&')
            .filter(|seg| {
                let key = seg.split('=').next().unwrap_or_default();
                !seg.is_empty() && !is_protocol_param(key)
            })
            .collect::<Vec<_>>()
            .join("&");
        let protocol = params
            .protocol_params(cred)
            .into_iter()
            .chain([(OAUTH_SIGNATURE, signature.signature)]);
        for (k, v) in protocol {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(k);
            out.push('=');
            out.push_str(&oauth_encode(&v));
        }

        Ok(out)
    }

    fn sign_parts(&self, parts: &mut Parts, cred: &Credential, placement: Placement) -> Result<()> {
        let params = self.oauth_params();
        let mut req = SigningRequest::build(parts)?;

        // Re-signing must not duplicate the previous protocol parameters.
        req.query.retain(|(k, _)| !is_protocol_param(k));

        let signature = sign_with_params(&req.method, &req.uri()?, &[], cred, &params)?;
        debug!(
            "signed {} {} with parameters in {placement:?}",
            req.method, signature.normalized_url
        );

        match placement {
            Placement::Query => {
                for (k, v) in params.protocol_params(cred) {
                    req.query_push(k, v);
                }
                req.query_push(OAUTH_SIGNATURE, signature.signature);
            }
            Placement::Header => {
                let value = authorization_header(&params, cred, &signature.signature);
                req.headers.insert(AUTHORIZATION, {
                    let mut value: HeaderValue = value.parse()?;
                    value.set_sensitive(true);
                    value
                });
            }
        }

        req.apply(parts)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "no credential available to sign the request",
            ));
        };
        if expires_in.is_some() {
            return Err(Error::request_invalid(
                "OAuth 1.0a signatures don't support expiration",
            ));
        }

        self.sign_parts(req, cred, self.placement)
    }
}

/// Build `OAuth k="v", ...` with every value percent-encoded.
fn authorization_header(params: &OAuthParams, cred: &Credential, signature: &str) -> String {
    let fields = params
        .protocol_params(cred)
        .into_iter()
        .map(|(k, v)| format!("{k}=\"{}\"", oauth_encode(&v)))
        .chain([format!("{OAUTH_SIGNATURE}=\"{}\"", oauth_encode(signature))])
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {fields}")
}

fn is_protocol_param(k: &str) -> bool {
    matches!(
        k,
        OAUTH_CONSUMER_KEY
            | OAUTH_TOKEN
            | OAUTH_NONCE
            | OAUTH_TIMESTAMP
            | OAUTH_SIGNATURE_METHOD
            | OAUTH_VERSION
            | OAUTH_SIGNATURE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Token;
    use oauthsign_core::Signer;
    use pretty_assertions::assert_eq;

    fn signer() -> RequestSigner {
        RequestSigner::new().with_oauth_params(OAuthParams::new("fixednonce", "1000000000"))
    }

    #[test]
    fn test_sign_uri_request_token() -> Result<()> {
        let uri: Uri = "https://api.example.com/1/oauth/request_token".parse()?;
        let signed = signer().sign_uri(&Method::GET, &uri, &Credential::new("key1", "secret1"))?;

        assert_eq!(
            signed.to_string(),
            "https://api.example.com/1/oauth/request_token?oauth_consumer_key=key1&oauth_nonce=fixednonce&oauth_timestamp=1000000000&oauth_signature_method=HMAC-SHA1&oauth_version=1.0&oauth_signature=B%2FuZNjYtwrSwrY27LA%2Ffu3XVsxw%3D"
        );
        Ok(())
    }

    #[test]
    fn test_sign_uri_keeps_existing_query_first() -> Result<()> {
        let uri: Uri = "https://api.dropbox.com/1/fileops/create_folder?root=dropbox&path=%2Fmy%20docs%20%28old%29".parse()?;
        let cred = Credential::new("key1", "secret1").with_token(Token::new("atok", "asec"));

        let signed = signer().sign_uri(&Method::GET, &uri, &cred)?;

        assert_eq!(
            signed.query(),
            Some("root=dropbox&path=%2Fmy%20docs%20%28old%29&oauth_consumer_key=key1&oauth_token=atok&oauth_nonce=fixednonce&oauth_timestamp=1000000000&oauth_signature_method=HMAC-SHA1&oauth_version=1.0&oauth_signature=5tuuk%2BnNjV80Ixw5F1QiMdk1GMk%3D")
        );
        Ok(())
    }

    #[test]
    fn test_sign_uri_keeps_encoded_path() -> Result<()> {
        let uri: Uri = "https://api-content.dropbox.com/1/files_put/dropbox/notes%20%28draft%29.txt".parse()?;
        let cred = Credential::new("key1", "secret1").with_token(Token::new("atok", "asec"));

        let signed = signer().sign_uri(&Method::PUT, &uri, &cred)?;

        assert_eq!(signed.path(), "/1/files_put/dropbox/notes%20%28draft%29.txt");
        assert!(signed
            .query()
            .unwrap_or_default()
            .ends_with("&oauth_signature=ivIzGoDQKD5pHCC%2BRs877S93ua4%3D"));
        Ok(())
    }

    #[test]
    fn test_resigning_replaces_protocol_params() -> Result<()> {
        let uri: Uri = "https://api.example.com/1/oauth/request_token".parse()?;
        let cred = Credential::new("key1", "secret1");

        let once = signer().sign_uri(&Method::GET, &uri, &cred)?;
        let twice = signer().sign_uri(&Method::GET, &once, &cred)?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_resign_form_body() -> Result<()> {
        let uri: Uri = "https://api.example.com/1/fileops/create_folder".parse()?;
        let cred = Credential::new("key1", "secret1");

        let once = signer().sign_form_body(&Method::POST, &uri, "a=b", &cred)?;
        let twice = signer().sign_form_body(&Method::POST, &uri, &once, &cred)?;
        assert_eq!(once, twice);
        assert_eq!(twice.matches("oauth_signature=").count(), 1);
        assert!(twice.starts_with("a=b&oauth_consumer_key=key1&"));
        Ok(())
    }

    #[test]
    fn test_sign_uri_fresh_nonce_per_call() -> Result<()> {
        let uri: Uri = "https://api.example.com/1/oauth/request_token".parse()?;
        let cred = Credential::new("key1", "secret1");
        let signer = RequestSigner::new();

        let a = signer.sign_uri(&Method::GET, &uri, &cred)?;
        let b = signer.sign_uri(&Method::GET, &uri, &cred)?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn test_sign_uri_rejects_relative_uri() {
        let uri: Uri = "/1/oauth/request_token".parse().unwrap();
        let err = signer()
            .sign_uri(&Method::GET, &uri, &Credential::new("key1", "secret1"))
            .unwrap_err();

        assert_eq!(err.kind(), oauthsign_core::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_sign_form_body() -> Result<()> {
        let uri: Uri = "https://api.twitter.com/1.1/statuses/update.json?include_entities=true".parse()?;
        let cred = Credential::new("xvz1evFS4wEEPTGEFPHBog", "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw")
            .with_token(Token::new(
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
            ));
        let signer = RequestSigner::new().with_oauth_params(OAuthParams::new(
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            "1318622958",
        ));

        let body = signer.sign_form_body(
            &Method::POST,
            &uri,
            "status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21",
            &cred,
        )?;

        assert!(body.starts_with("status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21&oauth_consumer_key=xvz1evFS4wEEPTGEFPHBog&"));
        assert!(body.ends_with("&oauth_signature=hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D"));
        Ok(())
    }

    #[test]
    fn test_sign_empty_form_body() -> Result<()> {
        let uri: Uri = "https://api.example.com/1/oauth/request_token".parse()?;
        let body = signer().sign_form_body(&Method::POST, &uri, "", &Credential::new("key1", "secret1"))?;

        assert!(body.starts_with("oauth_consumer_key=key1&"));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_header_placement() -> Result<()> {
        let mut parts = http::Request::get("https://api.example.com/1/oauth/request_token")
            .body(())?
            .into_parts()
            .0;

        signer()
            .with_placement(Placement::Header)
            .sign_request(&Context::new(), &mut parts, Some(&Credential::new("key1", "secret1")), None)
            .await?;

        assert_eq!(parts.uri.to_string(), "https://api.example.com/1/oauth/request_token");
        let header = parts.headers.get(AUTHORIZATION).expect("authorization must be set");
        assert!(header.is_sensitive());
        assert_eq!(
            header.to_str().unwrap(),
            "OAuth oauth_consumer_key=\"key1\", oauth_nonce=\"fixednonce\", oauth_timestamp=\"1000000000\", oauth_signature_method=\"HMAC-SHA1\", oauth_version=\"1.0\", oauth_signature=\"B%2FuZNjYtwrSwrY27LA%2Ffu3XVsxw%3D\""
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_request_without_credential() {
        let mut parts = http::Request::get("https://api.example.com/1/account/info")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let err = signer()
            .sign_request(&Context::new(), &mut parts, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), oauthsign_core::ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_sign_request_rejects_expiration() {
        let mut parts = http::Request::get("https://api.example.com/1/account/info")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let err = signer()
            .sign_request(
                &Context::new(),
                &mut parts,
                Some(&Credential::new("key1", "secret1")),
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap_err();
        assert!(err.is_signing_precondition());
    }

    #[derive(Debug)]
    struct Fixed(Credential);

    #[async_trait]
    impl oauthsign_core::ProvideCredential for Fixed {
        type Credential = Credential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Credential>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[tokio::test]
    async fn test_plugs_into_signer() -> Result<()> {
        let cred = Credential::new("key1", "secret1").with_token(Token::new("atok", "asec"));
        let s = Signer::new(Context::new(), Fixed(cred), signer());

        let mut parts = http::Request::get("https://api.dropbox.com/1/account/info")
            .body(())?
            .into_parts()
            .0;
        s.sign(&mut parts, None).await?;

        let query = parts.uri.query().unwrap_or_default();
        assert!(query.contains("oauth_token=atok"));
        assert!(query.contains("oauth_signature="));
        Ok(())
    }
}
