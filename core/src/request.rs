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

use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{Error, Result};

/// RFC 3986 unreserved characters stay as is, everything else is escaped.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signing context for request.
///
/// The query is kept **decoded**: it's parsed as
/// `application/x-www-form-urlencoded` on [`SigningRequest::build`] and
/// percent-encoded again (RFC 3986, uppercase hex) on [`SigningRequest::apply`].
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent-encoded as sent on the wire.
    pub path: String,
    /// HTTP query parameters, decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri
                .scheme
                .ok_or_else(|| Error::request_invalid("request without scheme is invalid for signing"))?,
            authority: uri
                .authority
                .ok_or_else(|| Error::request_invalid("request without authority is invalid for signing"))?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(parse_query)
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Build a signing context from a bare uri.
    pub fn from_uri(method: Method, uri: &Uri) -> Result<Self> {
        let mut parts = http::Request::builder()
            .method(method)
            .uri(uri.clone())
            .body(())?
            .into_parts()
            .0;

        Self::build(&mut parts)
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method.clone();
        parts.uri = self.uri()?;

        Ok(())
    }

    /// Render the signing context into an uri.
    pub fn uri(&self) -> Result<Uri> {
        let paq = if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        };

        let mut uri_parts = http::uri::Parts::default();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(self.authority.clone());
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);

        Ok(Uri::from_parts(uri_parts)?)
    }

    /// Encode the query in its current order, `k=v` joined by `&`.
    pub fn query_string(&self) -> String {
        let mut s = String::with_capacity(self.query_size());

        for (idx, (k, v)) in self.query.iter().enumerate() {
            if idx != 0 {
                s.push('&');
            }

            s.extend(utf8_percent_encode(k, QUERY_ENCODE_SET));
            s.push('=');
            s.extend(utf8_percent_encode(v, QUERY_ENCODE_SET));
        }

        s
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len() + 2)
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }
}

/// Parse a raw query string into decoded pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_decodes_query() -> Result<()> {
        let uri: Uri = "https://api.dropbox.com/1/fileops/create_folder?root=dropbox&path=%2Fmy%20docs"
            .parse()?;
        let req = SigningRequest::from_uri(Method::GET, &uri)?;

        assert_eq!(req.scheme, Scheme::HTTPS);
        assert_eq!(req.authority.as_str(), "api.dropbox.com");
        assert_eq!(req.path, "/1/fileops/create_folder");
        assert_eq!(
            req.query,
            vec![
                ("root".to_string(), "dropbox".to_string()),
                ("path".to_string(), "/my docs".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_apply_reencodes_query_in_order() -> Result<()> {
        let mut parts = http::Request::put("https://api-content.dropbox.com/1/files_put/dropbox/a%20b.txt?overwrite=true")
            .body(())?
            .into_parts()
            .0;

        let mut req = SigningRequest::build(&mut parts)?;
        req.query_push("oauth_consumer_key", "key1");
        req.query_push("oauth_signature", "a/b+c=");
        req.apply(&mut parts)?;

        assert_eq!(parts.method, Method::PUT);
        assert_eq!(
            parts.uri.to_string(),
            "https://api-content.dropbox.com/1/files_put/dropbox/a%20b.txt?overwrite=true&oauth_consumer_key=key1&oauth_signature=a%2Fb%2Bc%3D"
        );
        Ok(())
    }

    #[test]
    fn test_relative_uri_is_invalid() {
        let uri: Uri = "/1/account/info".parse().unwrap();
        let err = SigningRequest::from_uri(Method::GET, &uri).unwrap_err();
        assert!(err.is_signing_precondition());
    }
}
