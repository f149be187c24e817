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

//! Percent-encoding profiles.
//!
//! All profiles escape with uppercase hex digits: the Dropbox signature
//! verifier compares raw encoded bytes, so `%2f` and `%2F` are different
//! signatures to it.

use std::borrow::Cow;

use percent_encoding::utf8_percent_encode;

use crate::constants::OAUTH_ENCODE_SET;

/// Percent-encoder with an optional substitution table.
///
/// Substitutions are applied byte by byte before the RFC 3986 escaping, and
/// their replacement is emitted verbatim.
///
/// Encoding is not idempotent: encoding an already encoded string escapes
/// its `%` again. Encode every raw value exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoder {
    substitutions: Vec<(u8, &'static str)>,
}

impl Encoder {
    /// Strict RFC 3986 profile used for every OAuth parameter, the base url
    /// and the signing key.
    pub fn oauth() -> Self {
        Self::default()
    }

    /// Profile for paths handed to Dropbox file-operation endpoints.
    ///
    /// On top of the strict profile, a literal `+` becomes `%20`, and `(` / `)`
    /// are pinned to `%28` / `%29`.
    pub fn dropbox_path() -> Self {
        Self::default()
            .with_substitution(b'+', "%20")
            .with_substitution(b'(', "%28")
            .with_substitution(b')', "%29")
    }

    /// Add a substitution for an ASCII byte.
    ///
    /// A later substitution for the same byte replaces the earlier one.
    pub fn with_substitution(mut self, byte: u8, replacement: &'static str) -> Self {
        debug_assert!(byte.is_ascii(), "substitutions only apply to ASCII bytes");

        self.substitutions.retain(|(b, _)| *b != byte);
        self.substitutions.push((byte, replacement));
        self
    }

    /// Percent-encode the input.
    pub fn encode(&self, input: &str) -> String {
        if self.substitutions.is_empty() {
            return utf8_percent_encode(input, &OAUTH_ENCODE_SET).to_string();
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(idx) = rest.find(|c: char| self.substitution(c).is_some()) {
            out.extend(utf8_percent_encode(&rest[..idx], &OAUTH_ENCODE_SET));

            // Substituted bytes are ASCII, so `idx + 1` is a char boundary.
            let c = rest.as_bytes()[idx] as char;
            out.push_str(self.substitution(c).unwrap_or_default());
            rest = &rest[idx + 1..];
        }
        out.extend(utf8_percent_encode(rest, &OAUTH_ENCODE_SET));

        out
    }

    fn substitution(&self, c: char) -> Option<&'static str> {
        if !c.is_ascii() {
            return None;
        }

        self.substitutions
            .iter()
            .find(|(b, _)| *b as char == c)
            .map(|(_, r)| *r)
    }
}

/// Percent-encode with the strict OAuth profile.
#[inline]
pub fn oauth_encode(input: &str) -> String {
    utf8_percent_encode(input, &OAUTH_ENCODE_SET).to_string()
}

/// Uppercase the hex digits of every `%xx` escape.
///
/// Use this on text produced by encoders emitting lowercase hex before it
/// reaches a signature. Anything that isn't a complete escape is left alone.
pub fn normalize_escapes(input: &str) -> Cow<'_, str> {
    let bs = input.as_bytes();
    let needs_fix = bs.windows(3).any(|w| {
        w[0] == b'%'
            && w[1].is_ascii_hexdigit()
            && w[2].is_ascii_hexdigit()
            && (w[1].is_ascii_lowercase() || w[2].is_ascii_lowercase())
    });
    if !needs_fix {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(bs.len());
    let mut i = 0;
    while i < bs.len() {
        if bs[i] == b'%'
            && i + 2 < bs.len()
            && bs[i + 1].is_ascii_hexdigit()
            && bs[i + 2].is_ascii_hexdigit()
        {
            out.push(b'%');
            out.push(bs[i + 1].to_ascii_uppercase());
            out.push(bs[i + 2].to_ascii_uppercase());
            i += 3;
        } else {
            out.push(bs[i]);
            i += 1;
        }
    }

    // Only ASCII hex digits changed case, the buffer is still valid UTF-8.
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}
