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

//! Unsigned uris for the Dropbox API v1 endpoints.

use std::fmt;
use std::str::FromStr;

use http::{Method, Uri};
use oauthsign_core::{Error, Result};

use crate::config::Config;
use crate::encode::Encoder;

/// Root a path is resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Root {
    /// Full dropbox access.
    #[default]
    Dropbox,
    /// App folder access.
    Sandbox,
}

impl Root {
    /// Value used in uris.
    pub fn as_str(&self) -> &'static str {
        match self {
            Root::Dropbox => "dropbox",
            Root::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Root {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dropbox" => Ok(Root::Dropbox),
            "sandbox" => Ok(Root::Sandbox),
            v => Err(Error::request_invalid(format!("unknown root: {v}"))),
        }
    }
}

/// Method and uri of an API call, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Method the call must be sent (and signed) with.
    pub method: Method,
    /// Unsigned uri.
    pub uri: Uri,
}

/// Builder of Dropbox API v1 endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_base: String,
    content_base: String,
    encoder: Encoder,
}

impl Endpoints {
    /// Create endpoints from the bases in config.
    pub fn new(config: &Config) -> Self {
        Self {
            api_base: config.api_base(),
            content_base: config.content_base(),
            encoder: Encoder::dropbox_path(),
        }
    }

    /// Replace the encoder used for path values.
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// `GET account/info`
    pub fn account_info(&self) -> Result<Endpoint> {
        get(format!("{}account/info", self.api_base))
    }

    /// `GET metadata/{root}/{path}`
    pub fn metadata(&self, root: Root, path: &str) -> Result<Endpoint> {
        get(format!(
            "{}metadata/{root}/{}",
            self.api_base,
            self.encode_segments(path)
        ))
    }

    /// `GET fileops/create_folder?root=&path=`
    pub fn create_folder(&self, root: Root, path: &str) -> Result<Endpoint> {
        get(format!(
            "{}fileops/create_folder?root={root}&path={}",
            self.api_base,
            self.encoder.encode(path)
        ))
    }

    /// `GET fileops/delete?root=&path=`
    pub fn delete(&self, root: Root, path: &str) -> Result<Endpoint> {
        get(format!(
            "{}fileops/delete?root={root}&path={}",
            self.api_base,
            self.encoder.encode(path)
        ))
    }

    /// `GET fileops/move?root=&from_path=&to_path=`
    pub fn move_path(&self, root: Root, from_path: &str, to_path: &str) -> Result<Endpoint> {
        get(format!(
            "{}fileops/move?root={root}&from_path={}&to_path={}",
            self.api_base,
            self.encoder.encode(from_path),
            self.encoder.encode(to_path)
        ))
    }

    /// `GET files?root=&path=` on the content host.
    pub fn download(&self, root: Root, path: &str) -> Result<Endpoint> {
        get(format!(
            "{}files?root={root}&path={}",
            self.content_base,
            self.encoder.encode(path)
        ))
    }

    /// `PUT files_put/{root}/{path}` on the content host.
    pub fn upload(&self, root: Root, path: &str) -> Result<Endpoint> {
        Ok(Endpoint {
            method: Method::PUT,
            uri: parse(format!(
                "{}files_put/{root}/{}",
                self.content_base,
                self.encode_segments(path)
            ))?,
        })
    }

    /// Encode every segment of a path, keeping the `/` between them.
    fn encode_segments(&self, path: &str) -> String {
        path.trim_start_matches('/')
            .split('/')
            .map(|seg| self.encoder.encode(seg))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

fn get(uri: String) -> Result<Endpoint> {
    Ok(Endpoint {
        method: Method::GET,
        uri: parse(uri)?,
    })
}

fn parse(uri: String) -> Result<Uri> {
    uri.parse()
        .map_err(|e| Error::config_invalid(format!("invalid endpoint uri: {uri}")).with_source(e))
}
