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

use oauthsign_core::{Context, OsEnv};
use oauthsign_http_send_reqwest::ReqwestHttpSend;

/// Create a context sending requests with a default [`reqwest::Client`]
/// and reading the OS environment.
///
/// Build the context by hand to set timeouts or proxies on the client:
///
/// ```
/// use oauthsign::{Context, OsEnv};
/// use oauthsign_http_send_reqwest::ReqwestHttpSend;
///
/// let client = reqwest::Client::new();
/// let ctx = Context::new()
///     .with_http_send(ReqwestHttpSend::new(client))
///     .with_env(OsEnv);
/// ```
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_reads_os_env() {
        let ctx = default_context();
        assert_eq!(ctx.env_var("PATH"), std::env::var("PATH").ok());
    }
}
