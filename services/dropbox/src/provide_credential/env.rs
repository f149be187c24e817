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

use async_trait::async_trait;
use log::debug;
use oauthsign_core::{Context, ProvideCredential, Result};

use crate::config::Config;
use crate::credential::Credential;

/// EnvCredentialProvider loads dropbox credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `DROPBOX_CONSUMER_KEY`: The consumer key of the application
/// - `DROPBOX_CONSUMER_SECRET`: The consumer secret of the application
/// - `DROPBOX_ACCESS_TOKEN`: The access token (optional)
/// - `DROPBOX_ACCESS_TOKEN_SECRET`: The access token secret (optional)
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let cred = Config::default().from_env(ctx).credential();
        if cred.is_none() {
            debug!("dropbox consumer key or secret not found in env");
        }
        Ok(cred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::credential::Token;
    use oauthsign_core::{OsEnv, StaticEnv};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_env_credential_provider() -> Result<()> {
        let envs = HashMap::from([
            (DROPBOX_CONSUMER_KEY.to_string(), "key1".to_string()),
            (DROPBOX_CONSUMER_SECRET.to_string(), "secret1".to_string()),
        ]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be provided");
        assert_eq!(cred.consumer_key, "key1");
        assert_eq!(cred.consumer_secret, "secret1");
        assert!(cred.token.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_with_access_token() -> Result<()> {
        let envs = HashMap::from([
            (DROPBOX_CONSUMER_KEY.to_string(), "key1".to_string()),
            (DROPBOX_CONSUMER_SECRET.to_string(), "secret1".to_string()),
            (DROPBOX_ACCESS_TOKEN.to_string(), "atok".to_string()),
            (DROPBOX_ACCESS_TOKEN_SECRET.to_string(), "asec".to_string()),
        ]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be provided");
        assert_eq!(cred.token, Some(Token::new("atok", "asec")));

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_partial_credentials() -> Result<()> {
        let envs = HashMap::from([(DROPBOX_CONSUMER_KEY.to_string(), "key1".to_string())]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let cred = EnvCredentialProvider::new().provide_credential(&ctx).await?;
        assert!(cred.is_none());

        Ok(())
    }

    #[test]
    fn test_env_credential_provider_os_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        temp_env::with_vars(
            vec![
                (DROPBOX_CONSUMER_KEY, Some("os_key")),
                (DROPBOX_CONSUMER_SECRET, Some("os_secret")),
                (DROPBOX_ACCESS_TOKEN, None),
                (DROPBOX_ACCESS_TOKEN_SECRET, None),
            ],
            || {
                tokio::runtime::Runtime::new().unwrap().block_on(async {
                    let ctx = Context::new().with_env(OsEnv);

                    let cred = EnvCredentialProvider::new()
                        .provide_credential(&ctx)
                        .await
                        .expect("load must succeed")
                        .expect("credential must be provided");
                    assert_eq!(cred.consumer_key, "os_key");
                    assert_eq!(cred.consumer_secret, "os_secret");
                    assert!(cred.token.is_none());
                })
            },
        );
    }
}
