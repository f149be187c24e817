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

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use oauthsign_core::{Context, ProvideCredential, Result};

use crate::config::Config;
use crate::credential::Credential;

/// ConfigCredentialProvider loads credentials from [`Config`], falling back
/// to the environment for fields that aren't set.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new ConfigCredentialProvider
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.as_ref().clone().from_env(ctx);

        match config.credential() {
            Some(cred) => {
                debug!("loading credential from config");
                Ok(Some(cred))
            }
            None => {
                debug!("incomplete config, skipping");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::credential::Token;
    use oauthsign_core::StaticEnv;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_config_wins_over_env() -> Result<()> {
        let envs = HashMap::from([
            (DROPBOX_CONSUMER_KEY.to_string(), "env_key".to_string()),
            (DROPBOX_CONSUMER_SECRET.to_string(), "env_secret".to_string()),
            (DROPBOX_ACCESS_TOKEN.to_string(), "env_tok".to_string()),
            (DROPBOX_ACCESS_TOKEN_SECRET.to_string(), "env_sec".to_string()),
        ]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let config = Config::default()
            .with_consumer_key("key1")
            .with_access_token("atok", "asec");
        let cred = ConfigCredentialProvider::new(Arc::new(config))
            .provide_credential(&ctx)
            .await?
            .expect("credential must be provided");

        assert_eq!(cred.consumer_key, "key1");
        assert_eq!(cred.consumer_secret, "env_secret");
        assert_eq!(cred.token, Some(Token::new("atok", "asec")));
        Ok(())
    }

    #[tokio::test]
    async fn test_incomplete_config() -> Result<()> {
        let config = Config::default().with_consumer_key("key1");
        let cred = ConfigCredentialProvider::new(Arc::new(config))
            .provide_credential(&Context::new())
            .await?;

        assert!(cred.is_none());
        Ok(())
    }
}
