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

use crate::{Context, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded lazily on the first call and cached until
/// [`SigningCredential::is_valid`] reports it unusable.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the credential provider, dropping any cached credential.
    pub fn with_credential_provider(
        mut self,
        loader: impl ProvideCredential<Credential = K>,
    ) -> Self {
        self.loader = Arc::new(loader);
        self.credential = Arc::new(Mutex::new(None));
        self
    }

    /// Replace the request signer.
    pub fn with_request_signer(mut self, builder: impl SignRequest<Credential = K>) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// Replace the context.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Get the context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signing request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        self.builder
            .sign_request(&self.ctx, req, credential.as_ref(), expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticEnv;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Key(String);

    impl SigningCredential for Key {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingLoader(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl ProvideCredential for CountingLoader {
        type Credential = Key;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Key>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Key("key1".to_string())))
        }
    }

    #[derive(Debug)]
    struct EnvLoader;

    #[async_trait::async_trait]
    impl ProvideCredential for EnvLoader {
        type Credential = Key;

        async fn provide_credential(&self, ctx: &Context) -> Result<Option<Key>> {
            Ok(ctx.env_var("TEST_SIGNING_KEY").map(Key))
        }
    }

    #[derive(Debug)]
    struct HeaderBuilder;

    #[async_trait::async_trait]
    impl SignRequest for HeaderBuilder {
        type Credential = Key;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            credential: Option<&Key>,
            _: Option<Duration>,
        ) -> Result<()> {
            let key = credential.map(|k| k.0.as_str()).unwrap_or("none");
            req.headers.insert("x-test-key", key.parse()?);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_credential_is_cached() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingLoader(calls.clone()),
            HeaderBuilder,
        );

        for _ in 0..3 {
            let mut parts = http::Request::get("https://api.dropbox.com/1/account/info")
                .body(())?
                .into_parts()
                .0;
            signer.sign(&mut parts, None).await?;
            assert_eq!(parts.headers["x-test-key"], "key1");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_with_credential_provider_resets_cache() -> Result<()> {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(Context::new(), CountingLoader(first.clone()), HeaderBuilder);

        let mut parts = http::Request::get("https://api.dropbox.com/1/account/info")
            .body(())?
            .into_parts()
            .0;
        signer.sign(&mut parts, None).await?;

        let signer = signer.with_credential_provider(CountingLoader(second.clone()));
        signer.sign(&mut parts, None).await?;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_with_context() -> Result<()> {
        let signer = Signer::new(Context::new(), EnvLoader, HeaderBuilder);
        let mut parts = http::Request::get("https://api.dropbox.com/1/account/info")
            .body(())?
            .into_parts()
            .0;
        signer.sign(&mut parts, None).await?;
        assert_eq!(parts.headers["x-test-key"], "none");

        let signer = signer.with_context(Context::new().with_env(StaticEnv {
            envs: HashMap::from([("TEST_SIGNING_KEY".to_string(), "key2".to_string())]),
        }));
        signer.sign(&mut parts, None).await?;

        assert_eq!(parts.headers["x-test-key"], "key2");
        assert_eq!(signer.context().env_var("TEST_SIGNING_KEY").as_deref(), Some("key2"));
        Ok(())
    }
}
