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

//! Run the OAuth handshake against dropbox and print the access token.
//!
//! ```shell
//! DROPBOX_CONSUMER_KEY=... DROPBOX_CONSUMER_SECRET=... cargo run --example handshake
//! ```

use std::time::Duration;

use oauthsign_core::{Context, OsEnv};
use oauthsign_dropbox::{Config, PollOptions, TokenExchange};
use oauthsign_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::new(client))
        .with_env(OsEnv);

    let exchange = TokenExchange::new(Config::default().from_env(&ctx))?;

    let request_token = exchange.request_token(&ctx).await?;
    println!(
        "Open this page and allow access:\n\n    {}\n",
        exchange.authorize_uri(&request_token, None)?
    );

    let opts = PollOptions::default().with_timeout(Duration::from_secs(600));
    let access_token = exchange
        .wait_for_access_token(&ctx, &request_token, &opts)
        .await?;

    println!("DROPBOX_ACCESS_TOKEN={}", access_token.value);
    println!("DROPBOX_ACCESS_TOKEN_SECRET={}", access_token.secret);
    Ok(())
}
