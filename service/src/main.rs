// Copyright 2025 Google LLC.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use certifier_evaluator::DenyAllPlatformVerifier;
use certifier_proto::KeyMessage;
use certifier_service::{framing, CertifierService};
use clap::Parser;
use prost::Message;
use std::sync::Arc;
use tokio::net::TcpStream;

#[derive(Parser)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8123")]
    listen: String,
    /// Path to the serialized policy KeyMessage whose `is-trusted` is
    /// the evaluation axiom.
    #[arg(long, required = true)]
    policy_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let policy_key_bin = std::fs::read(&args.policy_key)
        .with_context(|| format!("reading policy key from {}", args.policy_key))?;
    let policy_key = KeyMessage::decode(policy_key_bin.as_slice())
        .map_err(|_| anyhow::anyhow!("Failed to decode (serialize) policy KeyMessage."))?;

    let service = Arc::new(CertifierService::new(
        policy_key,
        Arc::new(DenyAllPlatformVerifier),
    ));

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    log::info!("certifier listening on {}", args.listen);

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_connection(stream, &service).await {
                log::warn!("connection from {peer} failed: {err:#}");
            }
        });
    }
}

// One request and one response per connection.
async fn serve_connection(
    mut stream: TcpStream,
    service: &CertifierService,
) -> anyhow::Result<()> {
    let request = framing::read_sized_message(&mut stream).await?;
    let response = service.certify(&request)?;
    framing::write_sized_message(&mut stream, &response).await
}
