//! HTTP daemon exposing the extractor as `POST /parse`.
//!
//! Configuration comes from the environment:
//! - `CALEX_ADDR`: bind address, default `127.0.0.1:8787`
//! - `OPENAI_API_KEY`: enables the language-model fallback when set
//! - `CALEX_ORACLE_URL`, `CALEX_ORACLE_MODEL`: override the fallback endpoint

use std::sync::Arc;

use calex::server::{AppState, router};
use calex::{OpenAiOracle, Oracle};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8787";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("calex=info,tower_http=info")))
        .init();

    let oracle = oracle_from_env();
    if oracle.is_some() {
        tracing::info!("language-model fallback enabled");
    } else {
        tracing::info!("no OPENAI_API_KEY; running pure-deterministic");
    }

    let addr = std::env::var("CALEX_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(AppState { oracle })).await?;
    Ok(())
}

fn oracle_from_env() -> Option<Arc<dyn Oracle>> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let oracle = match (std::env::var("CALEX_ORACLE_URL"), std::env::var("CALEX_ORACLE_MODEL")) {
        (Ok(url), Ok(model)) => OpenAiOracle::with_endpoint(api_key, url, model),
        (Ok(url), Err(_)) => OpenAiOracle::with_endpoint(api_key, url, "gpt-3.5-turbo"),
        _ => OpenAiOracle::new(api_key),
    };
    Some(Arc::new(oracle))
}
