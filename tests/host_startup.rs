//! Startup tests for `serve`: handshake failures are fatal and happen before
//! the plugin binds a port or touches the wrapped service.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{root_context, TestService};
use service_sdk::grpc::handshake::NOT_A_HOST_MESSAGE;
use service_sdk::grpc::serve_with_env;
use service_sdk::types::{Config, ServerConfig, ENV_PROTOCOL_VERSIONS};
use service_sdk::{Context, Definition, Error, OrderedMap, Result, Service, TypeSet, TypedName, Value};
use tokio::net::TcpListener;

/// Records whether the host ever asked for the identifier.
struct Spy {
    identified: Arc<AtomicBool>,
    inner: TestService,
}

#[async_trait]
impl Service for Spy {
    async fn identifier(&self, ctx: &mut Context) -> Result<TypedName> {
        self.identified.store(true, Ordering::SeqCst);
        self.inner.identifier(ctx).await
    }

    async fn invoke(
        &self,
        ctx: &mut Context,
        identifier: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        self.inner.invoke(ctx, identifier, method, arguments).await
    }

    async fn metadata(&self, ctx: &mut Context) -> Result<(TypeSet, Vec<Definition>)> {
        self.inner.metadata(ctx).await
    }

    async fn state(&self, ctx: &mut Context, identifier: &str, input: OrderedMap) -> Result<Value> {
        self.inner.state(ctx, identifier, input).await
    }
}

/// Config whose only allowed port is held by the returned listener.
async fn config_with_taken_port() -> (Config, TcpListener) {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();
    let config = Config {
        server: ServerConfig {
            bind_host: "127.0.0.1".to_string(),
            min_port: port,
            max_port: port,
        },
        ..Config::default()
    };
    (config, taken)
}

fn cookie_env(config: &Config, value: &str) -> HashMap<String, String> {
    HashMap::from([(config.handshake.magic_cookie_key.clone(), value.to_string())])
}

async fn start(config: &Config, env: &HashMap<String, String>) -> (Result<()>, bool) {
    let identified = Arc::new(AtomicBool::new(false));
    let spy = Spy {
        identified: Arc::clone(&identified),
        inner: TestService::default(),
    };
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        serve_with_env(root_context(), spy, config, env),
    )
    .await
    .expect("startup failure should return immediately");
    (result, identified.load(Ordering::SeqCst))
}

#[tokio::test]
async fn test_missing_cookie_is_fatal_before_bind() {
    let (config, _taken) = config_with_taken_port().await;

    let (result, identified) = start(&config, &HashMap::new()).await;

    // A bind attempt would have failed with a config error instead.
    assert!(matches!(result, Err(Error::Handshake(msg)) if msg == NOT_A_HOST_MESSAGE));
    assert!(!identified);
}

#[tokio::test]
async fn test_wrong_cookie_is_fatal_before_bind() {
    let (config, _taken) = config_with_taken_port().await;
    let env = cookie_env(&config, "not the cookie");

    let (result, identified) = start(&config, &env).await;

    assert!(matches!(result, Err(Error::Handshake(msg)) if msg == NOT_A_HOST_MESSAGE));
    assert!(!identified);
}

#[tokio::test]
async fn test_unsupported_protocol_version_is_fatal() {
    let (config, _taken) = config_with_taken_port().await;
    let mut env = cookie_env(&config, &config.handshake.magic_cookie_value);
    env.insert(ENV_PROTOCOL_VERSIONS.to_string(), "7,8".to_string());

    let (result, identified) = start(&config, &env).await;

    assert!(matches!(result, Err(Error::Handshake(msg)) if msg.contains("7, 8")));
    assert!(!identified);
}

#[tokio::test]
async fn test_valid_handshake_proceeds_to_bind() {
    let (config, _taken) = config_with_taken_port().await;
    let env = cookie_env(&config, &config.handshake.magic_cookie_value);

    let (result, identified) = start(&config, &env).await;

    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("no free port")));
    assert!(!identified);
}
