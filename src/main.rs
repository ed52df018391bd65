//! Echo service plugin - demo entry point.
//!
//! Serves a service that echoes its invoke arguments and state input back to
//! the host. Must be launched by a plugin host: the magic cookie has to be
//! present in the environment.

use async_trait::async_trait;
use clap::Parser;

use service_sdk::context::{Attribute, ObjectType, TypeRegistry};
use service_sdk::issue::workflow;
use service_sdk::{
    Config, Context, Definition, OrderedMap, Result, Service, TypeSet, TypedName, Value,
};

const MESSAGE_TYPE: &str = "Echo::Message";

#[derive(Debug, Parser)]
#[command(name = "service-sdk-echo", about = "Echo service plugin")]
struct Args {
    /// Name the service identifies itself with.
    #[arg(long, env = "ECHO_SERVICE_NAME", default_value = "echo")]
    name: String,

    /// Emit JSON logs.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug)]
struct EchoService {
    name: String,
}

#[async_trait]
impl Service for EchoService {
    async fn identifier(&self, _ctx: &mut Context) -> Result<TypedName> {
        Ok(TypedName::new("service", &self.name))
    }

    async fn invoke(
        &self,
        _ctx: &mut Context,
        identifier: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        tracing::debug!(identifier, method, "echo invoke");
        match method {
            "echo" => Ok(Value::Array(arguments)),
            "first" => Ok(arguments.into_iter().next().unwrap_or_default()),
            _ => Err(workflow::illegal_operation(method).into()),
        }
    }

    async fn metadata(&self, _ctx: &mut Context) -> Result<(TypeSet, Vec<Definition>)> {
        let type_set = TypeSet::new("Echo", "1.0.0", vec![message_type()]);
        let definition = Definition::new(
            TypedName::new("definition", format!("{}::echo", self.name)),
            TypedName::new("service", &self.name),
            [("interface", "Echo")].into_iter().collect::<OrderedMap>(),
        );
        Ok((type_set, vec![definition]))
    }

    async fn state(&self, _ctx: &mut Context, _identifier: &str, input: OrderedMap) -> Result<Value> {
        Ok(Value::Hash(input))
    }
}

fn message_type() -> ObjectType {
    ObjectType::new(MESSAGE_TYPE, vec![Attribute::required("text")])
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    config.observability.json_logs |= args.json_logs;

    // Initialize observability
    service_sdk::observability::init_tracing(&config.observability);

    let mut types = TypeRegistry::new();
    types.register(message_type())?;
    let root = Context::new(types);

    match service_sdk::grpc::serve(root, EchoService { name: args.name }, &config).await {
        // Started by hand rather than by a host.
        Err(service_sdk::Error::Handshake(msg)) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
        result => Ok(result?),
    }
}
