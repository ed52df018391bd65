//! Shared test service for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::time::Duration;

use service_sdk::context::{Attribute, ObjectType, TypeRegistry};
use service_sdk::issue::{workflow, Reported};
use service_sdk::{Context, Definition, OrderedMap, Result, Service, TypeSet, TypedName, Value};

pub const WIDGET_TYPE: &str = "Acme::Widget";

/// Methods:
/// - `echo`: returns the arguments as an array
/// - `scoped`: `[was_unset, caller]` after writing `caller` into the context
/// - `issue`: raises the workflow issue named by the first argument
/// - `crash`: panics
#[derive(Debug, Default)]
pub struct TestService {
    pub definitions: usize,
}

pub fn widget_type() -> ObjectType {
    ObjectType::new(
        WIDGET_TYPE,
        vec![Attribute::required("id"), Attribute::optional("label")],
    )
}

pub fn root_context() -> Context {
    let mut types = TypeRegistry::new();
    types.register(widget_type()).unwrap();
    let mut root = Context::new(types);
    root.set("region", "eu-west-1");
    root
}

/// The issue raised for `issue` invocations, keyed by its code.
pub fn issue_for(code: &str) -> Option<Reported> {
    Some(match code {
        workflow::CONDITION_SYNTAX_ERROR => workflow::condition_syntax_error("a and", 5),
        workflow::CONDITION_MISSING_RP => workflow::condition_missing_rp("(a or b", 7),
        workflow::CONDITION_INVALID_NAME => workflow::condition_invalid_name("9lives", "9lives and b", 0),
        workflow::CONDITION_UNEXPECTED_END => workflow::condition_unexpected_end("a and not", 9),
        workflow::ILLEGAL_ITERATION_STYLE => workflow::illegal_iteration_style("zigzag"),
        workflow::ILLEGAL_OPERATION => workflow::illegal_operation("explode"),
        workflow::ACTIVITY_NO_NAME => workflow::activity_no_name(),
        workflow::ITERATOR_NOT_ONE_ACTIVITY => workflow::iterator_not_one_activity(),
        _ => return None,
    })
}

#[async_trait]
impl Service for TestService {
    async fn identifier(&self, _ctx: &mut Context) -> Result<TypedName> {
        Ok(TypedName::new("service", "test"))
    }

    async fn invoke(
        &self,
        ctx: &mut Context,
        _identifier: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        match method {
            "echo" => Ok(Value::Array(arguments)),
            "scoped" => {
                let was_unset = ctx.get("caller").is_none();
                let caller = arguments.into_iter().next().unwrap_or_default();
                ctx.set("caller", caller);
                // Let other calls run between the write and the read.
                tokio::time::sleep(Duration::from_millis(5)).await;
                tokio::task::yield_now().await;
                let seen = ctx.get("caller").cloned().unwrap_or_default();
                Ok(Value::Array(vec![Value::Boolean(was_unset), seen]))
            }
            "region" => Ok(ctx.get("region").cloned().unwrap_or_default()),
            "issue" => {
                let code = arguments
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                match issue_for(&code) {
                    Some(reported) => Err(reported.into()),
                    None => Err(workflow::illegal_operation(&code).into()),
                }
            }
            "crash" => panic!("unclassified fault in test service"),
            other => Err(workflow::illegal_operation(other).into()),
        }
    }

    async fn metadata(&self, _ctx: &mut Context) -> Result<(TypeSet, Vec<Definition>)> {
        let definitions = (0..self.definitions)
            .map(|i| {
                Definition::new(
                    TypedName::new("definition", format!("test::d{}", i)),
                    TypedName::new("service", "test"),
                    [("index", Value::from(i as i64))].into_iter().collect::<OrderedMap>(),
                )
            })
            .collect();
        Ok((TypeSet::new("Test", "0.1.0", vec![widget_type()]), definitions))
    }

    async fn state(&self, _ctx: &mut Context, identifier: &str, input: OrderedMap) -> Result<Value> {
        let mut state = OrderedMap::new();
        state.insert("identifier", identifier);
        state.insert("input", input);
        Ok(Value::Hash(state))
    }
}
