use crate::tools::registry::{int_arg, Tool};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

fn operands_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "integer", "description": "First operand" },
            "b": { "type": "integer", "description": "Second operand" }
        },
        "required": ["a", "b"]
    })
}

fn overflow(op: &str) -> AppError {
    AppError::Validation(format!("Integer overflow in {}", op))
}

pub fn add(a: i64, b: i64) -> Result<i64> {
    a.checked_add(b).ok_or_else(|| overflow("add"))
}

pub fn multiply(a: i64, b: i64) -> Result<i64> {
    a.checked_mul(b).ok_or_else(|| overflow("multiply"))
}

pub struct Add;

#[async_trait]
impl Tool for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two integers"
    }

    fn parameters_schema(&self) -> Value {
        operands_schema()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        Ok(json!(add(int_arg(&args, "a")?, int_arg(&args, "b")?)?))
    }
}

pub struct Multiply;

#[async_trait]
impl Tool for Multiply {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two integers"
    }

    fn parameters_schema(&self) -> Value {
        operands_schema()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        Ok(json!(multiply(
            int_arg(&args, "a")?,
            int_arg(&args, "b")?
        )?))
    }
}
