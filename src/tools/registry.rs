use crate::types::{AppError, Result, ToolDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A callable function the agent can invoke by name.
///
/// Results are JSON values. Tools that produce text for people return a
/// JSON string.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value>;
}

#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn register_all(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Definitions sorted by name.
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args).await,
            None => Err(AppError::NotFound(format!("Tool not found: {}", name))),
        }
    }

    /// Registered tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Required string argument.
pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation(format!("Missing '{}' parameter", key)))
}

/// Required integer argument. Numeric strings are accepted since models
/// often quote numbers.
pub(crate) fn int_arg(args: &Value, key: &str) -> Result<i64> {
    match args.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| AppError::Validation(format!("'{}' must be an integer", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("'{}' must be an integer", key))),
        _ => Err(AppError::Validation(format!("Missing '{}' parameter", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::calculator::{Add, Multiply};
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_all([Arc::new(Add) as Arc<dyn Tool>, Arc::new(Multiply)]);
        registry
    }

    #[test]
    fn test_registry_creation() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.tool_names().len(), 0);
    }

    #[test]
    fn test_definitions_sorted() {
        let definitions = registry().get_tool_definitions();
        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["add", "multiply"]);

        for def in &definitions {
            assert!(!def.description.is_empty());
            assert!(def.parameters.is_object());
        }
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let value = registry()
            .execute("multiply", json!({"a": 6, "b": 7}))
            .await
            .unwrap();
        assert_eq!(value, json!(42));
    }

    #[tokio::test]
    async fn test_nonexistent_tool() {
        let err = registry()
            .execute("nonexistent_tool", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("Tool not found: nonexistent_tool".into()));
    }

    #[test]
    fn test_int_arg_accepts_quoted_numbers() {
        let args = json!({"a": "12", "b": 3, "c": 1.5});
        assert_eq!(int_arg(&args, "a").unwrap(), 12);
        assert_eq!(int_arg(&args, "b").unwrap(), 3);
        assert!(int_arg(&args, "c").is_err());
        assert!(int_arg(&args, "d").is_err());
    }
}
