use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
};

use serde_json::Value;

use crate::append_command_log;

/// Handler for one named UI command. `Ok(None)` is the null response.
pub(crate) trait CommandHandler: Send + Sync {
    fn invoke(&self, request: &Value) -> Result<Option<Value>, String>;
}

#[derive(Default)]
pub(crate) struct CommandTable {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
}

impl CommandTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Last registration of a name wins.
    pub(crate) fn register<H>(&mut self, name: impl Into<String>, handler: H)
    where
        H: CommandHandler + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            append_command_log(&format!("command '{name}' re-registered; replacing handler"));
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Never fails: unknown commands, handler errors and handler panics all
    /// produce `null`.
    pub(crate) fn dispatch(&self, name: &str, request: &Value) -> Value {
        let Some(handler) = self.handlers.get(name) else {
            append_command_log(&format!("unhandled command '{name}'"));
            return Value::Null;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(request))) {
            Ok(Ok(response)) => response.unwrap_or(Value::Null),
            Ok(Err(error)) => {
                append_command_log(&format!("command '{name}' failed: {error}"));
                Value::Null
            }
            Err(_) => {
                append_command_log(&format!("command '{name}' panicked"));
                Value::Null
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use serde_json::json;

    use super::*;

    struct Echo;

    impl CommandHandler for Echo {
        fn invoke(&self, request: &Value) -> Result<Option<Value>, String> {
            Ok(Some(request.clone()))
        }
    }

    struct Fixed(&'static str);

    impl CommandHandler for Fixed {
        fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
            Ok(Some(Value::String(self.0.to_string())))
        }
    }

    struct Silent;

    impl CommandHandler for Silent {
        fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
            Ok(None)
        }
    }

    struct Failing;

    impl CommandHandler for Failing {
        fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
            Err("store unavailable".to_string())
        }
    }

    struct Panicking;

    impl CommandHandler for Panicking {
        fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
            panic!("handler bug");
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl CommandHandler for Counting {
        fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[test]
    fn dispatch_routes_request_to_registered_handler() {
        let mut table = CommandTable::new();
        table.register("echo", Echo);

        let response = table.dispatch("echo", &json!({"key": "value"}));
        assert_eq!(response, json!({"key": "value"}));
    }

    #[test]
    fn dispatch_unknown_command_returns_null_without_side_effects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = CommandTable::new();
        table.register("count", Counting(Arc::clone(&calls)));

        assert_eq!(table.dispatch("nonexistent", &json!("anything")), Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unset_response_is_null() {
        let mut table = CommandTable::new();
        table.register("silent", Silent);
        assert_eq!(table.dispatch("silent", &Value::Null), Value::Null);
    }

    #[test]
    fn duplicate_registration_replaces_previous_handler() {
        let mut table = CommandTable::new();
        table.register("channel", Fixed("first"));
        table.register("channel", Fixed("second"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.dispatch("channel", &Value::Null), json!("second"));
    }

    #[test]
    fn handler_errors_and_panics_become_null() {
        let mut table = CommandTable::new();
        table.register("failing", Failing);
        table.register("panicking", Panicking);

        assert_eq!(table.dispatch("failing", &Value::Null), Value::Null);
        assert_eq!(table.dispatch("panicking", &Value::Null), Value::Null);
        assert!(table.contains("panicking"));
    }
}
