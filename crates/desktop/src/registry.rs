use crate::environment::EnvironmentContextProvider;
use crate::window::ActiveWindowContextProvider;
use deskmate_core::{ContextProviderRegistry, TimestampContextProvider};

/// Registry holding every built-in context provider.
pub fn default_context_registry() -> ContextProviderRegistry {
    let mut registry = ContextProviderRegistry::new();
    registry.register("timestamp", || Box::new(TimestampContextProvider));
    registry.register("environment", || Box::new(EnvironmentContextProvider));
    registry.register("active_window", || {
        Box::new(ActiveWindowContextProvider::default())
    });
    registry
}
