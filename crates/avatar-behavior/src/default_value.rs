//! Default values for unconfigured calls.

use std::sync::Arc;

use avatar_core::{AvatarResult, Value, ValueType};
use rustc_hash::FxHashMap;

use crate::{AvatarBehavior, GetNext, MethodInvocation, MethodReturn};

// ── DefaultValueProvider ──────────────────────────────────────────────────────

/// Produces a reasonable default instance of a declared type.
pub trait DefaultValueProvider: Send + Sync {
    fn default_value(&self, ty: &ValueType) -> Value;
}

type Factory = Arc<dyn Fn(&ValueType) -> Value + Send + Sync>;

/// The standard [`DefaultValueProvider`], extensible per type.
///
/// Built-in defaults:
///
/// | Declared type              | Default        |
/// |----------------------------|----------------|
/// | `bool`                     | `false`        |
/// | `i32`, `i64`, `f64`        | zero           |
/// | `string`                   | `""`           |
/// | `[T]`                      | empty list     |
/// | `T?`, objects, `any`, void | null           |
///
/// A factory registered for an exact type takes precedence.
#[derive(Clone, Default)]
pub struct DefaultValues {
    factories: FxHashMap<ValueType, Factory>,
}

impl DefaultValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `factory` for values of exactly `ty`, replacing any earlier one.
    pub fn register<F>(&mut self, ty: ValueType, factory: F)
    where
        F: Fn(&ValueType) -> Value + Send + Sync + 'static,
    {
        self.factories.insert(ty, Arc::new(factory));
    }

    /// Builder form of [`register`][Self::register].
    pub fn with<F>(mut self, ty: ValueType, factory: F) -> Self
    where
        F: Fn(&ValueType) -> Value + Send + Sync + 'static,
    {
        self.register(ty, factory);
        self
    }

    /// Drop the factory for `ty`; `true` if one was registered.
    pub fn deregister(&mut self, ty: &ValueType) -> bool {
        self.factories.remove(ty).is_some()
    }

    fn builtin(ty: &ValueType) -> Value {
        match ty {
            ValueType::Bool => Value::Bool(false),
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F64 => Value::F64(0.0),
            ValueType::Str => Value::Str(String::new()),
            ValueType::List(_) => Value::List(Vec::new()),
            ValueType::Unit
            | ValueType::Nullable(_)
            | ValueType::Object(_)
            | ValueType::Any => Value::Null,
        }
    }
}

impl DefaultValueProvider for DefaultValues {
    fn default_value(&self, ty: &ValueType) -> Value {
        match self.factories.get(ty) {
            Some(factory) => factory(ty),
            None => Self::builtin(ty),
        }
    }
}

// ── DefaultValueBehavior ──────────────────────────────────────────────────────

/// Answers every call with default values and never continues the chain.
///
/// Each `out` parameter gets the provider's default for its type; `ref`
/// parameters keep the value the caller passed.  The return value is the
/// provider's default for the return type, or nothing for `void`.
pub struct DefaultValueBehavior {
    provider: Arc<dyn DefaultValueProvider>,
}

impl DefaultValueBehavior {
    pub fn new() -> Self {
        Self::with_provider(Arc::new(DefaultValues::new()))
    }

    pub fn with_provider(provider: Arc<dyn DefaultValueProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn DefaultValueProvider> {
        &self.provider
    }
}

impl Default for DefaultValueBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarBehavior for DefaultValueBehavior {
    fn applies_to(&self, _invocation: &MethodInvocation) -> bool {
        true
    }

    fn execute(&self, invocation: &MethodInvocation, _next: GetNext<'_>) -> AvatarResult<MethodReturn> {
        let method = invocation.method();
        let mut arguments = invocation.arguments().clone();
        for p in method.parameters().iter().filter(|p| p.is_out()) {
            arguments.set_value(p.position(), self.provider.default_value(p.ty()))?;
        }

        let value = if method.returns_void() {
            None
        } else {
            Some(self.provider.default_value(method.return_type()))
        };
        invocation.create_value_return(value, &arguments)
    }
}
