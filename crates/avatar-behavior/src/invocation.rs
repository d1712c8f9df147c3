//! `MethodInvocation` — the value object describing one in-flight call.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use avatar_core::{
    ArgumentCollection, AvatarError, AvatarResult, Exception, MethodSignature, Value, WeakObject,
};
use rustc_hash::FxHashSet;

use crate::{AvatarBehavior, BehaviorKind, GetNext, InvocationContext, MethodReturn};

/// The real implementation behind a proxy member.
///
/// Receives the invocation (possibly with overridden arguments) and a
/// [`GetNext`] that always fails with `NotSupported`: calling the base
/// implementation ends the pipeline.
pub type CallBase =
    Arc<dyn Fn(&MethodInvocation, GetNext<'_>) -> AvatarResult<MethodReturn> + Send + Sync>;

/// One call to a proxy member.
///
/// Created by proxy code for every call, consumed by the pipeline, then
/// dropped.  Two invocations are equal when they have the same target (by
/// identity), the same method and equal arguments; the context, skip set and
/// base implementation do not take part.
///
/// The target is held weakly, so recorded invocations never keep a proxy
/// alive.
#[derive(Clone)]
pub struct MethodInvocation {
    target:    WeakObject,
    method:    Arc<MethodSignature>,
    arguments: ArgumentCollection,
    context:   InvocationContext,
    skip:      FxHashSet<BehaviorKind>,
    call_base: Option<CallBase>,
}

impl MethodInvocation {
    /// Describe a call to `method` on `target` with positional `values`.
    ///
    /// Fails if the value count differs from the method's parameter count or
    /// any value does not fit its parameter.
    pub fn new(
        target: impl Into<WeakObject>,
        method: Arc<MethodSignature>,
        values: Vec<Value>,
    ) -> AvatarResult<Self> {
        let arguments = ArgumentCollection::for_method(&method, values)?;
        Ok(Self::from_parts(target.into(), method, arguments))
    }

    /// Describe a call with a pre-built argument collection.
    pub fn with_arguments(
        target:    impl Into<WeakObject>,
        method:    Arc<MethodSignature>,
        arguments: ArgumentCollection,
    ) -> AvatarResult<Self> {
        check_count(&method, &arguments)?;
        Ok(Self::from_parts(target.into(), method, arguments))
    }

    fn from_parts(target: WeakObject, method: Arc<MethodSignature>, arguments: ArgumentCollection) -> Self {
        Self {
            target,
            method,
            arguments,
            context:   InvocationContext::new(),
            skip:      FxHashSet::default(),
            call_base: None,
        }
    }

    /// Bind the real implementation invoked when no behavior answers the call.
    pub fn with_call_base<F>(mut self, call_base: F) -> Self
    where
        F: Fn(&MethodInvocation, GetNext<'_>) -> AvatarResult<MethodReturn> + Send + Sync + 'static,
    {
        self.call_base = Some(Arc::new(call_base));
        self
    }

    /// The same call with different arguments.
    ///
    /// Context, skip set and base implementation are carried over; the
    /// context stays shared with `self`.
    pub fn with_overridden_arguments(&self, arguments: ArgumentCollection) -> AvatarResult<Self> {
        check_count(&self.method, &arguments)?;
        Ok(Self { arguments, ..self.clone() })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn target(&self) -> &WeakObject {
        &self.target
    }

    #[inline]
    pub fn method(&self) -> &Arc<MethodSignature> {
        &self.method
    }

    #[inline]
    pub fn arguments(&self) -> &ArgumentCollection {
        &self.arguments
    }

    #[inline]
    pub fn arguments_mut(&mut self) -> &mut ArgumentCollection {
        &mut self.arguments
    }

    #[inline]
    pub fn context(&self) -> &InvocationContext {
        &self.context
    }

    /// Behavior kinds bypassed for this call only.
    #[inline]
    pub fn skip_behaviors(&self) -> &FxHashSet<BehaviorKind> {
        &self.skip
    }

    #[inline]
    pub fn skip_behaviors_mut(&mut self) -> &mut FxHashSet<BehaviorKind> {
        &mut self.skip
    }

    /// Bypass every behavior of type `B` for this call.
    pub fn skip<B: AvatarBehavior>(&mut self) -> &mut Self {
        self.skip.insert(BehaviorKind::of::<B>());
        self
    }

    #[inline]
    pub fn is_skipped(&self, kind: &BehaviorKind) -> bool {
        self.skip.contains(kind)
    }

    #[inline]
    pub fn has_call_base(&self) -> bool {
        self.call_base.is_some()
    }

    // ── Returns ───────────────────────────────────────────────────────────

    /// A normal return carrying `value` and the `ref`/`out` values of
    /// `arguments`.
    ///
    /// `value` must fit the method's return type; pass `None` for `void`.
    pub fn create_value_return(
        &self,
        value:     Option<Value>,
        arguments: &ArgumentCollection,
    ) -> AvatarResult<MethodReturn> {
        check_count(&self.method, arguments)?;
        let value = self.check_return_value(value)?;
        Ok(MethodReturn::from_value(value, arguments.outputs(), self.context.clone()))
    }

    /// A normal return whose outputs are this invocation's own arguments,
    /// so `ref` values pass through unchanged.
    pub fn create_return(&self, value: Option<Value>) -> AvatarResult<MethodReturn> {
        self.create_value_return(value, &self.arguments)
    }

    /// A return carrying `exception`; it has no value and no outputs.
    pub fn create_exception_return(&self, exception: impl Into<Exception>) -> MethodReturn {
        MethodReturn::from_exception(exception.into(), self.context.clone())
    }

    /// Run the bound base implementation, with this call's arguments or
    /// with `arguments` in their place.
    ///
    /// Fails with `NotImplemented` if no base implementation is bound.
    pub fn create_call_base_return(
        &self,
        arguments: Option<ArgumentCollection>,
    ) -> AvatarResult<MethodReturn> {
        let call_base = self.call_base.as_ref().ok_or_else(|| self.not_implemented())?;
        match arguments {
            None => call_base(self, GetNext::unsupported()),
            Some(arguments) => {
                let overridden = self.with_overridden_arguments(arguments)?;
                call_base(&overridden, GetNext::unsupported())
            }
        }
    }

    /// The error for a call that nothing could answer.
    pub fn not_implemented(&self) -> AvatarError {
        AvatarError::NotImplemented(format!("{self} on {}", self.target.type_key()))
    }

    fn check_return_value(&self, value: Option<Value>) -> AvatarResult<Option<Value>> {
        let expected = self.method.return_type();
        match value {
            None | Some(Value::Null) if self.method.returns_void() => Ok(None),
            None if expected.admits_null() => Ok(Some(Value::Null)),
            None => Err(AvatarError::NullValue {
                name:     "return value".to_string(),
                expected: expected.clone(),
            }),
            Some(v) if expected.accepts(&v) => Ok(Some(v)),
            Some(v) if v.is_null() => Err(AvatarError::NullValue {
                name:     "return value".to_string(),
                expected: expected.clone(),
            }),
            Some(v) => Err(AvatarError::TypeMismatch {
                name:     "return value".to_string(),
                expected: expected.clone(),
                actual:   v.type_name(),
            }),
        }
    }
}

fn check_count(method: &MethodSignature, arguments: &ArgumentCollection) -> AvatarResult<()> {
    if arguments.len() != method.parameter_count() {
        return Err(AvatarError::ArgumentCountMismatch {
            target:   method.to_string(),
            expected: method.parameter_count(),
            got:      arguments.len(),
        });
    }
    Ok(())
}

impl PartialEq for MethodInvocation {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.method == other.method
            && self.arguments == other.arguments
    }
}

impl Eq for MethodInvocation {}

impl Hash for MethodInvocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.method.hash(state);
        self.arguments.hash(state);
    }
}

impl fmt::Display for MethodInvocation {
    /// `Calculator.add(a: 3, b: 5)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.method.declaring_type(), self.method.name())?;
        let generics = self.method.generic_arguments();
        if !generics.is_empty() {
            let names: Vec<String> = generics.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", names.join(", "))?;
        }
        write!(f, "({})", self.arguments)
    }
}

impl fmt::Debug for MethodInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInvocation")
            .field("target", &self.target)
            .field("method", &self.method.to_string())
            .field("arguments", &self.arguments)
            .field("context", &self.context)
            .field("skip", &self.skip)
            .field("call_base", &self.call_base.is_some())
            .finish()
    }
}
