//! Identity-based `hash_code` / `equals` for proxies.

use std::sync::Arc;

use avatar_core::{AvatarResult, MethodSignature, Value, ValueType};

use crate::{AvatarBehavior, GetNext, MethodInvocation, MethodReturn};

const HASH_CODE: &str = "hash_code";
const EQUALS: &str = "equals";

/// `i32 <declaring_type>.hash_code()`
pub fn hash_code_method(declaring_type: impl Into<String>) -> AvatarResult<Arc<MethodSignature>> {
    MethodSignature::builder(declaring_type, HASH_CODE)
        .returns(ValueType::I32)
        .build()
}

/// `bool <declaring_type>.equals(any other)`
pub fn equals_method(declaring_type: impl Into<String>) -> AvatarResult<Arc<MethodSignature>> {
    MethodSignature::builder(declaring_type, EQUALS)
        .param("other", ValueType::Any)
        .returns(ValueType::Bool)
        .build()
}

/// Gives proxies reference semantics for `hash_code` and `equals`.
///
/// - `hash_code()` returns the identity hash of the invocation's target.
/// - `equals(other)` is `true` only if `other` is the target itself.
///
/// Applies to no other method, including same-named methods with other
/// return types.
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultEqualityBehavior;

fn is_hash_code(method: &MethodSignature) -> bool {
    method.name() == HASH_CODE
        && method.parameter_count() == 0
        && *method.return_type() == ValueType::I32
}

fn is_equals(method: &MethodSignature) -> bool {
    method.name() == EQUALS
        && method.parameter_count() == 1
        && *method.return_type() == ValueType::Bool
}

impl AvatarBehavior for DefaultEqualityBehavior {
    fn applies_to(&self, invocation: &MethodInvocation) -> bool {
        let method = invocation.method();
        is_hash_code(method) || is_equals(method)
    }

    fn execute(&self, invocation: &MethodInvocation, next: GetNext<'_>) -> AvatarResult<MethodReturn> {
        let method = invocation.method();
        if is_hash_code(method) {
            let hash = invocation.target().identity_hash();
            invocation.create_return(Some(Value::I32(hash)))
        } else if is_equals(method) {
            let same = invocation
                .arguments()
                .value(0usize)?
                .as_object()
                .is_some_and(|other| invocation.target().is(other));
            invocation.create_return(Some(Value::Bool(same)))
        } else {
            next.proceed(invocation)
        }
    }
}
