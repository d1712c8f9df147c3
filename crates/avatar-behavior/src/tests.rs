//! Unit tests for avatar-behavior.

use std::sync::Arc;

use avatar_core::{MethodSignature, ObjectRef, Value, ValueType};

use crate::{BehaviorRef, GetNext, MethodInvocation};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Calculator;

/// `bool Calculator.try_add(i32 a, ref string b, out i32 c)`
fn mixed_method() -> Arc<MethodSignature> {
    MethodSignature::builder("Calculator", "try_add")
        .param("a", ValueType::I32)
        .ref_param("b", ValueType::Str)
        .out_param("c", ValueType::I32)
        .returns(ValueType::Bool)
        .build()
        .unwrap()
}

/// `i32 Calculator.add(i32 x, i32 y)`
fn add_method() -> Arc<MethodSignature> {
    MethodSignature::builder("Calculator", "add")
        .param("x", ValueType::I32)
        .param("y", ValueType::I32)
        .returns(ValueType::I32)
        .build()
        .unwrap()
}

fn add(target: &ObjectRef, x: i32, y: i32) -> MethodInvocation {
    MethodInvocation::new(target, add_method(), vec![x.into(), y.into()]).unwrap()
}

/// Run `behaviors` the way a pipeline would, from the front of the slice.
fn dispatch(behaviors: &[BehaviorRef], invocation: &MethodInvocation) -> avatar_core::AvatarResult<crate::MethodReturn> {
    GetNext::chain(behaviors, 0).proceed(invocation)
}

// ── MethodInvocation ──────────────────────────────────────────────────────────

#[cfg(test)]
mod invocation_tests {
    use avatar_core::{ArgumentCollection, AvatarError};

    use super::*;

    #[test]
    fn argument_count_checked_at_construction() {
        let target = ObjectRef::new(Calculator);
        let result = MethodInvocation::new(&target, add_method(), vec![1.into()]);
        assert!(matches!(
            result,
            Err(AvatarError::ArgumentCountMismatch { expected: 2, got: 1, .. })
        ));

        let three = ArgumentCollection::for_method(&mixed_method(), vec![1.into(), "s".into(), 0.into()])
            .unwrap();
        assert!(MethodInvocation::with_arguments(&target, add_method(), three).is_err());
    }

    #[test]
    fn argument_types_checked_at_construction() {
        let target = ObjectRef::new(Calculator);
        let result = MethodInvocation::new(&target, add_method(), vec![1.into(), "two".into()]);
        assert!(matches!(result, Err(AvatarError::TypeMismatch { name, .. }) if name == "y"));
    }

    #[test]
    fn equal_when_target_method_and_arguments_match() {
        let target = ObjectRef::new(Calculator);
        let a = add(&target, 1, 2);
        let b = add(&target, 1, 2);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));

        assert_ne!(a, add(&target, 1, 3));
        let other = ObjectRef::new(Calculator);
        assert_ne!(a, add(&other, 1, 2));
    }

    #[test]
    fn context_and_skip_set_do_not_affect_equality() {
        let target = ObjectRef::new(Calculator);
        let a = add(&target, 1, 2);
        let mut b = add(&target, 1, 2);
        b.context().insert("k", 1);
        b.skip::<crate::RecordingBehavior>();
        assert_eq!(a, b);
    }

    #[test]
    fn display_names_method_and_arguments() {
        let target = ObjectRef::new(Calculator);
        assert_eq!(add(&target, 3, 5).to_string(), "Calculator.add(x: 3, y: 5)");
    }

    #[test]
    fn not_implemented_names_invocation_and_target() {
        let target = ObjectRef::new(Calculator);
        let err = add(&target, 3, 5).not_implemented();
        assert!(err.is_not_implemented());
        let message = err.to_string();
        assert!(message.contains("Calculator.add(x: 3, y: 5)"), "{message}");
        assert!(message.contains("on Calculator"), "{message}");
    }
}

// ── Returns ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod return_tests {
    use avatar_core::{AvatarError, Exception};

    use super::*;

    fn mixed(target: &ObjectRef) -> MethodInvocation {
        MethodInvocation::new(target, mixed_method(), vec![5.into(), "x".into(), 0.into()]).unwrap()
    }

    #[test]
    fn value_return_copies_only_ref_and_out_arguments() {
        let target = ObjectRef::new(Calculator);
        let invocation = mixed(&target);

        let mut updated = invocation.arguments().clone();
        updated.set_value("b", "y").unwrap();
        updated.set_value("c", 42).unwrap();

        let ret = invocation.create_value_return(Some(true.into()), &updated).unwrap();
        assert_eq!(ret.return_value(), Some(&Value::Bool(true)));
        let names: Vec<&str> = ret.outputs().parameters().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(ret.outputs().get::<String>("b").unwrap(), "y");
        assert_eq!(ret.outputs().get::<i32>("c").unwrap(), 42);
        assert!(ret.outputs().value("a").is_err());
    }

    #[test]
    fn create_return_passes_ref_values_through_unchanged() {
        let target = ObjectRef::new(Calculator);
        let ret = mixed(&target).create_return(Some(false.into())).unwrap();
        assert_eq!(ret.outputs().get::<String>("b").unwrap(), "x");
        assert_eq!(ret.outputs().get::<i32>("c").unwrap(), 0);
    }

    #[test]
    fn return_value_is_type_checked() {
        let target = ObjectRef::new(Calculator);
        let invocation = mixed(&target);
        assert!(matches!(
            invocation.create_return(Some("nope".into())),
            Err(AvatarError::TypeMismatch { .. })
        ));
        assert!(matches!(invocation.create_return(None), Err(AvatarError::NullValue { .. })));
    }

    #[test]
    fn void_methods_have_no_return_value() {
        let target = ObjectRef::new(Calculator);
        let clear = MethodSignature::builder("Calculator", "clear").build().unwrap();
        let invocation = MethodInvocation::new(&target, clear, vec![]).unwrap();
        let ret = invocation.create_return(None).unwrap();
        assert!(ret.return_value().is_none());
        ret.get::<()>().unwrap();
        assert!(invocation.create_return(Some(1.into())).is_err());
    }

    #[test]
    fn exception_return_has_no_value_or_outputs() {
        let target = ObjectRef::new(Calculator);
        let invocation = mixed(&target);
        let boom = Exception::msg("boom");
        let ret = invocation.create_exception_return(boom.clone());
        assert!(ret.is_exception());
        assert!(ret.exception().unwrap().ptr_eq(&boom));
        assert!(ret.return_value().is_none());
        assert!(ret.outputs().is_empty());
        assert!(matches!(ret.get::<bool>(), Err(AvatarError::Exception(e)) if e.ptr_eq(&boom)));
        assert_eq!(ret.to_string(), "=> !boom");
    }

    #[test]
    fn returns_share_the_invocation_context() {
        let target = ObjectRef::new(Calculator);
        let invocation = mixed(&target);
        let ret = invocation.create_return(Some(true.into())).unwrap();
        assert!(ret.context().ptr_eq(invocation.context()));
        invocation.context().insert("seen", true);
        assert_eq!(ret.context().get_as::<bool>("seen").unwrap(), Some(true));
    }

    #[test]
    fn display() {
        let target = ObjectRef::new(Calculator);
        let ret = mixed(&target).create_return(Some(true.into())).unwrap();
        assert_eq!(ret.to_string(), "=> true (b: \"x\", c: 0)");
    }
}

// ── Call base ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod call_base_tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use avatar_core::AvatarError;

    use super::*;

    fn with_base(target: &ObjectRef, x: i32, y: i32) -> MethodInvocation {
        add(target, x, y).with_call_base(|inv, _next| {
            let x = inv.arguments().get::<i32>("x")?;
            let y = inv.arguments().get::<i32>("y")?;
            inv.create_return(Some((x + y).into()))
        })
    }

    #[test]
    fn without_base_is_not_implemented() {
        let target = ObjectRef::new(Calculator);
        let result = add(&target, 1, 2).create_call_base_return(None);
        assert!(matches!(result, Err(AvatarError::NotImplemented(_))));
    }

    #[test]
    fn runs_base_with_original_arguments() {
        let target = ObjectRef::new(Calculator);
        let ret = with_base(&target, 2, 3).create_call_base_return(None).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), 5);
    }

    #[test]
    fn runs_base_with_overridden_arguments() {
        let target = ObjectRef::new(Calculator);
        let invocation = with_base(&target, 2, 3);
        let mut args = invocation.arguments().clone();
        args.set_value("y", 10).unwrap();
        let ret = invocation.create_call_base_return(Some(args)).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), 12);
    }

    #[test]
    fn base_cannot_ask_for_next() {
        let target = ObjectRef::new(Calculator);
        let asked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&asked);
        let invocation = add(&target, 1, 1).with_call_base(move |inv, next| {
            flag.store(true, Ordering::SeqCst);
            next.proceed(inv)
        });
        let result = invocation.create_call_base_return(None);
        assert!(asked.load(Ordering::SeqCst));
        assert!(matches!(result, Err(AvatarError::NotSupported(_))));
    }
}

// ── Dispatch cursor ───────────────────────────────────────────────────────────

#[cfg(test)]
mod next_tests {
    use avatar_core::AvatarError;

    use super::*;
    use crate::{AnonymousBehavior, AvatarBehavior, BehaviorKind, RecordingBehavior};

    fn constant(n: i32) -> BehaviorRef {
        Arc::new(AnonymousBehavior::new(move |inv, _| inv.create_return(Some(n.into()))))
    }

    fn declining() -> BehaviorRef {
        Arc::new(AnonymousBehavior::new(|inv, _| inv.create_return(Some((-1).into()))).applies_when(|_| false))
    }

    #[test]
    fn empty_slice_without_base_is_not_implemented() {
        let target = ObjectRef::new(Calculator);
        let result = dispatch(&[], &add(&target, 1, 2));
        assert!(matches!(result, Err(AvatarError::NotImplemented(_))));
    }

    #[test]
    fn first_applicable_behavior_wins() {
        let target = ObjectRef::new(Calculator);
        let behaviors = vec![declining(), constant(7), constant(8)];
        let ret = dispatch(&behaviors, &add(&target, 1, 2)).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), 7);
    }

    #[test]
    fn next_reports_the_resolved_behavior() {
        let target = ObjectRef::new(Calculator);
        let behaviors = vec![declining(), constant(7)];
        let invocation = add(&target, 1, 2);

        let step = GetNext::chain(&behaviors, 0).next(&invocation).unwrap();
        assert!(Arc::ptr_eq(step.behavior().unwrap(), &behaviors[1]));

        let end = GetNext::chain(&behaviors, 2).next(&invocation).unwrap();
        assert!(end.is_terminal());
        assert!(end.behavior().is_none());
    }

    #[test]
    fn skip_set_excludes_a_kind() {
        let target = ObjectRef::new(Calculator);
        let recorder = Arc::new(RecordingBehavior::new());
        let behaviors: Vec<BehaviorRef> = vec![recorder.clone(), constant(3)];

        let mut invocation = add(&target, 1, 2);
        invocation.skip_behaviors_mut().insert(BehaviorKind::of::<RecordingBehavior>());
        dispatch(&behaviors, &invocation).unwrap();
        assert!(recorder.is_empty());

        dispatch(&behaviors, &add(&target, 1, 2)).unwrap();
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn kind_and_name_default_to_the_concrete_type() {
        let recorder = RecordingBehavior::new();
        assert_eq!(recorder.kind(), BehaviorKind::of::<RecordingBehavior>());
        assert_eq!(AvatarBehavior::name(&recorder), "RecordingBehavior");
        let anon = AnonymousBehavior::new(|inv, next| next.proceed(inv)).named("passthrough");
        assert_eq!(AvatarBehavior::name(&anon), "passthrough");
    }
}

// ── Built-in behaviors ────────────────────────────────────────────────────────

#[cfg(test)]
mod builtin_tests {
    use super::*;
    use crate::{
        AnonymousBehavior, AvatarBehavior, DefaultEqualityBehavior, DefaultValueBehavior,
        DefaultValueProvider, DefaultValues, RecordingBehavior, equals_method, hash_code_method,
    };

    /// `bool Calculator.try_add(i32 x, i32 y, out i32? z)`
    fn try_add_method() -> Arc<MethodSignature> {
        MethodSignature::builder("Calculator", "try_add")
            .param("x", ValueType::I32)
            .param("y", ValueType::I32)
            .out_param("z", ValueType::nullable(ValueType::I32))
            .returns(ValueType::Bool)
            .build()
            .unwrap()
    }

    #[test]
    fn default_value_fills_return_and_out_parameters() {
        let target = ObjectRef::new(Calculator);
        let invocation = MethodInvocation::new(&target, try_add_method(), vec![1.into(), 2.into(), 5.into()])
            .unwrap()
            .with_call_base(|_, _| panic!("base must not be consulted"));
        let behaviors: Vec<BehaviorRef> = vec![Arc::new(DefaultValueBehavior::new())];

        let ret = dispatch(&behaviors, &invocation).unwrap();
        assert_eq!(ret.get::<bool>().unwrap(), false);
        assert_eq!(ret.outputs().get_nullable::<i32>("z").unwrap(), None);
    }

    #[test]
    fn default_value_leaves_ref_parameters_alone() {
        let target = ObjectRef::new(Calculator);
        let invocation =
            MethodInvocation::new(&target, mixed_method(), vec![1.into(), "keep".into(), 9.into()]).unwrap();
        let behaviors: Vec<BehaviorRef> = vec![Arc::new(DefaultValueBehavior::new())];

        let ret = dispatch(&behaviors, &invocation).unwrap();
        assert_eq!(ret.outputs().get::<String>("b").unwrap(), "keep");
        assert_eq!(ret.outputs().get::<i32>("c").unwrap(), 0);
    }

    #[test]
    fn default_values_builtins_and_registration() {
        let mut defaults = DefaultValues::new();
        assert_eq!(defaults.default_value(&ValueType::I64), Value::I64(0));
        assert_eq!(defaults.default_value(&ValueType::Str), Value::Str(String::new()));
        assert_eq!(defaults.default_value(&ValueType::list(ValueType::I32)), Value::List(vec![]));
        assert_eq!(defaults.default_value(&ValueType::Any), Value::Null);

        defaults.register(ValueType::I32, |_| Value::I32(-1));
        assert_eq!(defaults.default_value(&ValueType::I32), Value::I32(-1));
        assert!(defaults.deregister(&ValueType::I32));
        assert!(!defaults.deregister(&ValueType::I32));
        assert_eq!(defaults.default_value(&ValueType::I32), Value::I32(0));
    }

    #[test]
    fn default_value_uses_custom_provider() {
        let target = ObjectRef::new(Calculator);
        let provider = DefaultValues::new().with(ValueType::I32, |_| Value::I32(99));
        let behaviors: Vec<BehaviorRef> =
            vec![Arc::new(DefaultValueBehavior::with_provider(Arc::new(provider)))];
        let ret = dispatch(&behaviors, &add(&target, 1, 2)).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), 99);
    }

    #[test]
    fn recording_logs_invocation_and_result_in_order() {
        let target = ObjectRef::new(Calculator);
        let recorder = Arc::new(RecordingBehavior::new());
        let behaviors: Vec<BehaviorRef> = vec![recorder.clone(), Arc::new(DefaultValueBehavior::new())];

        dispatch(&behaviors, &add(&target, 1, 2)).unwrap();
        dispatch(&behaviors, &add(&target, 3, 4)).unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].invocation, add(&target, 1, 2));
        assert_eq!(calls[1].result.get::<i32>().unwrap(), 0);

        let summaries = recorder.summaries();
        assert_eq!(summaries[1].invocation, "Calculator.add(x: 3, y: 4)");
        assert_eq!(summaries[1].outcome, "=> 0");

        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn recording_does_not_alter_the_result() {
        let target = ObjectRef::new(Calculator);
        let recorder: BehaviorRef = Arc::new(RecordingBehavior::new());
        let invocation = add(&target, 2, 2).with_call_base(|inv, _| inv.create_return(Some(4.into())));
        let ret = dispatch(&[recorder], &invocation).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), 4);
    }

    #[test]
    fn equality_hash_code_is_target_identity() {
        let target = ObjectRef::new(Calculator);
        let behaviors: Vec<BehaviorRef> = vec![Arc::new(DefaultEqualityBehavior)];
        let hash = hash_code_method("Calculator").unwrap();

        let ret = dispatch(&behaviors, &MethodInvocation::new(&target, hash.clone(), vec![]).unwrap()).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), target.identity_hash());

        let other = ObjectRef::new(Calculator);
        let ret = dispatch(&behaviors, &MethodInvocation::new(&other, hash, vec![]).unwrap()).unwrap();
        assert_eq!(ret.get::<i32>().unwrap(), other.identity_hash());
    }

    #[test]
    fn equality_equals_is_reference_identity() {
        let target = ObjectRef::new(Calculator);
        let other = ObjectRef::new(Calculator);
        let behaviors: Vec<BehaviorRef> = vec![Arc::new(DefaultEqualityBehavior)];
        let equals = equals_method("Calculator").unwrap();

        let same = MethodInvocation::new(&target, equals.clone(), vec![target.clone().into()]).unwrap();
        assert!(dispatch(&behaviors, &same).unwrap().get::<bool>().unwrap());

        let different = MethodInvocation::new(&target, equals.clone(), vec![other.into()]).unwrap();
        assert!(!dispatch(&behaviors, &different).unwrap().get::<bool>().unwrap());

        let null = MethodInvocation::new(&target, equals, vec![Value::Null]).unwrap();
        assert!(!dispatch(&behaviors, &null).unwrap().get::<bool>().unwrap());
    }

    #[test]
    fn equality_ignores_other_methods() {
        let target = ObjectRef::new(Calculator);
        let equality = DefaultEqualityBehavior;
        assert!(!equality.applies_to(&add(&target, 1, 2)));
        let behaviors: Vec<BehaviorRef> = vec![Arc::new(equality)];
        assert!(dispatch(&behaviors, &add(&target, 1, 2)).unwrap_err().is_not_implemented());
    }

    #[test]
    fn equality_skips_same_named_methods_with_other_return_types() {
        let target = ObjectRef::new(Calculator);
        let wide_hash = MethodSignature::builder("Calculator", "hash_code")
            .returns(ValueType::I64)
            .build()
            .unwrap();
        let fuzzy_equals = MethodSignature::builder("Calculator", "equals")
            .param("other", ValueType::Any)
            .returns(ValueType::I32)
            .build()
            .unwrap();

        let answer = AnonymousBehavior::new(|inv, _| inv.create_return(Some(Value::I64(7))));
        let behaviors: Vec<BehaviorRef> = vec![Arc::new(DefaultEqualityBehavior), Arc::new(answer)];
        let hash = MethodInvocation::new(&target, wide_hash, vec![]).unwrap();
        assert!(!DefaultEqualityBehavior.applies_to(&hash));
        assert_eq!(dispatch(&behaviors, &hash).unwrap().get::<i64>().unwrap(), 7);

        let equals = MethodInvocation::new(&target, fuzzy_equals, vec![target.clone().into()]).unwrap();
        assert!(!DefaultEqualityBehavior.applies_to(&equals));
        assert!(dispatch(&[Arc::new(DefaultEqualityBehavior) as BehaviorRef], &equals)
            .unwrap_err()
            .is_not_implemented());
    }
}

// ── InvocationContext ─────────────────────────────────────────────────────────

#[cfg(test)]
mod context_tests {
    use crate::InvocationContext;

    #[test]
    fn clones_share_entries() {
        let ctx = InvocationContext::new();
        let shared = ctx.clone();
        shared.insert("k", 1);
        assert!(ctx.contains_key("k"));
        assert_eq!(ctx.get_as::<i32>("k").unwrap(), Some(1));
        assert!(ctx.get_as::<String>("k").is_err());
        assert_eq!(ctx.get_as::<i32>("missing").unwrap(), None);
        assert_eq!(ctx.remove("k"), Some(1.into()));
        assert!(shared.is_empty());
    }
}
