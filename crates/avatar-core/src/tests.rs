//! Unit tests for avatar-core.

use std::sync::Arc;

use crate::{ArgumentCollection, MethodSignature, ValueType};

// ── Helpers ───────────────────────────────────────────────────────────────────

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

fn mixed_args() -> ArgumentCollection {
    ArgumentCollection::for_method(&mixed_method(), vec![5.into(), "x".into(), 0.into()]).unwrap()
}

// ── TypeKey / ValueType ───────────────────────────────────────────────────────

#[cfg(test)]
mod type_tests {
    use crate::{ObjectRef, TypeKey, Value, ValueType};

    struct Widget;
    struct Gadget;

    #[test]
    fn type_key_identity_and_short_name() {
        assert_eq!(TypeKey::of::<Widget>(), TypeKey::of::<Widget>());
        assert_ne!(TypeKey::of::<Widget>(), TypeKey::of::<Gadget>());
        assert_eq!(TypeKey::of::<Widget>().short_name(), "Widget");
        assert_eq!(TypeKey::of::<Vec<i32>>().short_name(), "Vec<i32>");
    }

    #[test]
    fn value_types_reject_null() {
        assert!(!ValueType::I32.accepts(&Value::Null));
        assert!(!ValueType::Bool.accepts(&Value::Null));
        assert!(ValueType::nullable(ValueType::I32).accepts(&Value::Null));
        assert!(ValueType::nullable(ValueType::I32).accepts(&Value::I32(3)));
    }

    #[test]
    fn reference_types_admit_null() {
        assert!(ValueType::Str.accepts(&Value::Null));
        assert!(ValueType::Any.accepts(&Value::Null));
        assert!(ValueType::object::<Widget>().accepts(&Value::Null));
        assert!(ValueType::list(ValueType::I32).accepts(&Value::Null));
    }

    #[test]
    fn nullable_of_reference_type_is_unchanged() {
        assert_eq!(ValueType::nullable(ValueType::Str), ValueType::Str);
        let once = ValueType::nullable(ValueType::I64);
        assert_eq!(ValueType::nullable(once.clone()), once);
    }

    #[test]
    fn no_implicit_widening() {
        assert!(!ValueType::I64.accepts(&Value::I32(1)));
        assert!(!ValueType::F64.accepts(&Value::I32(1)));
    }

    #[test]
    fn objects_match_by_concrete_type() {
        let widget = Value::Object(ObjectRef::new(Widget));
        assert!(ValueType::object::<Widget>().accepts(&widget));
        assert!(!ValueType::object::<Gadget>().accepts(&widget));
        assert!(ValueType::Any.accepts(&widget));
    }

    #[test]
    fn lists_check_every_element() {
        let ty = ValueType::list(ValueType::I32);
        assert!(ty.accepts(&Value::from(vec![1, 2, 3])));
        assert!(!ty.accepts(&Value::List(vec![Value::I32(1), Value::Str("x".into())])));
    }

    #[test]
    fn display() {
        assert_eq!(ValueType::nullable(ValueType::I32).to_string(), "i32?");
        assert_eq!(ValueType::list(ValueType::Str).to_string(), "[string]");
        assert_eq!(ValueType::Unit.to_string(), "void");
    }
}

// ── Value / ObjectRef ─────────────────────────────────────────────────────────

#[cfg(test)]
mod value_tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::Arc;

    use crate::{ObjectRef, Value, WeakObject};

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn structural_equality_for_data() {
        assert_eq!(Value::from("a"), Value::Str("a".to_string()));
        assert_eq!(Value::from(vec![1, 2]), Value::from(vec![1, 2]));
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_eq!(hash_of(&Value::F64(1.5)), hash_of(&Value::F64(1.5)));
    }

    #[test]
    fn option_boxes_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(4)), Value::I32(4));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ObjectRef::new(7u8);
        let b = ObjectRef::new(7u8);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&a.clone()));
        assert_eq!(a.identity_hash(), a.clone().identity_hash());
    }

    #[test]
    fn downcast() {
        let obj = ObjectRef::new(String::from("hello"));
        assert_eq!(obj.downcast_ref::<String>().map(String::as_str), Some("hello"));
        assert!(obj.downcast::<u32>().is_none());
        assert_eq!(*obj.downcast::<String>().unwrap(), "hello");
    }

    #[test]
    fn weak_object_keeps_identity_after_drop() {
        let strong = Arc::new(42u64);
        let obj = ObjectRef::from_arc(Arc::clone(&strong));
        let weak = WeakObject::from(&obj);
        assert!(weak.is(&obj));
        assert_eq!(weak.identity_hash(), obj.identity_hash());
        assert_eq!(weak, WeakObject::from(&strong));

        drop(obj);
        drop(strong);
        assert!(weak.upgrade().is_none());
        assert_eq!(weak, weak.clone());
    }

    #[test]
    fn display() {
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
    }
}

// ── FromValue / StaticType ────────────────────────────────────────────────────

#[cfg(test)]
mod marshal_tests {
    use std::sync::Arc;

    use crate::{ConvertError, FromValue, StaticType, Value, ValueType};

    #[test]
    fn primitives() {
        assert_eq!(i32::from_value(&Value::I32(3)), Ok(3));
        assert_eq!(String::from_value(&Value::from("s")), Ok("s".to_string()));
        assert!(matches!(
            i32::from_value(&Value::from("s")),
            Err(ConvertError::Mismatch { expected: ValueType::I32, .. })
        ));
    }

    #[test]
    fn null_into_plain_type_fails() {
        assert_eq!(
            i32::from_value(&Value::Null),
            Err(ConvertError::Null { expected: ValueType::I32 })
        );
    }

    #[test]
    fn option_tolerates_null() {
        assert_eq!(Option::<i32>::from_value(&Value::Null), Ok(None));
        assert_eq!(Option::<i32>::from_value(&Value::I32(1)), Ok(Some(1)));
        assert_eq!(Option::<i32>::static_type(), ValueType::nullable(ValueType::I32));
        assert_eq!(Option::<String>::static_type(), ValueType::Str);
    }

    #[test]
    fn lists_and_objects() {
        let list = Value::from(vec![1, 2, 3]);
        assert_eq!(Vec::<i32>::from_value(&list), Ok(vec![1, 2, 3]));

        let obj = Value::from(Arc::new(9u16));
        assert_eq!(*Arc::<u16>::from_value(&obj).unwrap(), 9);
        assert!(Arc::<u32>::from_value(&obj).is_err());
    }

    #[test]
    fn unit_reads_only_null() {
        assert_eq!(<()>::from_value(&Value::Null), Ok(()));
        assert!(<()>::from_value(&Value::I32(0)).is_err());
    }
}

// ── MethodSignature ───────────────────────────────────────────────────────────

#[cfg(test)]
mod method_tests {
    use super::*;
    use crate::{AvatarError, Direction};

    #[test]
    fn builder_assigns_positions_and_directions() {
        let m = mixed_method();
        let dirs: Vec<Direction> = m.parameters().iter().map(|p| p.direction()).collect();
        assert_eq!(dirs, vec![Direction::In, Direction::Ref, Direction::Out]);
        let positions: Vec<usize> = m.parameters().iter().map(|p| p.position()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(!m.returns_void());
    }

    #[test]
    fn duplicate_parameter_names_rejected() {
        let result = MethodSignature::builder("T", "m")
            .param("a", ValueType::I32)
            .param("a", ValueType::I32)
            .build();
        assert!(matches!(result, Err(AvatarError::DuplicateParameter { name }) if name == "a"));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(*mixed_method(), *mixed_method());
        let other = MethodSignature::builder("Calculator", "try_add").build().unwrap();
        assert_ne!(*mixed_method(), *other);
    }

    #[test]
    fn display() {
        assert_eq!(
            mixed_method().to_string(),
            "Calculator.try_add(i32 a, ref string b, out i32 c) -> bool"
        );
        let generic = MethodSignature::builder("Box", "get")
            .generic(ValueType::I32)
            .returns(ValueType::I32)
            .build()
            .unwrap();
        assert_eq!(generic.to_string(), "Box.get<i32>() -> i32");
    }
}

// ── Argument / TypedArgument ──────────────────────────────────────────────────

#[cfg(test)]
mod argument_tests {
    use crate::{Argument, AvatarError, Direction, ParameterInfo, TypedArgument, Value, ValueType};

    fn int_param() -> ParameterInfo {
        ParameterInfo::new("n", ValueType::I32, Direction::In, 0)
    }

    #[test]
    fn construction_is_type_checked() {
        assert!(Argument::new(int_param(), 3).is_ok());
        assert!(matches!(
            Argument::new(int_param(), "three"),
            Err(AvatarError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Argument::new(int_param(), Value::Null),
            Err(AvatarError::NullValue { .. })
        ));
    }

    #[test]
    fn set_value_is_type_checked() {
        let mut arg = Argument::new(int_param(), 3).unwrap();
        assert!(arg.set_value(4i64).is_err());
        assert_eq!(arg.value(), &Value::I32(3));
        arg.set_value(4).unwrap();
        assert_eq!(arg.get::<i32>().unwrap(), 4);
    }

    #[test]
    fn by_ref_checks_element_type() {
        let p = ParameterInfo::new("r", ValueType::Str, Direction::Ref, 0);
        assert!(Argument::new(p.clone(), "s").is_ok());
        assert!(Argument::new(p, 1).is_err());
    }

    #[test]
    fn get_nullable_tolerates_null() {
        let p = ParameterInfo::new("z", ValueType::nullable(ValueType::I32), Direction::Out, 0);
        let arg = Argument::new(p, Value::Null).unwrap();
        assert_eq!(arg.get_nullable::<i32>().unwrap(), None);
        assert!(matches!(arg.get::<i32>(), Err(AvatarError::NullValue { .. })));
        assert_eq!(arg.get::<Option<i32>>().unwrap(), None);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Argument::new(int_param(), 1).unwrap(), Argument::new(int_param(), 1).unwrap());
        assert_ne!(Argument::new(int_param(), 1).unwrap(), Argument::new(int_param(), 2).unwrap());
    }

    #[test]
    fn typed_argument_matches_declared_type() {
        let typed = TypedArgument::new(int_param(), 5i32).unwrap();
        assert_eq!(*typed.value(), 5);
        assert_eq!(Argument::from(typed), Argument::new(int_param(), 5).unwrap());

        assert!(TypedArgument::new(int_param(), 5i64).is_err());
        assert!(TypedArgument::new(int_param(), Some(5i32)).is_err());

        let any = ParameterInfo::new("o", ValueType::Any, Direction::In, 0);
        assert!(TypedArgument::new(any, String::from("s")).is_ok());
    }

    #[test]
    fn typed_argument_accepts_assignable_types() {
        let optional = ParameterInfo::new("z", ValueType::nullable(ValueType::I32), Direction::In, 0);
        let typed = TypedArgument::new(optional.clone(), 5i32).unwrap();
        assert_eq!(Argument::from(typed), Argument::new(optional, 5).unwrap());

        struct Widget;
        struct Gadget;
        let widget = ParameterInfo::new("w", ValueType::object::<Widget>(), Direction::In, 0);
        assert!(TypedArgument::new(widget.clone(), crate::ObjectRef::new(Widget)).is_ok());
        assert!(matches!(
            TypedArgument::new(widget, crate::ObjectRef::new(Gadget)),
            Err(AvatarError::TypeMismatch { .. })
        ));
    }
}

// ── ArgumentCollection ────────────────────────────────────────────────────────

#[cfg(test)]
mod collection_tests {
    use super::*;
    use crate::{AvatarError, Value};

    #[test]
    fn count_mismatch() {
        let result = ArgumentCollection::for_method(&mixed_method(), vec![1.into()]);
        assert!(matches!(
            result,
            Err(AvatarError::ArgumentCountMismatch { expected: 3, got: 1, .. })
        ));
    }

    #[test]
    fn index_and_name_agree() {
        let args = mixed_args();
        for (i, p) in mixed_method().parameters().iter().enumerate() {
            assert_eq!(args.parameter(i).unwrap(), args.parameter(p.name()).unwrap());
            assert_eq!(args.index_of(p.name()).unwrap(), i);
        }
    }

    #[test]
    fn lookup_failures_are_distinct() {
        let args = mixed_args();
        assert!(matches!(args.value("nope"), Err(AvatarError::ArgumentNotFound { .. })));
        assert!(matches!(
            args.value(7usize),
            Err(AvatarError::IndexOutOfRange { index: 7, len: 3 })
        ));
        let mut args = args;
        assert!(matches!(
            args.set_value("nope", 1),
            Err(AvatarError::ArgumentNotFound { .. })
        ));
    }

    #[test]
    fn set_by_name_and_index() {
        let mut args = mixed_args();
        args.set_value("b", "y").unwrap();
        args.set_value(2usize, 42).unwrap();
        assert_eq!(args.get::<String>("b").unwrap(), "y");
        assert_eq!(args.get::<i32>(2usize).unwrap(), 42);
        assert!(matches!(args.set_value("a", "wrong"), Err(AvatarError::TypeMismatch { .. })));
    }

    #[test]
    fn typed_get_errors() {
        let args = mixed_args();
        assert!(matches!(args.get::<bool>("a"), Err(AvatarError::TypeMismatch { .. })));
        let mut args = args;
        args.set_value("b", Value::Null).unwrap();
        assert!(matches!(args.get::<String>("b"), Err(AvatarError::NullValue { .. })));
        assert_eq!(args.get_nullable::<String>("b").unwrap(), None);
    }

    #[test]
    fn outputs_keep_only_ref_and_out() {
        let outputs = mixed_args().outputs();
        let names: Vec<&str> = outputs.parameters().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn equality_in_order() {
        assert_eq!(mixed_args(), mixed_args());
        let mut changed = mixed_args();
        changed.set_value("a", 6).unwrap();
        assert_ne!(mixed_args(), changed);
    }

    #[test]
    fn display() {
        assert_eq!(mixed_args().to_string(), "a: 5, b: \"x\", c: 0");
    }
}
