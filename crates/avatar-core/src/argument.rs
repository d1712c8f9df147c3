//! Argument holders and the per-call argument collection.
//!
//! # Design
//!
//! An [`Argument`] pairs a [`ParameterInfo`] with a boxed [`Value`] and never
//! holds a value its parameter's declared type would reject: every
//! constructor and setter runs the same assignability check.
//! [`TypedArgument<T>`] is the unboxed flavor for generated code that knows
//! the Rust type statically; it is checked once against the declared type and
//! boxed only when it joins a collection.
//!
//! An [`ArgumentCollection`] is the ordered set of arguments of one call (or,
//! via [`ArgumentCollection::outputs`], only the `ref`/`out` arguments of a
//! return).  Names are unique, so an index and a name always resolve to the
//! same element.  Lookups are linear: methods have a handful of parameters,
//! and a scan beats hashing at that size.

use std::fmt;

use crate::{
    AvatarError, AvatarResult, FromValue, MethodSignature, ParameterInfo, StaticType, Value,
    ValueType,
};

/// Reject `value` if `parameter` cannot hold it.
fn check_assignable(parameter: &ParameterInfo, value: &Value) -> AvatarResult<()> {
    if parameter.ty().accepts(value) {
        return Ok(());
    }
    if value.is_null() {
        Err(AvatarError::NullValue {
            name:     parameter.name().to_string(),
            expected: parameter.ty().clone(),
        })
    } else {
        Err(AvatarError::TypeMismatch {
            name:     parameter.name().to_string(),
            expected: parameter.ty().clone(),
            actual:   value.type_name(),
        })
    }
}

// ── Argument ──────────────────────────────────────────────────────────────────

/// A parameter bound to a boxed value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Argument {
    parameter: ParameterInfo,
    value:     Value,
}

impl Argument {
    pub fn new(parameter: ParameterInfo, value: impl Into<Value>) -> AvatarResult<Self> {
        let value = value.into();
        check_assignable(&parameter, &value)?;
        Ok(Self { parameter, value })
    }

    #[inline]
    pub fn parameter(&self) -> &ParameterInfo {
        &self.parameter
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> AvatarResult<()> {
        let value = value.into();
        check_assignable(&self.parameter, &value)?;
        self.value = value;
        Ok(())
    }

    /// The value as `T`; null is an error unless `T` is an `Option`.
    pub fn get<T: FromValue>(&self) -> AvatarResult<T> {
        T::from_value(&self.value).map_err(|e| e.into_error(self.name()))
    }

    /// The value as `T`, or `None` if it is null.
    pub fn get_nullable<T: FromValue>(&self) -> AvatarResult<Option<T>> {
        if self.value.is_null() {
            return Ok(None);
        }
        self.get::<T>().map(Some)
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.value)
    }
}

// ── TypedArgument ─────────────────────────────────────────────────────────────

/// A parameter bound to an unboxed `T`.
///
/// Construction fails unless `T`'s static type is assignable to the
/// parameter's declared type: an exact match, a parameter declared `Any`, or
/// `T?` for a `T`.  Dynamically typed values (`Value`, `ObjectRef`) are
/// checked by what they hold.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedArgument<T> {
    parameter: ParameterInfo,
    value:     T,
}

impl<T: StaticType + Into<Value>> TypedArgument<T> {
    pub fn new(parameter: ParameterInfo, value: T) -> AvatarResult<Self>
    where
        T: Clone,
    {
        let declared = parameter.ty();
        let actual = T::static_type();
        let assignable = *declared == actual
            || *declared == ValueType::Any
            || *declared == ValueType::nullable(actual.clone())
            || (actual == ValueType::Any && declared.accepts(&value.clone().into()));
        if !assignable {
            return Err(AvatarError::TypeMismatch {
                name:     parameter.name().to_string(),
                expected: declared.clone(),
                actual:   actual.to_string(),
            });
        }
        Ok(Self { parameter, value })
    }

    #[inline]
    pub fn parameter(&self) -> &ParameterInfo {
        &self.parameter
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Box the value.
    pub fn into_argument(self) -> Argument {
        Argument {
            parameter: self.parameter,
            value:     self.value.into(),
        }
    }
}

impl<T: StaticType + Into<Value>> From<TypedArgument<T>> for Argument {
    fn from(arg: TypedArgument<T>) -> Self {
        arg.into_argument()
    }
}

// ── ArgumentKey ───────────────────────────────────────────────────────────────

/// Something that addresses one argument: a position or a parameter name.
pub trait ArgumentKey {
    fn locate(&self, arguments: &[Argument]) -> AvatarResult<usize>;
}

impl ArgumentKey for usize {
    fn locate(&self, arguments: &[Argument]) -> AvatarResult<usize> {
        if *self < arguments.len() {
            Ok(*self)
        } else {
            Err(AvatarError::IndexOutOfRange { index: *self, len: arguments.len() })
        }
    }
}

impl ArgumentKey for &str {
    fn locate(&self, arguments: &[Argument]) -> AvatarResult<usize> {
        arguments
            .iter()
            .position(|a| a.name() == *self)
            .ok_or_else(|| AvatarError::ArgumentNotFound { name: self.to_string() })
    }
}

impl ArgumentKey for &String {
    fn locate(&self, arguments: &[Argument]) -> AvatarResult<usize> {
        self.as_str().locate(arguments)
    }
}

// ── ArgumentCollection ────────────────────────────────────────────────────────

/// The ordered, name-addressable arguments of one call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ArgumentCollection {
    arguments: Vec<Argument>,
}

impl ArgumentCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind `values` positionally to `parameters`.
    pub fn create(parameters: &[ParameterInfo], values: Vec<Value>) -> AvatarResult<Self> {
        bind(parameters, values, || "parameter list".to_string())
    }

    /// Bind `values` positionally to the parameters of `method`.
    pub fn for_method(method: &MethodSignature, values: Vec<Value>) -> AvatarResult<Self> {
        bind(method.parameters(), values, || method.to_string())
    }

    /// Collect already-built arguments, rejecting duplicate names.
    pub fn from_arguments(arguments: Vec<Argument>) -> AvatarResult<Self> {
        for (i, arg) in arguments.iter().enumerate() {
            if arguments[..i].iter().any(|a| a.name() == arg.name()) {
                return Err(AvatarError::DuplicateParameter { name: arg.name().to_string() });
            }
        }
        Ok(Self { arguments })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.arguments.iter()
    }

    /// Parameter descriptors in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.arguments.iter().map(Argument::parameter)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arguments.iter().any(|a| a.name() == name)
    }

    pub fn index_of(&self, key: impl ArgumentKey) -> AvatarResult<usize> {
        key.locate(&self.arguments)
    }

    pub fn argument(&self, key: impl ArgumentKey) -> AvatarResult<&Argument> {
        let index = key.locate(&self.arguments)?;
        Ok(&self.arguments[index])
    }

    pub fn parameter(&self, key: impl ArgumentKey) -> AvatarResult<&ParameterInfo> {
        self.argument(key).map(Argument::parameter)
    }

    pub fn value(&self, key: impl ArgumentKey) -> AvatarResult<&Value> {
        self.argument(key).map(Argument::value)
    }

    /// Replace one value; the new value must fit the parameter's type.
    pub fn set_value(&mut self, key: impl ArgumentKey, value: impl Into<Value>) -> AvatarResult<()> {
        let index = key.locate(&self.arguments)?;
        self.arguments[index].set_value(value)
    }

    pub fn get<T: FromValue>(&self, key: impl ArgumentKey) -> AvatarResult<T> {
        self.argument(key)?.get::<T>()
    }

    pub fn get_nullable<T: FromValue>(&self, key: impl ArgumentKey) -> AvatarResult<Option<T>> {
        self.argument(key)?.get_nullable::<T>()
    }

    /// A new collection holding only the `ref` and `out` arguments.
    pub fn outputs(&self) -> ArgumentCollection {
        Self {
            arguments: self
                .arguments
                .iter()
                .filter(|a| a.parameter().is_by_ref())
                .cloned()
                .collect(),
        }
    }

    /// All values in declaration order.
    pub fn values(&self) -> Vec<Value> {
        self.arguments.iter().map(|a| a.value().clone()).collect()
    }
}

fn bind(
    parameters: &[ParameterInfo],
    values:     Vec<Value>,
    target:     impl FnOnce() -> String,
) -> AvatarResult<ArgumentCollection> {
    if parameters.len() != values.len() {
        return Err(AvatarError::ArgumentCountMismatch {
            target:   target(),
            expected: parameters.len(),
            got:      values.len(),
        });
    }
    let arguments = parameters
        .iter()
        .zip(values)
        .map(|(p, v)| Argument::new(p.clone(), v))
        .collect::<AvatarResult<Vec<_>>>()?;
    ArgumentCollection::from_arguments(arguments)
}

impl<'a> IntoIterator for &'a ArgumentCollection {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.arguments.iter()
    }
}

impl fmt::Display for ArgumentCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}
