//! Method identity: parameters, directions and signatures.
//!
//! A proxy builds one [`MethodSignature`] per member, typically once, and
//! shares it as `Arc<MethodSignature>` across every invocation of that member.
//! Signatures are plain values with structural equality, so two proxies that
//! describe the same member the same way produce equal invocations.

use std::fmt;
use std::sync::Arc;

use crate::{AvatarError, AvatarResult, ValueType};

// ── Direction ─────────────────────────────────────────────────────────────────

/// How a parameter is passed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// By value; changes made by the callee are not observed by the caller.
    #[default]
    In,
    /// By reference; the caller's value is read and may be replaced.
    Ref,
    /// Output only; the callee must supply the value.
    Out,
}

impl Direction {
    /// `true` for `Ref` and `Out`: the parameters copied into a return's outputs.
    #[inline]
    pub fn is_by_ref(self) -> bool {
        !matches!(self, Direction::In)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Ref => f.write_str("ref"),
            Direction::Out => f.write_str("out"),
        }
    }
}

// ── ParameterInfo ─────────────────────────────────────────────────────────────

/// One parameter of a method signature.
///
/// `ty` is always the element type; a `ref i32` parameter has `ty == I32` and
/// `direction == Ref`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterInfo {
    name:      Arc<str>,
    ty:        ValueType,
    direction: Direction,
    position:  usize,
}

impl ParameterInfo {
    pub fn new(
        name:      impl Into<Arc<str>>,
        ty:        ValueType,
        direction: Direction,
        position:  usize,
    ) -> Self {
        Self { name: name.into(), ty, direction, position }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_out(&self) -> bool {
        self.direction == Direction::Out
    }

    #[inline]
    pub fn is_by_ref(&self) -> bool {
        self.direction.is_by_ref()
    }
}

impl fmt::Display for ParameterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::In => write!(f, "{} {}", self.ty, self.name),
            dir => write!(f, "{dir} {} {}", self.ty, self.name),
        }
    }
}

// ── MethodSignature ───────────────────────────────────────────────────────────

/// Identity of an intercepted method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    declaring_type:    String,
    name:              String,
    parameters:        Vec<ParameterInfo>,
    return_type:       ValueType,
    generic_arguments: Vec<ValueType>,
}

impl MethodSignature {
    /// Start describing `declaring_type::name`.
    pub fn builder(declaring_type: impl Into<String>, name: impl Into<String>) -> MethodBuilder {
        MethodBuilder {
            declaring_type:    declaring_type.into(),
            name:              name.into(),
            parameters:        Vec::new(),
            return_type:       ValueType::Unit,
            generic_arguments: Vec::new(),
        }
    }

    #[inline]
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    #[inline]
    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    #[inline]
    pub fn returns_void(&self) -> bool {
        self.return_type == ValueType::Unit
    }

    /// Type arguments of a generic method instantiation; empty otherwise.
    #[inline]
    pub fn generic_arguments(&self) -> &[ValueType] {
        &self.generic_arguments
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        write_generics(f, &self.generic_arguments)?;
        f.write_str("(")?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")?;
        if !self.returns_void() {
            write!(f, " -> {}", self.return_type)?;
        }
        Ok(())
    }
}

/// Write `<A, B>` if `generics` is non-empty.
pub(crate) fn write_generics(f: &mut fmt::Formatter<'_>, generics: &[ValueType]) -> fmt::Result {
    if generics.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for (i, g) in generics.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{g}")?;
    }
    f.write_str(">")
}

// ── MethodBuilder ─────────────────────────────────────────────────────────────

/// Fluent builder for [`MethodSignature`].
///
/// # Example
///
/// ```rust
/// use avatar_core::{MethodSignature, ValueType};
///
/// let try_add = MethodSignature::builder("Calculator", "try_add")
///     .param("x", ValueType::I32)
///     .param("y", ValueType::I32)
///     .out_param("z", ValueType::nullable(ValueType::I32))
///     .returns(ValueType::Bool)
///     .build()
///     .unwrap();
/// assert_eq!(try_add.parameter_count(), 3);
/// ```
pub struct MethodBuilder {
    declaring_type:    String,
    name:              String,
    parameters:        Vec<(String, ValueType, Direction)>,
    return_type:       ValueType,
    generic_arguments: Vec<ValueType>,
}

impl MethodBuilder {
    /// Append a by-value parameter.
    pub fn param(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.parameter(name, ty, Direction::In)
    }

    pub fn ref_param(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.parameter(name, ty, Direction::Ref)
    }

    pub fn out_param(self, name: impl Into<String>, ty: ValueType) -> Self {
        self.parameter(name, ty, Direction::Out)
    }

    pub fn parameter(mut self, name: impl Into<String>, ty: ValueType, direction: Direction) -> Self {
        self.parameters.push((name.into(), ty, direction));
        self
    }

    /// Set the return type.  Defaults to `ValueType::Unit`.
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.return_type = ty;
        self
    }

    /// Append a generic type argument.
    pub fn generic(mut self, ty: ValueType) -> Self {
        self.generic_arguments.push(ty);
        self
    }

    /// Validate parameter names and freeze the signature.
    pub fn build(self) -> AvatarResult<Arc<MethodSignature>> {
        let mut parameters: Vec<ParameterInfo> = Vec::with_capacity(self.parameters.len());
        for (position, (name, ty, direction)) in self.parameters.into_iter().enumerate() {
            if parameters.iter().any(|p| p.name() == name) {
                return Err(AvatarError::DuplicateParameter { name });
            }
            parameters.push(ParameterInfo::new(name, ty, direction, position));
        }

        Ok(Arc::new(MethodSignature {
            declaring_type:    self.declaring_type,
            name:              self.name,
            parameters,
            return_type:       self.return_type,
            generic_arguments: self.generic_arguments,
        }))
    }
}
