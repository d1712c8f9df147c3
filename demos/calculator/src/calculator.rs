//! A `Calculator` trait and the hand-written avatar that implements it.
//!
//! Every method builds a `MethodInvocation`, sends it through the avatar's
//! pipeline and copies `ref`/`out` results back into the caller's variables.
//! `add` and `try_divide` carry a base implementation; `describe` has none,
//! so it fails with `NotImplemented` until a behavior answers it.

use std::sync::{Arc, Weak};

use avatar_behavior::{AnonymousBehavior, MethodInvocation, equals_method, hash_code_method};
use avatar_core::{AvatarResult, Exception, MethodSignature, ObjectRef, ValueType};
use avatar_pipeline::{Avatar, BehaviorPipeline, create_pipeline};

pub trait Calculator: Send + Sync {
    fn add(&self, x: i32, y: i32) -> AvatarResult<i32>;

    /// `quotient` is an out parameter.
    fn try_divide(&self, x: i32, y: i32, quotient: &mut i32) -> AvatarResult<bool>;

    /// `label` is a ref parameter.
    fn describe(&self, label: &mut String) -> AvatarResult<()>;
}

struct Methods {
    add:        Arc<MethodSignature>,
    try_divide: Arc<MethodSignature>,
    describe:   Arc<MethodSignature>,
    hash_code:  Arc<MethodSignature>,
    equals:     Arc<MethodSignature>,
}

impl Methods {
    fn build() -> AvatarResult<Self> {
        Ok(Self {
            add: MethodSignature::builder("Calculator", "add")
                .param("x", ValueType::I32)
                .param("y", ValueType::I32)
                .returns(ValueType::I32)
                .build()?,
            try_divide: MethodSignature::builder("Calculator", "try_divide")
                .param("x", ValueType::I32)
                .param("y", ValueType::I32)
                .out_param("quotient", ValueType::I32)
                .returns(ValueType::Bool)
                .build()?,
            describe: MethodSignature::builder("Calculator", "describe")
                .ref_param("label", ValueType::Str)
                .build()?,
            hash_code: hash_code_method("Calculator")?,
            equals:    equals_method("Calculator")?,
        })
    }
}

pub struct CalculatorAvatar {
    this:     Weak<CalculatorAvatar>,
    methods:  Methods,
    pipeline: BehaviorPipeline,
}

impl CalculatorAvatar {
    /// A new avatar whose pipeline comes from the current pipeline factory.
    pub fn new() -> AvatarResult<Arc<Self>> {
        let methods = Methods::build()?;
        let pipeline = create_pipeline::<dyn Calculator>();
        Ok(Arc::new_cyclic(|this| Self { this: this.clone(), methods, pipeline }))
    }

    fn invocation(
        &self,
        method: &Arc<MethodSignature>,
        values: Vec<avatar_core::Value>,
    ) -> AvatarResult<MethodInvocation> {
        MethodInvocation::new(self.this.clone(), Arc::clone(method), values)
    }

    pub fn hash_code(&self) -> AvatarResult<i32> {
        let invocation = self.invocation(&self.methods.hash_code, vec![])?;
        self.pipeline.execute_as(&invocation)
    }

    pub fn equals(&self, other: &ObjectRef) -> AvatarResult<bool> {
        let invocation = self.invocation(&self.methods.equals, vec![other.clone().into()])?;
        self.pipeline.execute_as(&invocation)
    }
}

impl Avatar for CalculatorAvatar {
    fn pipeline(&self) -> &BehaviorPipeline {
        &self.pipeline
    }
}

impl Calculator for CalculatorAvatar {
    fn add(&self, x: i32, y: i32) -> AvatarResult<i32> {
        let invocation = self
            .invocation(&self.methods.add, vec![x.into(), y.into()])?
            .with_call_base(|inv, _| {
                let x = inv.arguments().get::<i32>("x")?;
                let y = inv.arguments().get::<i32>("y")?;
                match x.checked_add(y) {
                    Some(sum) => inv.create_return(Some(sum.into())),
                    None => Ok(inv.create_exception_return(Exception::msg(format!(
                        "{x} + {y} overflows i32"
                    )))),
                }
            });
        self.pipeline.execute_as(&invocation)
    }

    fn try_divide(&self, x: i32, y: i32, quotient: &mut i32) -> AvatarResult<bool> {
        let invocation = self
            .invocation(&self.methods.try_divide, vec![x.into(), y.into(), (*quotient).into()])?
            .with_call_base(|inv, _| {
                let x = inv.arguments().get::<i32>("x")?;
                let y = inv.arguments().get::<i32>("y")?;
                let mut arguments = inv.arguments().clone();
                let result = x.checked_div(y);
                arguments.set_value("quotient", result.unwrap_or_default())?;
                inv.create_value_return(Some(result.is_some().into()), &arguments)
            });
        let ret = self.pipeline.execute(&invocation)?;
        *quotient = ret.outputs().get::<i32>("quotient")?;
        ret.get::<bool>()
    }

    fn describe(&self, label: &mut String) -> AvatarResult<()> {
        let invocation = self.invocation(&self.methods.describe, vec![label.as_str().into()])?;
        let ret = self.pipeline.execute(&invocation)?;
        *label = ret.outputs().get::<String>("label")?;
        Ok(())
    }
}

/// Doubles `x` before the base `add` runs.
pub fn double_x() -> AnonymousBehavior {
    AnonymousBehavior::new(|inv, _| {
        let x = inv.arguments().get::<i32>("x")?;
        let Some(doubled) = x.checked_mul(2) else {
            return Ok(inv.create_exception_return(Exception::msg(format!("2 * {x} overflows i32"))));
        };
        let mut arguments = inv.arguments().clone();
        arguments.set_value("x", doubled)?;
        inv.create_call_base_return(Some(arguments))
    })
    .applies_when(|inv| inv.method().name() == "add")
    .named("double-x")
}

#[cfg(test)]
mod tests {
    use avatar_core::AvatarError;

    use super::*;

    #[test]
    fn double_x_feeds_the_base_add() {
        let calc = CalculatorAvatar::new().unwrap();
        calc.add_behavior(double_x());
        assert_eq!(calc.add(2, 3).unwrap(), 7);
    }

    #[test]
    fn double_x_overflow_is_an_exception() {
        let calc = CalculatorAvatar::new().unwrap();
        calc.add_behavior(double_x());
        match calc.add(i32::MAX, 0) {
            Err(AvatarError::Exception(e)) => assert!(e.to_string().contains("overflows"), "{e}"),
            other => panic!("expected an exception, got {other:?}"),
        }
    }
}
