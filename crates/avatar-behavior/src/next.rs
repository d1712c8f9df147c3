//! The dispatch cursor that threads a call through a behavior snapshot.
//!
//! # Design
//!
//! The pipeline copies its behavior list into a slice before each call.
//! [`GetNext`] is a `(slice, position)` pair: asking it for the next step
//! scans forward from `position` for the first behavior that is neither in
//! the invocation's skip set nor declines via `applies_to`.  Executing that
//! step hands the behavior a fresh cursor positioned just past it.
//!
//! Because the slice is a snapshot, behaviors added or removed while a call
//! is running only affect later calls.
//!
//! When the scan reaches the end of the slice the step is *terminal*: the
//! invocation's base implementation runs if one is bound, otherwise the call
//! fails with `NotImplemented`.

use avatar_core::{AvatarError, AvatarResult};
use tracing::trace;

use crate::{BehaviorRef, MethodInvocation, MethodReturn};

/// Resolves the next step of the chain for a behavior.
#[derive(Clone, Copy)]
pub struct GetNext<'a> {
    cursor: Cursor<'a>,
}

#[derive(Clone, Copy)]
enum Cursor<'a> {
    Chain { behaviors: &'a [BehaviorRef], position: usize },
    /// Handed to base implementations, which end the chain.
    Unsupported,
}

impl<'a> GetNext<'a> {
    /// A cursor that resumes scanning `behaviors` at `position`.
    pub fn chain(behaviors: &'a [BehaviorRef], position: usize) -> Self {
        Self { cursor: Cursor::Chain { behaviors, position } }
    }

    /// A cursor that always fails with `NotSupported`.
    pub fn unsupported() -> Self {
        Self { cursor: Cursor::Unsupported }
    }

    /// The next eligible behavior for `invocation`, or the terminal step.
    pub fn next(&self, invocation: &MethodInvocation) -> AvatarResult<NextStep<'a>> {
        match self.cursor {
            Cursor::Unsupported => Err(AvatarError::NotSupported(format!(
                "{invocation} is running its base implementation, which has no next behavior"
            ))),
            Cursor::Chain { behaviors, position } => {
                let step = match find_eligible(behaviors, position, invocation) {
                    Some(index) => Step::Behavior { behaviors, index },
                    None => Step::Terminal,
                };
                Ok(NextStep { step })
            }
        }
    }

    /// Resolve and run the next step.
    pub fn proceed(&self, invocation: &MethodInvocation) -> AvatarResult<MethodReturn> {
        self.next(invocation)?.execute(invocation)
    }
}

/// One resolved link of the chain.
pub struct NextStep<'a> {
    step: Step<'a>,
}

enum Step<'a> {
    Behavior { behaviors: &'a [BehaviorRef], index: usize },
    Terminal,
}

impl<'a> NextStep<'a> {
    /// The behavior this step will run; `None` for the terminal step.
    pub fn behavior(&self) -> Option<&'a BehaviorRef> {
        match self.step {
            Step::Behavior { behaviors, index } => behaviors.get(index),
            Step::Terminal => None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.step, Step::Terminal)
    }

    pub fn execute(self, invocation: &MethodInvocation) -> AvatarResult<MethodReturn> {
        match self.step {
            Step::Behavior { behaviors, index } => {
                let behavior = &behaviors[index];
                trace!(
                    behavior = behavior.name(),
                    index,
                    method = invocation.method().name(),
                    "dispatch: executing behavior"
                );
                behavior.execute(invocation, GetNext::chain(behaviors, index + 1))
            }
            Step::Terminal => fallback(invocation),
        }
    }
}

/// Index of the first behavior at or after `from` that should see `invocation`.
pub fn find_eligible(
    behaviors:  &[BehaviorRef],
    from:       usize,
    invocation: &MethodInvocation,
) -> Option<usize> {
    behaviors
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, b)| !invocation.is_skipped(&b.kind()) && b.applies_to(invocation))
        .map(|(i, _)| i)
}

/// End of the chain: run the base implementation or report the call as
/// not implemented.
pub fn fallback(invocation: &MethodInvocation) -> AvatarResult<MethodReturn> {
    if invocation.has_call_base() {
        trace!(method = invocation.method().name(), "dispatch: calling base implementation");
        invocation.create_call_base_return(None)
    } else {
        tracing::debug!(%invocation, "dispatch: no behavior answered the call");
        Err(invocation.not_implemented())
    }
}
