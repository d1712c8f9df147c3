//! A behavior that records every call passing through it.

use avatar_core::AvatarResult;
use parking_lot::Mutex;

use crate::{AvatarBehavior, GetNext, MethodInvocation, MethodReturn};

/// One recorded call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub invocation: MethodInvocation,
    pub result:     MethodReturn,
}

/// A rendered, owned snapshot of a [`RecordedCall`].
///
/// Plain strings, so it can be compared in assertions or serialized (with
/// the `serde` feature) without holding on to live objects.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallSummary {
    /// `Calculator.add(a: 2, b: 3)`
    pub invocation: String,
    /// `=> 5`
    pub outcome:    String,
}

/// Applies to every call, lets the rest of the chain run, and logs the
/// invocation together with its result.
///
/// Calls that end in an `Err` (rather than an exception return) are not
/// recorded; the error is passed straight back.
///
/// Insert it first in a pipeline to observe the final outcome of every call.
#[derive(Default)]
pub struct RecordingBehavior {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn summaries(&self) -> Vec<CallSummary> {
        self.calls
            .lock()
            .iter()
            .map(|c| CallSummary {
                invocation: c.invocation.to_string(),
                outcome:    c.result.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl AvatarBehavior for RecordingBehavior {
    fn applies_to(&self, _invocation: &MethodInvocation) -> bool {
        true
    }

    fn execute(&self, invocation: &MethodInvocation, next: GetNext<'_>) -> AvatarResult<MethodReturn> {
        let result = next.proceed(invocation)?;
        self.calls.lock().push(RecordedCall {
            invocation: invocation.clone(),
            result:     result.clone(),
        });
        Ok(result)
    }
}
