//! calculator — smallest end-to-end example for the avatar runtime.
//!
//! Builds a `Calculator` avatar through the avatar and pipeline factories,
//! then layers behaviors onto it: recording, identity equality, an argument
//! override that calls the base implementation, and an answer for a method
//! that has no base at all.
//!
//! Set `AVATAR_LOG=trace` to watch each dispatch step.

mod calculator;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use avatar_behavior::{
    AnonymousBehavior, BehaviorRef, DefaultEqualityBehavior, RecordingBehavior,
};
use avatar_core::{AvatarError, TypeKey};
use avatar_pipeline::{
    Avatar, AvatarFactories, AvatarRequest, BehaviorPipeline, PipelineFactories,
    PipelineFactory, RegistryAvatarFactory,
};

use calculator::{Calculator, CalculatorAvatar};

fn main() -> Result<()> {
    if let Ok(filter) = EnvFilter::try_from_env("AVATAR_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    println!("=== calculator — avatar behavior pipeline ===");
    println!();

    // 1. Every new avatar gets a recorder and identity equality up front.
    let recorder = Arc::new(RecordingBehavior::new());
    let seeded = Arc::clone(&recorder);
    let pipelines: Arc<dyn PipelineFactory> = Arc::new(move |_kind: TypeKey| {
        BehaviorPipeline::with_behaviors([
            Arc::clone(&seeded) as BehaviorRef,
            Arc::new(DefaultEqualityBehavior),
        ])
    });
    let _pipelines = PipelineFactories::set_local(pipelines);

    // 2. Register the hand-written avatar and build one through the factory.
    let registry = Arc::new(RegistryAvatarFactory::new());
    registry.register::<dyn Calculator, _>(&[], |_| {
        CalculatorAvatar::new().map(avatar_core::ObjectRef::from_arc)
    });
    let _avatars = AvatarFactories::set_local(registry);

    let object = AvatarFactories::create_avatar(&AvatarRequest::of::<dyn Calculator>())?;
    let calc = object
        .downcast::<CalculatorAvatar>()
        .ok_or_else(|| anyhow!("factory produced a {}", object.type_key()))?;

    // 3. Base implementations run when no behavior answers.
    println!("add(2, 3)            = {}", calc.add(2, 3)?);
    let mut quotient = -1;
    let ok = calc.try_divide(7, 2, &mut quotient)?;
    println!("try_divide(7, 2)     = {ok}, quotient = {quotient}");
    let ok = calc.try_divide(1, 0, &mut quotient)?;
    println!("try_divide(1, 0)     = {ok}, quotient = {quotient}");

    // 4. Exceptions from the base implementation surface as errors.
    match calc.add(i32::MAX, 1) {
        Err(AvatarError::Exception(e)) => println!("add(i32::MAX, 1)     ! {e}"),
        other => println!("add(i32::MAX, 1)     = {other:?}"),
    }

    // 5. `describe` has no base implementation yet.
    let mut label = String::from("calc");
    match calc.describe(&mut label) {
        Err(e) if e.is_not_implemented() => println!("describe             ! not implemented"),
        other => other?,
    }

    // 6. Answer `describe`, writing the ref parameter back.
    calc.add_behavior(
        AnonymousBehavior::new(|inv, _| {
            let mut arguments = inv.arguments().clone();
            let label = arguments.get::<String>("label")?;
            arguments.set_value("label", format!("{label} (avatar)"))?;
            inv.create_value_return(None, &arguments)
        })
        .applies_when(|inv| inv.method().name() == "describe")
        .named("describe"),
    );
    calc.describe(&mut label)?;
    println!("describe             = {label:?}");

    // 7. Double `x` before the base `add` runs.
    calc.pipeline().behaviors().insert(1, calculator::double_x())?;
    println!("add(2, 3) doubled    = {}", calc.add(2, 3)?);

    // 8. Identity equality through the pipeline.
    println!("equals(self)         = {}", calc.equals(&object)?);
    println!("hash_code            = {:#010x}", calc.hash_code()?);

    // 9. Everything the recorder saw.
    println!();
    println!("{:<4} {:<44} {}", "#", "Invocation", "Outcome");
    println!("{}", "-".repeat(72));
    for (i, call) in recorder.summaries().iter().enumerate() {
        println!("{:<4} {:<44} {}", i, call.invocation, call.outcome);
    }

    Ok(())
}
