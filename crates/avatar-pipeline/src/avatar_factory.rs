//! Avatar factories: pluggable strategies for instantiating proxies.

use std::fmt;
use std::sync::{Arc, LazyLock};

use avatar_core::{AvatarError, AvatarResult, ObjectRef, TypeKey, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{AmbientDefault, LocalDefaultGuard};

// ── AvatarRequest ─────────────────────────────────────────────────────────────

/// What to build: a proxy for `base_type` that also implements `interfaces`,
/// constructed with `arguments`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarRequest {
    base_type:  TypeKey,
    interfaces: Vec<TypeKey>,
    arguments:  Vec<Value>,
}

impl AvatarRequest {
    pub fn new(base_type: TypeKey) -> Self {
        Self { base_type, interfaces: Vec::new(), arguments: Vec::new() }
    }

    /// A request for a proxy of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>())
    }

    /// Also implement `I`.
    pub fn implementing<I: ?Sized + 'static>(mut self) -> Self {
        self.interfaces.push(TypeKey::of::<I>());
        self
    }

    /// Constructor arguments passed through to the proxy.
    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = arguments;
        self
    }

    #[inline]
    pub fn base_type(&self) -> TypeKey {
        self.base_type
    }

    #[inline]
    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    #[inline]
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// The type set being requested, independent of interface order.
    pub fn signature(&self) -> AvatarSignature {
        AvatarSignature::new(self.base_type, &self.interfaces)
    }
}

impl fmt::Display for AvatarRequest {
    /// `Calculator + Disposable`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_type)?;
        for interface in &self.interfaces {
            write!(f, " + {interface}")?;
        }
        Ok(())
    }
}

/// A base type plus a sorted, de-duplicated set of extra interfaces.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AvatarSignature {
    base_type:  TypeKey,
    interfaces: Vec<TypeKey>,
}

impl AvatarSignature {
    pub fn new(base_type: TypeKey, interfaces: &[TypeKey]) -> Self {
        let mut interfaces = interfaces.to_vec();
        interfaces.sort();
        interfaces.dedup();
        Self { base_type, interfaces }
    }
}

// ── AvatarFactory ─────────────────────────────────────────────────────────────

/// Instantiates a concrete proxy for a requested type set.
pub trait AvatarFactory: Send + Sync {
    fn create_avatar(&self, request: &AvatarRequest) -> AvatarResult<ObjectRef>;
}

/// The initial default: fails every request until a real factory is installed.
#[derive(Default, Debug, Clone, Copy)]
pub struct NotImplementedAvatarFactory;

impl AvatarFactory for NotImplementedAvatarFactory {
    fn create_avatar(&self, request: &AvatarRequest) -> AvatarResult<ObjectRef> {
        Err(AvatarError::NotImplemented(format!(
            "no avatar factory is configured to create {request}"
        )))
    }
}

type Constructor = Arc<dyn Fn(&AvatarRequest) -> AvatarResult<ObjectRef> + Send + Sync>;

/// A factory backed by constructors registered per type set.
///
/// Proxy types register themselves under the signature they implement; a
/// request is served by the constructor registered for its signature.
/// Interface order does not matter.
///
/// ```rust,ignore
/// let factory = RegistryAvatarFactory::new();
/// factory.register::<dyn Calculator, _>(&[], |_req| {
///     CalculatorAvatar::new().map(ObjectRef::from_arc)
/// });
/// let calc = factory.create_avatar(&AvatarRequest::of::<dyn Calculator>())?;
/// ```
#[derive(Default)]
pub struct RegistryAvatarFactory {
    constructors: RwLock<FxHashMap<AvatarSignature, Constructor>>,
}

impl RegistryAvatarFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for proxies of `T` that also implement
    /// `interfaces`, replacing any earlier registration.
    pub fn register<T, F>(&self, interfaces: &[TypeKey], constructor: F)
    where
        T: ?Sized + 'static,
        F: Fn(&AvatarRequest) -> AvatarResult<ObjectRef> + Send + Sync + 'static,
    {
        let signature = AvatarSignature::new(TypeKey::of::<T>(), interfaces);
        debug!(base = %signature.base_type, "avatar registry: constructor registered");
        self.constructors.write().insert(signature, Arc::new(constructor));
    }

    /// `true` if a constructor was registered for the signature.
    pub fn deregister(&self, signature: &AvatarSignature) -> bool {
        self.constructors.write().remove(signature).is_some()
    }

    pub fn contains(&self, signature: &AvatarSignature) -> bool {
        self.constructors.read().contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.constructors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.read().is_empty()
    }
}

impl AvatarFactory for RegistryAvatarFactory {
    fn create_avatar(&self, request: &AvatarRequest) -> AvatarResult<ObjectRef> {
        // Clone the constructor out so it may itself use the registry.
        let constructor = self.constructors.read().get(&request.signature()).cloned();
        match constructor {
            Some(construct) => construct(request),
            None => Err(AvatarError::NotImplemented(format!(
                "no avatar type is registered for {request}"
            ))),
        }
    }
}

// ── Default ───────────────────────────────────────────────────────────────────

static DEFAULT: LazyLock<AmbientDefault<dyn AvatarFactory>> = LazyLock::new(|| {
    let initial: Arc<dyn AvatarFactory> = Arc::new(NotImplementedAvatarFactory);
    AmbientDefault::new("avatar factory", initial)
});

/// Access to the default [`AvatarFactory`].
pub struct AvatarFactories;

impl AvatarFactories {
    /// This thread's override if one is installed, else the global default.
    pub fn current() -> Arc<dyn AvatarFactory> {
        DEFAULT.current()
    }

    /// This thread's override, if one is installed.
    pub fn local() -> Option<Arc<dyn AvatarFactory>> {
        DEFAULT.local()
    }

    pub fn global() -> Arc<dyn AvatarFactory> {
        DEFAULT.global()
    }

    /// Replace the process-wide default; returns the previous one.
    pub fn set_global(factory: Arc<dyn AvatarFactory>) -> Arc<dyn AvatarFactory> {
        DEFAULT.set_global(factory)
    }

    /// Override the default on this thread until the guard drops.
    pub fn set_local(factory: Arc<dyn AvatarFactory>) -> LocalDefaultGuard {
        DEFAULT.set_local(factory)
    }

    pub fn with_local<R>(factory: Arc<dyn AvatarFactory>, f: impl FnOnce() -> R) -> R {
        DEFAULT.with_local(factory, f)
    }

    /// Build an avatar with the current default factory.
    pub fn create_avatar(request: &AvatarRequest) -> AvatarResult<ObjectRef> {
        Self::current().create_avatar(request)
    }
}
