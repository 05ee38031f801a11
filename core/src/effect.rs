//! Effects describe side effects to be performed by the runtime.
//!
//! They are values (not execution): building an effect does no work, and an
//! effect only runs once the runtime (or a test harness) drives it. Every
//! effect yields zero or more actions over time and then completes.
//!
//! # Delivery
//!
//! All effects, including [`Effect::Sync`], deliver their actions through the
//! same asynchronous feedback path. A synchronous effect is therefore never
//! applied inline within the reduction that produced it.

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Identifier used to cancel in-flight effects.
///
/// Effects wrapped with [`Effect::cancellable`] can later be stopped by
/// returning [`Effect::Cancel`] with the same id from any reducer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectId(String);

impl EffectId {
    /// Create a new effect id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EffectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Effect type - describes a side effect to be executed
///
/// Effects are NOT executed immediately. They are descriptions of what should
/// happen, returned from reducers and executed by the Store runtime.
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect, the identity for [`Effect::merge`] and [`Effect::chain`]
    None,

    /// A value computed on demand and fed back as one action
    Sync(Box<dyn FnOnce() -> Action + Send>),

    /// Arbitrary async computation
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
    Future(BoxFuture<'static, Option<Action>>),

    /// Async computation producing any number of actions, in order
    Stream(BoxStream<'static, Action>),

    /// Delayed action (for timeouts, debouncing)
    Delay {
        /// How long to wait
        duration: Duration,
        /// Action to dispatch after delay
        action: Box<Action>,
    },

    /// Run effects in parallel
    Parallel(Vec<Effect<Action>>),

    /// Run effects sequentially
    Sequential(Vec<Effect<Action>>),

    /// An effect whose future emissions can be stopped with [`Effect::Cancel`]
    Cancellable {
        /// Cancellation key
        id: EffectId,
        /// The wrapped effect
        effect: Box<Effect<Action>>,
    },

    /// Stop forwarding emissions of every in-flight effect tagged with this id
    Cancel(EffectId),
}

// Manual Debug implementation since closures and futures don't implement Debug
impl<Action> fmt::Debug for Effect<Action>
where
    Action: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Sync(_) => write!(f, "Effect::Sync(<thunk>)"),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Effect::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Cancellable { id, effect } => f
                .debug_struct("Effect::Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
        }
    }
}

impl<Action> Effect<Action> {
    /// An effect that yields nothing and completes immediately
    #[must_use]
    pub const fn none() -> Self {
        Effect::None
    }

    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Cancel every in-flight effect registered under `id`
    #[must_use]
    pub fn cancel(id: impl Into<EffectId>) -> Self {
        Effect::Cancel(id.into())
    }

    /// Tag this effect so a later [`Effect::Cancel`] can stop it
    #[must_use]
    pub fn cancellable(self, id: impl Into<EffectId>) -> Self {
        Effect::Cancellable {
            id: id.into(),
            effect: Box::new(self),
        }
    }

    /// Whether this effect can never produce an action or cancel anything
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Effect::None => true,
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                effects.iter().all(Effect::is_none)
            },
            Effect::Cancellable { effect, .. } => effect.is_none(),
            _ => false,
        }
    }
}

impl<Action: Send + 'static> Effect<Action> {
    /// Wrap a value-producing computation.
    ///
    /// The closure runs when the effect is started, not when it is built,
    /// and its value still travels the asynchronous feedback path.
    #[must_use]
    pub fn sync<F>(f: F) -> Self
    where
        F: FnOnce() -> Action + Send + 'static,
    {
        Effect::Sync(Box::new(f))
    }

    /// Wrap a future yielding at most one action
    #[must_use]
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Effect::Future(Box::pin(future))
    }

    /// Wrap a stream of actions
    #[must_use]
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Action> + Send + 'static,
    {
        Effect::Stream(stream.boxed())
    }

    /// Dispatch `action` once `duration` has elapsed
    #[must_use]
    pub fn delay(duration: Duration, action: Action) -> Self {
        Effect::Delay {
            duration,
            action: Box::new(action),
        }
    }

    /// Transform every action this effect eventually produces.
    ///
    /// The number and order of emissions are preserved for every variant,
    /// nested ones included. Cancellation ids are kept as they are.
    #[must_use]
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(Action) -> B + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B>(self, f: Arc<dyn Fn(Action) -> B + Send + Sync>) -> Effect<B>
    where
        B: Send + 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Sync(thunk) => Effect::Sync(Box::new(move || f(thunk()))),
            Effect::Future(fut) => Effect::Future(fut.map(move |action| action.map(|a| f(a))).boxed()),
            Effect::Stream(stream) => Effect::Stream(stream.map(move |a| f(a)).boxed()),
            Effect::Delay { duration, action } => Effect::Delay {
                duration,
                action: Box::new(f(*action)),
            },
            Effect::Parallel(effects) => Effect::Parallel(
                effects
                    .into_iter()
                    .map(|effect| effect.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
            Effect::Sequential(effects) => Effect::Sequential(
                effects
                    .into_iter()
                    .map(|effect| effect.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
            Effect::Cancellable { id, effect } => Effect::Cancellable {
                id,
                effect: Box::new(effect.map_shared(f)),
            },
            Effect::Cancel(id) => Effect::Cancel(id),
        }
    }

    /// Drive this effect as a stream of the actions it produces.
    ///
    /// This is the uniform producer interface every effect variant reduces
    /// to. Nothing runs until the stream is polled. Cancellation markers are
    /// inert here: the store walks `Cancellable` trees itself instead of
    /// calling this on them.
    #[must_use]
    pub fn into_stream(self) -> BoxStream<'static, Action> {
        match self {
            Effect::None | Effect::Cancel(_) => stream::empty().boxed(),
            Effect::Sync(thunk) => stream::once(async move { thunk() }).boxed(),
            Effect::Future(fut) => stream::once(fut).filter_map(future::ready).boxed(),
            Effect::Stream(stream) => stream,
            Effect::Delay { duration, action } => stream::once(async move {
                tokio::time::sleep(duration).await;
                *action
            })
            .boxed(),
            Effect::Parallel(effects) => {
                stream::select_all(effects.into_iter().map(Effect::into_stream)).boxed()
            },
            Effect::Sequential(effects) => stream::iter(effects).flat_map(Effect::into_stream).boxed(),
            Effect::Cancellable { effect, .. } => effect.into_stream(),
        }
    }
}

impl<T: Send + 'static> Effect<Option<T>> {
    /// Wrap a fallible asynchronous source.
    ///
    /// Success yields `Some(value)`; failure yields `None` and the error is
    /// logged. Errors never reach the reducer layer as errors.
    ///
    /// ```
    /// use reducer_kit_core::Effect;
    ///
    /// let effect = Effect::from_fallible(async { "17".parse::<i64>() });
    /// let values = tokio_test::block_on(async {
    ///     use futures::StreamExt;
    ///     effect.into_stream().collect::<Vec<_>>().await
    /// });
    /// assert_eq!(values, vec![Some(17)]);
    /// ```
    #[must_use]
    pub fn from_fallible<F, E>(source: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        Effect::Future(Box::pin(async move {
            match source.await {
                Ok(value) => Some(Some(value)),
                Err(error) => {
                    tracing::debug!(error = %error, "Effect source failed, yielding absent value");
                    Some(None)
                },
            }
        }))
    }
}

/// Normalize effect-like values into an [`Effect`].
///
/// Combinators use this instead of caring which concrete shape a feature
/// returned.
pub trait EraseToEffect<Action> {
    /// Convert into an [`Effect`]
    fn erase_to_effect(self) -> Effect<Action>;
}

impl<Action: Send + 'static> EraseToEffect<Action> for Effect<Action> {
    /// Drops `None` children and collapses empty or single-child groups.
    fn erase_to_effect(self) -> Effect<Action> {
        match self {
            Effect::Parallel(effects) => collapse(effects, Effect::Parallel),
            Effect::Sequential(effects) => collapse(effects, Effect::Sequential),
            Effect::Cancellable { id, effect } => Effect::Cancellable {
                id,
                effect: Box::new(effect.erase_to_effect()),
            },
            other => other,
        }
    }
}

fn collapse<Action: Send + 'static>(
    effects: Vec<Effect<Action>>,
    group: fn(Vec<Effect<Action>>) -> Effect<Action>,
) -> Effect<Action> {
    let mut effects: Vec<_> = effects
        .into_iter()
        .map(EraseToEffect::erase_to_effect)
        .filter(|effect| !matches!(effect, Effect::None))
        .collect();

    match effects.len() {
        0 => Effect::None,
        1 => effects.pop().unwrap_or(Effect::None),
        _ => group(effects),
    }
}

impl<Action: Send + 'static> EraseToEffect<Action> for Option<Action> {
    fn erase_to_effect(self) -> Effect<Action> {
        match self {
            Some(action) => Effect::sync(move || action),
            None => Effect::None,
        }
    }
}

impl<Action: Send + 'static> EraseToEffect<Action> for Vec<Effect<Action>> {
    fn erase_to_effect(self) -> Effect<Action> {
        Effect::Parallel(self).erase_to_effect()
    }
}

impl<Action: Send + 'static> EraseToEffect<Action> for BoxFuture<'static, Option<Action>> {
    fn erase_to_effect(self) -> Effect<Action> {
        Effect::Future(self)
    }
}
