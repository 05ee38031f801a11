//! Shorthand for building effects inside reducers

/// `Effect::Future` from the body of an async block
///
/// The body runs inside `async move` and must evaluate to `Option<Action>`.
///
/// ```rust,ignore
/// use reducer_kit_core::async_effect;
///
/// let client = env.client.clone();
/// async_effect! {
///     let prime = client.nth_prime(n).await;
///     Some(CounterAction::NthPrimeResponse(prime))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move { $($body)* }))
    };
}

/// `Effect::Sync` producing `$action`
///
/// `$action` is moved into the closure and only evaluated once the effect
/// runs.
#[macro_export]
macro_rules! sync_effect {
    ($action:expr) => {
        $crate::effect::Effect::Sync(::std::boxed::Box::new(move || $action))
    };
}

/// `Effect::Delay` emitting `action` after `duration`
///
/// ```rust,ignore
/// use reducer_kit_core::delay;
/// use std::time::Duration;
///
/// delay! { duration: Duration::from_secs(3), action: CounterAction::AlertDismissButtonTapped }
/// ```
#[macro_export]
macro_rules! delay {
    (duration: $duration:expr, action: $action:expr $(,)?) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
