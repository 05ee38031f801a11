//! Case paths route the subset of global actions that belong to one feature.
//!
//! A [`CasePath`] pairs a partial extraction (`Root -> Option<Value>`) with
//! an embedding (`Value -> Root`). Both are ordinary functions over an enum,
//! usually a `match` and the variant constructor.
//!
//! # Laws
//!
//! - `extract(embed(a)) == Some(a)` for every `a`
//! - `extract(x) == None` for every `x` not produced by `embed`

use std::fmt;
use std::sync::Arc;

type Extract<Root, Value> = Arc<dyn Fn(Root) -> Option<Value> + Send + Sync>;
type Embed<Root, Value> = Arc<dyn Fn(Value) -> Root + Send + Sync>;

/// Partial accessor from an enum `Root` to the payload of one of its cases.
///
/// # Example
///
/// ```
/// use reducer_kit_core::CasePath;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum AppAction {
///     Counter(i64),
///     Reset,
/// }
///
/// let counter = CasePath::new(
///     |action: AppAction| match action {
///         AppAction::Counter(n) => Some(n),
///         _ => None,
///     },
///     AppAction::Counter,
/// );
///
/// assert_eq!(counter.extract(counter.embed(3)), Some(3));
/// assert_eq!(counter.extract(AppAction::Reset), None);
/// ```
pub struct CasePath<Root, Value> {
    extract: Extract<Root, Value>,
    embed: Embed<Root, Value>,
}

impl<Root, Value> CasePath<Root, Value> {
    /// Create a case path from an extractor and an embedder
    #[must_use]
    pub fn new<X, M>(extract: X, embed: M) -> Self
    where
        X: Fn(Root) -> Option<Value> + Send + Sync + 'static,
        M: Fn(Value) -> Root + Send + Sync + 'static,
    {
        Self {
            extract: Arc::new(extract),
            embed: Arc::new(embed),
        }
    }

    /// Try to pull the case payload out of `root`
    pub fn extract(&self, root: Root) -> Option<Value> {
        (self.extract)(root)
    }

    /// Wrap a payload back into the root enum
    pub fn embed(&self, value: Value) -> Root {
        (self.embed)(value)
    }

    /// An owned embedding function, suitable for [`Effect::map`](crate::Effect::map)
    #[must_use]
    pub fn embedder(&self) -> impl Fn(Value) -> Root + Send + Sync + 'static
    where
        Root: 'static,
        Value: 'static,
    {
        let embed = Arc::clone(&self.embed);
        move |value| embed(value)
    }
}

impl<Root: 'static, Value: 'static> CasePath<Root, Value> {
    /// Compose with a case path reaching further into `Value`
    #[must_use]
    pub fn then<Inner: 'static>(self, inner: CasePath<Value, Inner>) -> CasePath<Root, Inner> {
        let outer_extract = Arc::clone(&self.extract);
        let inner_extract = Arc::clone(&inner.extract);
        let outer_embed = Arc::clone(&self.embed);
        let inner_embed = Arc::clone(&inner.embed);

        CasePath::new(
            move |root: Root| outer_extract(root).and_then(|value| inner_extract(value)),
            move |value: Inner| outer_embed(inner_embed(value)),
        )
    }
}

impl<Root: 'static> CasePath<Root, Root> {
    /// The case path that matches every root
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Some, |root: Root| root)
    }
}

impl<Root, Value> Clone for CasePath<Root, Value> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
            embed: Arc::clone(&self.embed),
        }
    }
}

impl<Root, Value> fmt::Debug for CasePath<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasePath")
            .field("root", &std::any::type_name::<Root>())
            .field("value", &std::any::type_name::<Value>())
            .finish()
    }
}
