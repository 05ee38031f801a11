//! Lenses focus a reducer on one part of a larger state.
//!
//! A [`Lens`] pairs a getter with a setter. The getter may return a plain
//! field or a projection computed from several fields; the setter is the
//! single point where a (possibly modified) local value is written back.
//!
//! # Laws
//!
//! For every root `g` and value `v`:
//!
//! - `get(set(g, v)) == v`
//! - `set(g, get(g)) == g`
//!
//! Lenses that break these laws are programming errors. They are not checked
//! at runtime; use the property helpers in the testing crate.

use std::fmt;
use std::sync::Arc;

type Getter<Root, Value> = Arc<dyn Fn(&Root) -> Value + Send + Sync>;
type Setter<Root, Value> = Arc<dyn Fn(&mut Root, Value) + Send + Sync>;

/// Bidirectional accessor from `Root` to `Value`.
///
/// # Example
///
/// ```
/// use reducer_kit_core::Lens;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct AppState {
///     count: i64,
///     favorites: Vec<i64>,
/// }
///
/// let count = Lens::new(|s: &AppState| s.count, |s: &mut AppState, v| s.count = v);
///
/// let mut state = AppState { count: 1, favorites: vec![] };
/// count.set(&mut state, 5);
/// assert_eq!(count.get(&state), 5);
/// ```
pub struct Lens<Root, Value> {
    get: Getter<Root, Value>,
    set: Setter<Root, Value>,
}

impl<Root, Value> Lens<Root, Value> {
    /// Create a lens from a getter and a setter
    #[must_use]
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&Root) -> Value + Send + Sync + 'static,
        S: Fn(&mut Root, Value) + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// Read the focused value
    #[must_use]
    pub fn get(&self, root: &Root) -> Value {
        (self.get)(root)
    }

    /// Write the focused value back into `root`
    pub fn set(&self, root: &mut Root, value: Value) {
        (self.set)(root, value);
    }

    /// Read, mutate and write back in one step
    pub fn modify<T>(&self, root: &mut Root, f: impl FnOnce(&mut Value) -> T) -> T {
        let mut value = self.get(root);
        let output = f(&mut value);
        self.set(root, value);
        output
    }
}

impl<Root: 'static, Value: 'static> Lens<Root, Value> {
    /// Compose with a lens focusing further into `Value`
    #[must_use]
    pub fn then<Inner: 'static>(self, inner: Lens<Value, Inner>) -> Lens<Root, Inner> {
        let outer_get = Arc::clone(&self.get);
        let inner_get = Arc::clone(&inner.get);

        Lens::new(
            move |root: &Root| inner_get(&outer_get(root)),
            move |root: &mut Root, value: Inner| {
                let mut middle = self.get(root);
                inner.set(&mut middle, value);
                self.set(root, middle);
            },
        )
    }
}

impl<Root: Clone + 'static> Lens<Root, Root> {
    /// The lens focusing on the whole root
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Root::clone, |root: &mut Root, value: Root| *root = value)
    }
}

impl<Root, Value> Clone for Lens<Root, Value> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<Root, Value> fmt::Debug for Lens<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("root", &std::any::type_name::<Root>())
            .field("value", &std::any::type_name::<Value>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Inner {
        value: i32,
        label: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Outer {
        inner: Inner,
        flag: bool,
    }

    fn inner_lens() -> Lens<Outer, Inner> {
        Lens::new(|o: &Outer| o.inner.clone(), |o: &mut Outer, i| o.inner = i)
    }

    fn value_lens() -> Lens<Inner, i32> {
        Lens::new(|i: &Inner| i.value, |i: &mut Inner, v| i.value = v)
    }

    fn outer() -> Outer {
        Outer {
            inner: Inner {
                value: 1,
                label: "one".to_string(),
            },
            flag: true,
        }
    }

    #[test]
    fn test_modify_writes_back() {
        let lens = inner_lens().then(value_lens());
        let mut root = outer();

        let doubled = lens.modify(&mut root, |v| {
            *v *= 2;
            *v
        });

        assert_eq!(doubled, 2);
        assert_eq!(root.inner.value, 2);
        assert_eq!(root.inner.label, "one");
        assert!(root.flag);
    }

    #[test]
    fn test_identity() {
        let lens = Lens::<Outer, Outer>::identity();
        let mut root = outer();
        let mut replacement = outer();
        replacement.flag = false;

        lens.set(&mut root, replacement.clone());
        assert_eq!(lens.get(&root), replacement);
    }

    proptest! {
        #[test]
        fn prop_composed_lens_round_trips(start in any::<i32>(), value in any::<i32>(), flag in any::<bool>()) {
            let lens = inner_lens().then(value_lens());
            let mut root = outer();
            root.inner.value = start;
            root.flag = flag;

            let original = root.clone();
            let current = lens.get(&root);
            lens.set(&mut root, current);
            prop_assert_eq!(&root, &original);

            lens.set(&mut root, value);
            prop_assert_eq!(lens.get(&root), value);
            prop_assert_eq!(root.flag, flag);
        }
    }
}
