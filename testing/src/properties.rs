//! Property checks for lenses and case paths
//!
//! Each check returns a `TestCaseError` on violation, so it slots straight
//! into a `proptest!` body with `?`:
//!
//! ```
//! use proptest::prelude::*;
//! use reducer_kit_core::Lens;
//! use reducer_kit_testing::properties::assert_lens_laws;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct AppState {
//!     count: i64,
//!     favorites: Vec<i64>,
//! }
//!
//! proptest! {
//!     fn count_lens(count in any::<i64>(), value in any::<i64>()) {
//!         let lens = Lens::new(|s: &AppState| s.count, |s: &mut AppState, v| s.count = v);
//!         assert_lens_laws(&lens, AppState { count, favorites: vec![] }, value)?;
//!     }
//! }
//! # count_lens();
//! ```

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use reducer_kit_core::{CasePath, Lens};
use std::fmt::Debug;

/// Check the three lens laws for one root and one value
///
/// - get-set: writing back what was read leaves the root unchanged
/// - set-get: reading after a write returns the written value
/// - set-set: a second write fully replaces the first
///
/// # Errors
///
/// Returns a failed test case naming the law that does not hold.
pub fn assert_lens_laws<Root, Value>(lens: &Lens<Root, Value>, root: Root, value: Value) -> Result<(), TestCaseError>
where
    Root: Clone + PartialEq + Debug,
    Value: Clone + PartialEq + Debug,
{
    let mut unchanged = root.clone();
    let current = lens.get(&unchanged);
    lens.set(&mut unchanged, current);
    prop_assert_eq!(&unchanged, &root, "get-set law violated");

    let mut written = root.clone();
    lens.set(&mut written, value.clone());
    prop_assert_eq!(lens.get(&written), value.clone(), "set-get law violated");

    let mut twice = root.clone();
    lens.set(&mut twice, lens.get(&root));
    lens.set(&mut twice, value);
    prop_assert_eq!(&twice, &written, "set-set law violated");

    Ok(())
}

/// Check the case path laws for one value and a set of roots
///
/// - embed-extract: extracting an embedded value returns it
/// - extract-embed: a root that extracts re-embeds to itself
///
/// Roots that belong to other cases must extract to `None`; pass them in
/// `other_cases`.
///
/// # Errors
///
/// Returns a failed test case naming the law that does not hold.
pub fn assert_case_path_laws<Root, Value>(
    case: &CasePath<Root, Value>,
    value: Value,
    other_cases: impl IntoIterator<Item = Root>,
) -> Result<(), TestCaseError>
where
    Root: Clone + PartialEq + Debug,
    Value: Clone + PartialEq + Debug,
{
    let root = case.embed(value.clone());
    prop_assert_eq!(case.extract(root.clone()), Some(value), "embed-extract law violated");

    if let Some(extracted) = case.extract(root.clone()) {
        prop_assert_eq!(case.embed(extracted), root, "extract-embed law violated");
    }

    for other in other_cases {
        prop_assert!(
            case.extract(other.clone()).is_none(),
            "{:?} extracted through a case path for another case",
            other
        );
    }

    Ok(())
}
