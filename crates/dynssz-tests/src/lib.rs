//! Property testing macros for types hashed with strata-dynssz.
//!
//! The main export is the `generate_root_tests!` macro.

// Re-export dependencies for macro usage
pub use paste;
pub use proptest;
pub use strata_dynssz;

/// Generates property tests for the hash tree root of a type.
///
/// This macro creates property-based tests to verify that:
/// 1. Hashing is deterministic across calls and engines
/// 2. The precompiled routine and the generic walk agree when no spec value overrides a size
/// 3. Different inputs produce different roots
///
/// An optional third argument gives the spec values to hash under.  It must
/// not override any size the type's precompiled routine depends on.
///
/// # Requirements
///
/// The type must implement:
/// - `strata_dynssz::SszType` and `strata_dynssz::SszValue` - usually derived
/// - `proptest::arbitrary::Arbitrary` - for generating test values
/// - `Debug + PartialEq` - for test assertions
///
/// # Example
/// ```ignore
/// use strata_dynssz_tests::generate_root_tests;
/// use strata_dynssz::SszReflect;
/// use proptest::prelude::*;
///
/// #[derive(Debug, Clone, PartialEq, SszReflect)]
/// struct MyType {
///     #[ssz(max = "16")]
///     field: Vec<u32>,
/// }
///
/// impl Arbitrary for MyType {
///     type Parameters = ();
///     type Strategy = BoxedStrategy<MyType>;
///
///     fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
///         prop::collection::vec(any::<u32>(), 0..=16)
///             .prop_map(|field| MyType { field })
///             .boxed()
///     }
/// }
///
/// generate_root_tests!(MyType, "my_type");
/// ```
#[macro_export]
macro_rules! generate_root_tests {
    ($type:ty, $name:expr) => {
        $crate::generate_root_tests!($type, $name, $crate::strata_dynssz::SpecValues::new());
    };
    ($type:ty, $name:expr, $spec:expr) => {
        $crate::paste::paste! {
            mod [<proptest_ $name _root>] {
                use super::*;
                use $crate::proptest::prelude::{any, prop_assert_eq, prop_assert_ne, prop_assume};
                use $crate::strata_dynssz::{DynSsz, DynSszConfig};

                fn fast() -> DynSsz {
                    DynSsz::new($spec)
                }

                fn generic() -> DynSsz {
                    DynSsz::new($spec).with_config(DynSszConfig::new().with_no_fast_path(true))
                }

                $crate::proptest::proptest! {
                    #[test]
                    fn [<test_root_deterministic>](value in any::<$type>()) {
                        let engine = fast();
                        let root1 = engine.hash_tree_root(&value).expect("test: hashing should succeed");
                        let root2 = engine.hash_tree_root(&value).expect("test: hashing should succeed");
                        let root3 = fast().hash_tree_root(&value).expect("test: hashing should succeed");
                        prop_assert_eq!(root1, root2, "test: unexpected inequality");
                        prop_assert_eq!(root1, root3, "test: unexpected inequality");
                    }

                    #[test]
                    fn [<test_root_fast_generic_equivalence>](value in any::<$type>()) {
                        let fast_root = fast().hash_tree_root(&value).expect("test: fast path should succeed");
                        let generic_root = generic().hash_tree_root(&value).expect("test: generic path should succeed");
                        prop_assert_eq!(fast_root, generic_root);
                    }

                    #[test]
                    fn [<test_root_different_inputs>](
                        value1 in any::<$type>(),
                        value2 in any::<$type>()
                    ) {
                        prop_assume!(value1 != value2);
                        let engine = fast();
                        let root1 = engine.hash_tree_root(&value1).expect("test: hashing should succeed");
                        let root2 = engine.hash_tree_root(&value2).expect("test: hashing should succeed");
                        prop_assert_ne!(root1, root2, "test: unexpected equality");
                    }
                }
            }
        }
    };
}
