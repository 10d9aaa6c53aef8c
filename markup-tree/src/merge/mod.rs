//! Structural merging of two markup trees.

pub mod comparator;
pub mod engine;

pub use comparator::{Comparator, ComparatorRules, KeyedComparator, TagNameComparator};
pub use engine::{
    import, merge, merge_with_options, merge_with_stats, Alignment, MergeError, MergeOptions,
    MergeStats,
};
