//! Brute force language comparisons used to cross-check the equivalence
//! checker in tests.

pub mod same_language;
