//! Test infrastructure for tagtree
//!
//! Provides fixture loading, stochastic input variations, random tree
//! generation and tree flattening for comparisons.

mod loader;
mod harness;
mod generators;

pub use loader::{TestCase, ExpectedEvent, load_fixtures_by_name};
pub use harness::{run_test, run_with_variations, flatten, error_name};
pub use generators::Gen;
