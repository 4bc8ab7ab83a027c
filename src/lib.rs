//! Expectation and matcher core for behavior-driven tests.
//!
//! ```
//! use bdd_matchers::{Environment, SpecOutcome};
//!
//! let mut env = Environment::default();
//! let report = env.run_spec("adds", |env| {
//!     env.expect(2 + 1).to_be(3)?;
//!     env.expect(3 - 5).not().to_be_greater_than(0)?;
//!     Ok(())
//! });
//! assert_eq!(report.outcome, SpecOutcome::Passed);
//! ```

pub mod asymmetric;
pub mod comparison;
pub mod context;
pub mod engine;
pub mod equality;
pub mod errors;
pub mod expectation;
pub mod expression;
pub mod matchers;
pub mod pretty;
pub mod result;
pub mod scope;
pub mod value;
mod parser;

pub use context::{ComparisonContext, Config};
pub use engine::{evaluate, MatcherResult};
pub use equality::{CustomEqualityTester, MatchersUtil};
pub use errors::{MatchError, Result};
pub use expectation::Expectation;
pub use matchers::{factory, matcher, Comparison, Matcher, MatcherFactory, Registry};
pub use result::{SpecOutcome, SpecReport, SpecResult};
pub use scope::{Environment, ScopeGuard};
pub use value::{Kind, Value};
