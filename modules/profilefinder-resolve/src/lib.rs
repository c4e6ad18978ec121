pub mod acquire;
pub mod canonical;
pub mod enhance;
pub mod extract;
pub mod fingerprint;
pub mod identity;
pub mod normalize;
pub mod pacing;
pub mod page;
pub mod platform;
pub mod provider;
pub mod quota;
pub mod rank;
pub mod resolver;
pub mod similarity;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod verify;

pub use canonical::canonicalize;
pub use extract::{Extractor, Strategy};
pub use identity::Identity;
pub use page::PageContent;
pub use provider::{QueryVariant, ResolutionStep, SearchProvider};
pub use resolver::{AttemptRecord, ResolutionResult, Resolver, ResolverOptions, StepOutcome};
pub use traits::{PacingGate, PageSource, QuotaGate, QuotaUsage};
