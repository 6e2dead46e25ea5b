//! Identity graph and resolver — verified equivalence links and cohort expansion

pub mod graph;
pub mod link;
pub mod resolver;

pub use graph::IdentityGraph;
pub use link::{IdentityLink, LinkMethod};
pub use resolver::{Cohort, DeclaredLink, IdentityResolver, LinkedIdentifierSource};
