pub mod package;
pub mod plan;
pub mod slide;

pub use package::{generate, generate_from_bytes};
pub use plan::SubstitutionPlan;
