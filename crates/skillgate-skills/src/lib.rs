//! SKILL.md parsing, corpus scanning, duplicate detection, evolution scoring,
//! and structural validation.

pub mod content;
pub mod error;
pub mod evolution;
pub mod frontmatter;
pub mod loader;
pub mod registry;
pub mod report;
pub mod scripts;
pub mod similarity;
pub mod validator;

pub use error::SkillError;
pub use evolution::EvolutionScore;
pub use frontmatter::{Header, HeaderParser, default_parser};
pub use loader::SkillDescriptor;
pub use registry::SkillRepository;
pub use report::{Advisory, ExitStatus, Report};
pub use similarity::{SimilarityEngine, SimilarityReport};
pub use validator::{StructuralValidator, ValidationReport};
