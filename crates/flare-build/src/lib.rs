//! Flare build orchestration
//!
//! Wires per-project task graphs that shell out to the external
//! ActionScript compiler toolchain. Provides:
//! - Dependency resolution across project and file-collection entries
//! - Command-line synthesis for the archive (compc) and executable (mxmlc)
//!   compilers, with override-order-exact argument lists
//! - Class enumeration for embed-all-classes executable builds
//! - Task graph construction, scheduling, and cycle detection
//! - Step execution with fingerprint-based up-to-date skips
//! - IDE module descriptor generation

pub mod classlist;
pub mod command;
pub mod deps;
pub mod error;
pub mod executor;
pub mod fingerprint;
pub mod graph;
pub mod ide;
pub mod layout;
pub mod planner;
pub mod step;
pub mod xml;

// Re-export main types
pub use classlist::ClassManifest;
pub use command::CommandInputs;
pub use deps::DependencyEntry;
pub use error::{BuildError, BuildResult};
pub use executor::{Executor, RunSummary, StepOutcome};
pub use fingerprint::Fingerprint;
pub use graph::TaskGraph;
pub use ide::IdeDescriptor;
pub use layout::Layout;
pub use planner::{step_id, BuildPlan, Planner};
pub use step::{BuildStep, CompilerInvocation, StepAction, StepBuilder};
pub use xml::{XmlElement, XmlNode};

// Re-export flare-config types for convenience
pub use flare_config::{ProjectConfig, Sdk, SwfKind};
