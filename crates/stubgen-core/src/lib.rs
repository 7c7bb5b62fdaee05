//! stubgen core
//!
//! Build-time orchestration for interface stub generation: resolve the
//! requested interface types, hand each to an external generator, then compile
//! everything it produced with one external compiler run.
//!
//! # Architecture
//!
//! The pipeline runs top to bottom:
//!
//! 1. [`ClasspathBuilder`] - union of resolved dependencies and explicit
//!    entries, minus what the running process already sees, in a fixed order
//! 2. [`TypeResolver`] + [`Generator`] - one generator call per interface,
//!    files accumulated in generation order
//! 3. [`CompilerInvocationBuilder`] - `[-source L] [-target L] [-g] -cp CP -d DIR FILES...`
//! 4. [`stubgen_exec::ProcessRunner`] - runs the compiler with both output
//!    streams captured
//!
//! Type resolution, generation and dependency resolution are external
//! collaborators behind traits; see [`collaborators`].
//!
//! # Example
//!
//! ```ignore
//! use stubgen_core::{Orchestrator, OrchestratorConfig, StaticDependencyResolver};
//!
//! let config = OrchestratorConfig::with_base_dir("/work/project")
//!     .interface("com.acme.billing.InvoiceService")
//!     .classpath_element("target/classes");
//! let report = Orchestrator::with_config(config).run(&resolver, &generator, &deps)?;
//! println!("compiled {} files", report.generated_files.len());
//! ```
//!
//! # Crate Structure
//!
//! - [`classpath`] - Classpath canonicalization, exclusion and ordering
//! - [`collaborators`] - Type resolver, generator and dependency resolver traits
//! - [`invocation`] - Compiler argument assembly
//! - [`settings`] - Compiler settings, including pom.xml parsing
//! - [`orchestrator`] - The end-to-end pipeline
//! - [`error`] - Error types

pub mod classpath;
pub mod collaborators;
pub mod error;
pub mod invocation;
pub mod orchestrator;
pub mod settings;

pub use classpath::{ClasspathBuilder, ClasspathEntry, ClasspathSet, PathListSeparator};
pub use collaborators::{
    DependencyResolver, Generator, ResolvedDependencies, StaticDependencyResolver, TypeHandle,
    TypeResolver,
};
pub use error::{StubgenError, StubgenResult};
pub use invocation::{CompilerInvocation, CompilerInvocationBuilder, GeneratedFileSet};
pub use orchestrator::{BuildReport, Orchestrator, OrchestratorConfig};
pub use settings::CompilerSettings;

pub use stubgen_exec::{Fault, FaultKind, ProcessExecutionResult};
