//! # balgen
//!
//! **balgen** generates well-formed service source code from a semantic
//! service model. Instead of concatenating strings, every piece of output is
//! parsed by the target language's grammar before it becomes part of the
//! syntax tree, and the finished tree is printed by a canonical formatter.
//!
//! ## Architecture
//!
//! - **[`model`]** - The service model (modules, imports, listeners,
//!   services, resources) and YAML/JSON loading
//! - **[`syntax`]** - pest grammar, syntax tree and fragment parsers for the
//!   target grammar
//! - **[`generator`]** - Tree builder (fragments, parsing, grafting) and
//!   renderer
//! - **[`format`]** - Canonical pretty-printer
//! - **[`linter`]** - Model checks run before generation
//! - **[`config`]** - `balgen.toml` and environment overrides
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `balgen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(balgen)
//!     participant Model as model::load_model
//!     participant Builder as generator::TreeBuilder
//!     participant Templates as generator::templates
//!     participant Parser as syntax::parse_*
//!     participant Renderer as generator::Renderer
//!     participant Printer as format::Printer
//!
//!     User->>CLI: balgen generate --model service.yaml
//!     CLI->>Model: load_model("service.yaml")
//!     Model-->>CLI: Model
//!
//!     CLI->>Builder: build(&model)
//!     loop every import, listener, service, resource
//!         Builder->>Templates: render fragment
//!         Templates-->>Builder: fragment text
//!         Builder->>Parser: parse fragment
//!         Parser-->>Builder: syntax node
//!     end
//!     Builder->>Builder: graft bodies into methods,<br/>methods into services
//!     Builder-->>CLI: CompilationUnit
//!
//!     CLI->>Renderer: render(&unit)
//!     Renderer->>Printer: print_unit(&unit)
//!     Printer-->>Renderer: canonical text
//!     Renderer-->>User: ==== text ==== on stdout
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use balgen::config::GeneratorConfig;
//! use balgen::generator::Generator;
//! use balgen::model::parse_model;
//!
//! let model = parse_model(
//!     r#"
//! modules:
//!   - imports: [{org: ballerina, module: http}]
//!     services:
//!       - basePath: /greeting
//!         listeners: [{name: l1, port: 9090}]
//!         resources:
//!           - resourceMethodName: get
//!             path: sayHello
//!             returnType: string
//!             body: [{stmt: 'return "Hello";'}]
//! "#,
//!     true,
//! )
//! .unwrap();
//!
//! let mut out = Vec::new();
//! let source = Generator::new(GeneratorConfig::default())
//!     .generate_to(&model, &mut out)
//!     .unwrap();
//! assert!(source.starts_with("import ballerina/http;\n"));
//! ```

pub mod cli;
pub mod config;
pub mod format;
pub mod generator;
pub mod linter;
pub mod logging;
pub mod model;
pub mod syntax;

pub use config::GeneratorConfig;
pub use generator::{GenerateError, Generator};
pub use model::Model;
