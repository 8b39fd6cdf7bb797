//! # Generator Module
//!
//! Turns a service [`Model`] into formatted source text for the target
//! language.
//!
//! ## Architecture
//!
//! ```text
//! Model → Fragments (askama) → Fragment Parsers → Grafting → CompilationUnit → Printer → stdout
//! ```
//!
//! 1. **Tree Builder** ([`TreeBuilder`]) - renders one small source fragment
//!    per model element, parses each with the matching grammar entry point
//!    and assembles the nodes into a single compilation unit
//! 2. **Renderer** ([`Renderer`]) - formats the unit canonically and writes
//!    it between two separator lines
//!
//! Resource method headers and bodies are parsed separately. The header is
//! rendered with an empty `{}` body and the real body, built by joining the
//! resource's statement fragments, is parsed as a standalone block and
//! grafted on with [`ResourceMethod::with_body`](crate::syntax::ResourceMethod::with_body).
//!
//! ## Output Order
//!
//! All modules are flattened into one unit. Imports come first in model
//! order. Each service contributes its listener declarations, in service
//! order, immediately followed by the service declaration itself.
//!
//! ## Usage
//!
//! ```rust
//! use balgen::config::GeneratorConfig;
//! use balgen::generator::Generator;
//! use balgen::model::{BodyStatement, Import, Listener, Model, Module, Resource, Service};
//!
//! let model = Model {
//!     default_package: None,
//!     modules: vec![Module {
//!         module_name: "greeting".into(),
//!         imports: vec![Import::new("ballerina", "http")],
//!         variables: vec![],
//!         services: vec![Service {
//!             base_path: "/greeting".into(),
//!             listeners: vec![Listener::new("l1", 9090)],
//!             resources: vec![Resource {
//!                 resource_method_name: "get".into(),
//!                 path: "sayHello".into(),
//!                 return_type: "string".into(),
//!                 body: vec![BodyStatement::new(r#"return "Hello";"#)],
//!             }],
//!         }],
//!     }],
//! };
//!
//! let mut out = Vec::new();
//! let source = Generator::new(GeneratorConfig::default())
//!     .generate_to(&model, &mut out)
//!     .unwrap();
//! assert!(source.contains("listener http:Listener l1 = new (9090);"));
//! ```
//!
//! ## Errors
//!
//! Generation is all or nothing. A fragment that does not parse aborts with
//! [`GenerateError::FragmentParse`], which names the fragment kind, the
//! offending text and its [`FragmentLocation`] in the model. Nothing is
//! written to the output when any step fails.

mod builder;
mod error;
mod render;
mod templates;

pub use builder::TreeBuilder;
pub use error::{FragmentKind, FragmentLocation, GenerateError};
pub use render::Renderer;
pub use templates::{
    BodyBlockFragment, ImportFragment, ListenerFragment, ResourceHeaderFragment,
    ServiceHeaderFragment,
};

use crate::config::GeneratorConfig;
use crate::model::Model;
use std::io::Write;
use tracing::info;

/// Both generation phases behind one call.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate source for `model` and print it, framed, to stdout.
    ///
    /// Returns the unframed source text.
    pub fn generate(&self, model: &Model) -> Result<String, GenerateError> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.generate_to(model, &mut lock)
    }

    /// Same as [`Generator::generate`] with an explicit output sink.
    pub fn generate_to<W: Write>(&self, model: &Model, out: &mut W) -> Result<String, GenerateError> {
        let unit = TreeBuilder::new(&self.config).build(model)?;
        let renderer = Renderer::new(&self.config);
        let text = renderer.render(&unit)?;
        renderer.emit(&text, out)?;
        info!(
            modules = model.modules.len(),
            imports = unit.imports.len(),
            members = unit.members.len(),
            "generated service source"
        );
        Ok(text)
    }
}
