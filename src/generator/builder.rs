use askama::Template;
use tracing::{debug, debug_span};

use super::error::{FragmentKind, FragmentLocation, GenerateError};
use super::templates::{
    BodyBlockFragment, ImportFragment, ListenerFragment, ResourceHeaderFragment,
    ServiceHeaderFragment,
};
use crate::config::GeneratorConfig;
use crate::model::{Model, Resource, Service};
use crate::syntax::{
    parse_function_body_block, parse_import_declaration, parse_module_member,
    parse_object_member, CompilationUnit, EndOfInput, ImportDeclaration, ModuleMember,
    ResourceMethod, ServiceDeclaration, SyntaxError,
};

/// Assembles a compilation unit from a model by parsing synthesized fragments.
///
/// All modules are flattened into a single unit: imports first in model
/// order, then for each service its listener declarations followed by the
/// service declaration.
pub struct TreeBuilder<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        TreeBuilder { config }
    }

    /// Build the unit. The first fragment that fails to parse aborts the build.
    pub fn build(&self, model: &Model) -> Result<CompilationUnit, GenerateError> {
        let mut imports = Vec::new();
        let mut members = Vec::new();

        for (module_idx, module) in model.modules.iter().enumerate() {
            let _span = debug_span!("module", index = module_idx, name = %module.module_name).entered();
            let at = FragmentLocation::module(module_idx);

            for (idx, import) in module.imports.iter().enumerate() {
                let fragment = ImportFragment {
                    org: &import.org,
                    module: &import.module,
                };
                imports.push(self.import(fragment, at.import(idx))?);
            }

            if !module.variables.is_empty() {
                debug!(
                    count = module.variables.len(),
                    "module variables are not generated"
                );
            }

            for (service_idx, service) in module.services.iter().enumerate() {
                let service_at = at.service(service_idx);
                let (listeners, service_decl) = self.service(service, service_at)?;
                members.extend(listeners);
                members.push(ModuleMember::Service(service_decl));
            }
        }

        debug!(
            imports = imports.len(),
            members = members.len(),
            "assembled compilation unit"
        );
        Ok(CompilationUnit::new(imports, members, EndOfInput))
    }

    fn import(
        &self,
        fragment: ImportFragment<'_>,
        at: FragmentLocation,
    ) -> Result<ImportDeclaration, GenerateError> {
        let text = render(&fragment, FragmentKind::Import, at)?;
        parse_fragment(&text, FragmentKind::Import, at, parse_import_declaration)
    }

    /// Listener declarations (in service order) and the completed service.
    fn service(
        &self,
        service: &Service,
        at: FragmentLocation,
    ) -> Result<(Vec<ModuleMember>, ServiceDeclaration), GenerateError> {
        let mut listeners = Vec::with_capacity(service.listeners.len());
        for (idx, listener) in service.listeners.iter().enumerate() {
            let listener_at = at.listener(idx);
            let fragment = ListenerFragment {
                listener_type: &self.config.listener_type,
                name: &listener.name,
                port: listener.port.to_string(),
            };
            let text = render(&fragment, FragmentKind::Listener, listener_at)?;
            let member = parse_fragment(&text, FragmentKind::Listener, listener_at, parse_module_member)?;
            if !matches!(member, ModuleMember::Listener(_)) {
                return Err(GenerateError::UnexpectedNode {
                    kind: FragmentKind::Listener,
                    location: listener_at,
                    found: member.kind(),
                });
            }
            listeners.push(member);
        }

        let header = ServiceHeaderFragment {
            base_path: &service.base_path,
            listeners: service.listeners.iter().map(|l| l.name.as_str()).collect(),
        };
        let text = render(&header, FragmentKind::ServiceHeader, at)?;
        let service_decl =
            match parse_fragment(&text, FragmentKind::ServiceHeader, at, parse_module_member)? {
                ModuleMember::Service(decl) => decl,
                other => {
                    return Err(GenerateError::UnexpectedNode {
                        kind: FragmentKind::ServiceHeader,
                        location: at,
                        found: other.kind(),
                    })
                }
            };

        let methods = service
            .resources
            .iter()
            .enumerate()
            .map(|(idx, resource)| self.resource_method(resource, at.resource(idx)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            base_path = %service.base_path,
            listeners = listeners.len(),
            resources = methods.len(),
            "built service declaration"
        );
        Ok((listeners, service_decl.with_members(methods)))
    }

    /// Parse the method header and body separately, then graft the body.
    fn resource_method(
        &self,
        resource: &Resource,
        at: FragmentLocation,
    ) -> Result<ResourceMethod, GenerateError> {
        let header = ResourceHeaderFragment {
            method: &resource.resource_method_name,
            path: &resource.path,
            return_type: &resource.return_type,
        };
        let text = render(&header, FragmentKind::ResourceHeader, at)?;
        let method = parse_fragment(&text, FragmentKind::ResourceHeader, at, parse_object_member)?;

        let body = BodyBlockFragment {
            statements: resource
                .body
                .iter()
                .map(|s| s.stmt.as_str())
                .collect::<String>(),
        };
        let text = render(&body, FragmentKind::BodyBlock, at)?;
        let block = parse_fragment(&text, FragmentKind::BodyBlock, at, parse_function_body_block)?;

        Ok(method.with_body(block))
    }
}

fn render<T: Template>(
    fragment: &T,
    kind: FragmentKind,
    location: FragmentLocation,
) -> Result<String, GenerateError> {
    fragment.render().map_err(|source| GenerateError::Template {
        kind,
        location,
        source,
    })
}

fn parse_fragment<T>(
    text: &str,
    kind: FragmentKind,
    location: FragmentLocation,
    parse: fn(&str) -> Result<T, SyntaxError>,
) -> Result<T, GenerateError> {
    debug!(%kind, %location, fragment = text, "parsing fragment");
    parse(text).map_err(|source| GenerateError::FragmentParse {
        kind,
        location,
        fragment: text.to_string(),
        source,
    })
}
