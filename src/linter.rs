//! # Model Linter Module
//!
//! Checks a service model for problems that would make generation fail or
//! produce surprising output, before any fragment is parsed.
//!
//! ## Checks Performed
//!
//! 1. **Listener names** - Must be valid identifiers and unique across the
//!    generated unit (all modules share one namespace after flattening)
//! 2. **Services without listeners** - Generate an empty `on` clause
//! 3. **Resource methods** - Should be a known HTTP accessor; a
//!    `(method, path)` pair may appear only once per service
//! 4. **Empty bodies** - Resources with no statements
//! 5. **Listener type import** - The module prefix of the listener type
//!    (`http` in `http:Listener`) should be imported
//!
//! Resource bodies are never inspected; they are parsed during generation.
//!
//! ## Usage
//!
//! ```rust
//! use balgen::config::GeneratorConfig;
//! use balgen::linter::{lint_model, LintSeverity};
//! use balgen::model::Model;
//!
//! let issues = lint_model(&Model::default(), &GeneratorConfig::default());
//! assert!(issues.iter().all(|i| i.severity != LintSeverity::Error));
//! ```

use crate::config::GeneratorConfig;
use crate::generator::FragmentLocation;
use crate::model::{Model, Service};
use crate::syntax::is_identifier;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};


/// Accessors accepted without a warning.
pub const RESOURCE_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "head", "options", "default",
];

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintSeverity {
    /// Error - Will cause generation to fail or emit invalid source
    Error,
    /// Warning - Generates, but probably not what was intended
    Warning,
    /// Info - Worth a look
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A lint issue found in a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Model element path (e.g., "modules[0].services[1].listeners[0]")
    pub location: String,
    pub severity: LintSeverity,
    /// Type of lint issue (e.g., "duplicate_listener")
    pub kind: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Lint a model. Issues are returned in model order.
pub fn lint_model(model: &Model, config: &GeneratorConfig) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut listener_names: HashMap<&str, FragmentLocation> = HashMap::new();
    let mut any_listener = false;

    for (module_idx, module) in model.modules.iter().enumerate() {
        let at = FragmentLocation::module(module_idx);
        for (service_idx, service) in module.services.iter().enumerate() {
            let service_at = at.service(service_idx);
            any_listener |= !service.listeners.is_empty();
            lint_listeners(&mut issues, &mut listener_names, service, service_at);
            lint_resources(&mut issues, service, service_at);
        }
    }

    if any_listener {
        lint_listener_import(&mut issues, model, config);
    }
    issues
}

fn lint_listeners<'m>(
    issues: &mut Vec<LintIssue>,
    seen: &mut HashMap<&'m str, FragmentLocation>,
    service: &'m Service,
    at: FragmentLocation,
) {
    if service.listeners.is_empty() {
        issues.push(
            LintIssue::new(
                at.to_string(),
                LintSeverity::Warning,
                "no_listeners",
                format!(
                    "Service '{}' is not attached to any listener",
                    service.base_path
                ),
            )
            .with_suggestion("Add at least one listener so the service is reachable"),
        );
    }

    for (idx, listener) in service.listeners.iter().enumerate() {
        let listener_at = at.listener(idx);
        if !is_identifier(&listener.name) {
            issues.push(
                LintIssue::new(
                    listener_at.to_string(),
                    LintSeverity::Error,
                    "invalid_listener_name",
                    format!("Listener name '{}' is not a valid identifier", listener.name),
                )
                .with_suggestion(format!(
                    "Use letters, digits and underscores, e.g., '{}'",
                    sanitize_identifier(&listener.name)
                )),
            );
        }
        if let Some(first) = seen.insert(listener.name.as_str(), listener_at) {
            issues.push(LintIssue::new(
                listener_at.to_string(),
                LintSeverity::Error,
                "duplicate_listener",
                format!(
                    "Listener '{}' is already declared at {}",
                    listener.name, first
                ),
            ));
        }
    }
}

fn lint_resources(issues: &mut Vec<LintIssue>, service: &Service, at: FragmentLocation) {
    let mut seen = HashSet::new();
    for (idx, resource) in service.resources.iter().enumerate() {
        let resource_at = at.resource(idx);
        let method = resource.resource_method_name.as_str();

        if !RESOURCE_METHODS.contains(&method) {
            let mut issue = LintIssue::new(
                resource_at.to_string(),
                LintSeverity::Warning,
                "unknown_resource_method",
                format!("Resource method '{method}' is not a known accessor"),
            );
            let lower = method.to_ascii_lowercase();
            if RESOURCE_METHODS.contains(&lower.as_str()) {
                issue = issue.with_suggestion(format!("Accessors are lowercase: '{lower}'"));
            }
            issues.push(issue);
        }

        if !seen.insert((method, resource.path.as_str())) {
            issues.push(LintIssue::new(
                resource_at.to_string(),
                LintSeverity::Error,
                "duplicate_resource",
                format!(
                    "Resource '{method} {}' is declared more than once in service '{}'",
                    resource.path, service.base_path
                ),
            ));
        }

        if resource.body.is_empty() {
            issues.push(LintIssue::new(
                resource_at.to_string(),
                LintSeverity::Info,
                "empty_resource_body",
                format!("Resource '{method} {}' has an empty body", resource.path),
            ));
        }
    }
}

fn lint_listener_import(issues: &mut Vec<LintIssue>, model: &Model, config: &GeneratorConfig) {
    let Some((prefix, _)) = config.listener_type.split_once(':') else {
        return;
    };
    let imported = model
        .modules
        .iter()
        .flat_map(|m| &m.imports)
        .any(|import| import.module.rsplit('.').next() == Some(prefix));
    if !imported {
        issues.push(
            LintIssue::new(
                "model",
                LintSeverity::Warning,
                "missing_import",
                format!(
                    "Listener type '{}' uses module prefix '{prefix}', which no module imports",
                    config.listener_type
                ),
            )
            .with_suggestion(format!("Import the module providing '{prefix}', e.g., ballerina/{prefix}")),
        );
    }
}

/// Replace characters that cannot appear in an identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Write lint issues grouped by severity
pub fn write_lint_issues<W: Write>(issues: &[LintIssue], out: &mut W) -> io::Result<()> {
    if issues.is_empty() {
        writeln!(out, "✅ No lint issues found!")?;
        return Ok(());
    }

    let count = |severity| issues.iter().filter(|i| i.severity == severity).count();
    writeln!(out, "\n📋 Lint Results:")?;
    writeln!(
        out,
        "   {} error(s), {} warning(s), {} info(s)\n",
        count(LintSeverity::Error),
        count(LintSeverity::Warning),
        count(LintSeverity::Info)
    )?;

    let groups = [
        (LintSeverity::Error, "❌ Errors (must fix):"),
        (LintSeverity::Warning, "⚠️  Warnings (should fix):"),
        (LintSeverity::Info, "ℹ️  Info:"),
    ];
    for (severity, heading) in groups {
        let mut group = issues.iter().filter(|i| i.severity == severity).peekable();
        if group.peek().is_none() {
            continue;
        }
        writeln!(out, "{heading}")?;
        for issue in group {
            writeln!(out, "   [{}] {}", issue.kind, issue.location)?;
            writeln!(out, "      {}", issue.message)?;
            if let Some(suggestion) = &issue.suggestion {
                writeln!(out, "      💡 Suggestion: {suggestion}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print lint issues to stdout
pub fn print_lint_issues(issues: &[LintIssue]) {
    if let Err(err) = write_lint_issues(issues, &mut io::stdout().lock()) {
        tracing::warn!(error = %err, "failed to write lint report");
    }
}

/// Fail if there are any error-level lint issues
pub fn fail_if_errors(issues: &[LintIssue]) -> anyhow::Result<()> {
    let errors = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("model has {errors} lint error(s)");
    }
    Ok(())
}
