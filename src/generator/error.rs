use crate::format::FormatError;
use crate::syntax::SyntaxError;
use std::fmt;
use thiserror::Error;

/// Which synthesized fragment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Import,
    Listener,
    ServiceHeader,
    ResourceHeader,
    BodyBlock,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FragmentKind::Import => "import declaration",
            FragmentKind::Listener => "listener declaration",
            FragmentKind::ServiceHeader => "service declaration",
            FragmentKind::ResourceHeader => "resource method",
            FragmentKind::BodyBlock => "resource body",
        };
        f.write_str(s)
    }
}

/// Index path of the model element a fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FragmentLocation {
    pub module: usize,
    pub import: Option<usize>,
    pub service: Option<usize>,
    pub listener: Option<usize>,
    pub resource: Option<usize>,
}

impl FragmentLocation {
    pub fn module(module: usize) -> Self {
        FragmentLocation {
            module,
            ..Default::default()
        }
    }

    pub fn import(self, idx: usize) -> Self {
        FragmentLocation {
            import: Some(idx),
            ..self
        }
    }

    pub fn service(self, idx: usize) -> Self {
        FragmentLocation {
            service: Some(idx),
            ..self
        }
    }

    pub fn listener(self, idx: usize) -> Self {
        FragmentLocation {
            listener: Some(idx),
            ..self
        }
    }

    pub fn resource(self, idx: usize) -> Self {
        FragmentLocation {
            resource: Some(idx),
            ..self
        }
    }
}

impl fmt::Display for FragmentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modules[{}]", self.module)?;
        if let Some(i) = self.import {
            write!(f, ".imports[{i}]")?;
        }
        if let Some(s) = self.service {
            write!(f, ".services[{s}]")?;
        }
        if let Some(l) = self.listener {
            write!(f, ".listeners[{l}]")?;
        }
        if let Some(r) = self.resource {
            write!(f, ".resources[{r}]")?;
        }
        Ok(())
    }
}

/// Failure of a `generate` call. Every variant aborts the whole generation.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("invalid {kind} at {location}: {source}\n  fragment: {fragment}")]
    FragmentParse {
        kind: FragmentKind,
        location: FragmentLocation,
        fragment: String,
        #[source]
        source: SyntaxError,
    },
    #[error("{kind} fragment at {location} parsed as {found}")]
    UnexpectedNode {
        kind: FragmentKind,
        location: FragmentLocation,
        found: &'static str,
    },
    #[error("failed to render {kind} fragment at {location}: {source}")]
    Template {
        kind: FragmentKind,
        location: FragmentLocation,
        #[source]
        source: askama::Error,
    },
    #[error("failed to format generated source: {0}")]
    Format(#[from] FormatError),
    #[error("failed to write generated source: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    /// Location of the offending fragment, if the error came from one.
    pub fn location(&self) -> Option<FragmentLocation> {
        match self {
            GenerateError::FragmentParse { location, .. }
            | GenerateError::UnexpectedNode { location, .. }
            | GenerateError::Template { location, .. } => Some(*location),
            GenerateError::Format(_) | GenerateError::Io(_) => None,
        }
    }
}
