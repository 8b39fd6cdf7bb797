use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Semantic description of the services to generate.
///
/// Supplied fully populated by an external collaborator; the generator only
/// reads it. Declaration order everywhere is preserved in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default)]
    pub default_package: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub imports: Vec<Import>,
    /// Module-level variables. Carried by the model but not generated.
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub org: String,
    pub module: String,
}

impl Import {
    pub fn new(org: impl Into<String>, module: impl Into<String>) -> Self {
        Import {
            org: org.into(),
            module: module.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub expr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub listeners: Vec<Listener>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Listener port: a number in most models, but any expression text is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListenerPort {
    Number(u16),
    Expr(String),
}

impl<'de> Deserialize<'de> for ListenerPort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|port| u16::try_from(port).ok())
                .map(ListenerPort::Number)
                .ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "listener port {n} is out of range (expected 0-65535)"
                    ))
                }),
            serde_json::Value::String(expr) => Ok(ListenerPort::Expr(expr)),
            other => Err(serde::de::Error::custom(format!(
                "listener port must be a number or an expression string, found {other}"
            ))),
        }
    }
}

impl fmt::Display for ListenerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerPort::Number(n) => write!(f, "{n}"),
            ListenerPort::Expr(e) => f.write_str(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub name: String,
    pub port: ListenerPort,
}

impl Listener {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Listener {
            name: name.into(),
            port: ListenerPort::Number(port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// HTTP-style accessor such as `get` or `post`
    pub resource_method_name: String,
    pub path: String,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub body: Vec<BodyStatement>,
}

/// One pre-rendered statement, including its own terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyStatement {
    pub stmt: String,
}

impl BodyStatement {
    pub fn new(stmt: impl Into<String>) -> Self {
        BodyStatement { stmt: stmt.into() }
    }
}
