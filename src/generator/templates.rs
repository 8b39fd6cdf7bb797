//! Source fragments synthesized from model fields.
//!
//! Each fragment is an independently parseable piece of target-language text.
//! The tree builder renders a fragment, then hands it to the matching parser
//! entry point.

use askama::Template;

/// `import <org>/<module>;`, or `import <module>;` when `org` is empty.
#[derive(Template)]
#[template(
    source = "{% if org.is_empty() %}import {{ module }};{% else %}import {{ org }}/{{ module }};{% endif %}",
    ext = "txt",
    escape = "none"
)]
pub struct ImportFragment<'a> {
    pub org: &'a str,
    pub module: &'a str,
}

/// `listener <type> <name> = new (<port>);`
#[derive(Template)]
#[template(
    source = "listener {{ listener_type }} {{ name }} = new ({{ port }});",
    ext = "txt",
    escape = "none"
)]
pub struct ListenerFragment<'a> {
    pub listener_type: &'a str,
    pub name: &'a str,
    pub port: String,
}

/// Service header with an empty body; listener names are comma joined in
/// declaration order.
#[derive(Template)]
#[template(
    source = "service {{ base_path }} on {% for name in listeners %}{{ name }}{% if !loop.last %}, {% endif %}{% endfor %} { }",
    ext = "txt",
    escape = "none"
)]
pub struct ServiceHeaderFragment<'a> {
    pub base_path: &'a str,
    pub listeners: Vec<&'a str>,
}

/// Resource method with an empty body, grafted with the real body later.
#[derive(Template)]
#[template(
    source = "resource function {{ method }} {{ path }}(){% if !return_type.is_empty() %} returns {{ return_type }}{% endif %} {}",
    ext = "txt",
    escape = "none"
)]
pub struct ResourceHeaderFragment<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub return_type: &'a str,
}

/// Body statements joined without a separator and wrapped in braces.
#[derive(Template)]
#[template(source = "{ {{ statements }} }", ext = "txt", escape = "none")]
pub struct BodyBlockFragment {
    pub statements: String,
}
