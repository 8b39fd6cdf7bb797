#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end generation from model files

use balgen::config::GeneratorConfig;
use balgen::generator::{FragmentKind, GenerateError, Generator, Renderer, TreeBuilder};
use balgen::model::{load_model, parse_model, Model};
use balgen::syntax::{parse_compilation_unit, ModuleMember};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn generate(model: &Model) -> (String, String) {
    let mut out = Vec::new();
    let source = Generator::new(GeneratorConfig::default())
        .generate_to(model, &mut out)
        .unwrap();
    (source, String::from_utf8(out).unwrap())
}

/// Collapse all whitespace runs to one space.
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn test_greeting_end_to_end() {
    let model = load_model(&fixture("greeting.yaml")).unwrap();
    let (source, framed) = generate(&model);

    let separator = "=".repeat(44);
    assert_eq!(framed, format!("{separator}\n{source}{separator}\n"));

    let import = source.find("import ballerina/http;").unwrap();
    let listener = source
        .find("listener http:Listener l1 = new (9090);")
        .unwrap();
    let service = source.find("service /greeting on l1 {").unwrap();
    assert!(import < listener && listener < service);
    assert!(squash(&source).contains(
        r#"service /greeting on l1 { resource function get sayHello() returns string { return "Hello"; } }"#
    ));
}

#[test]
fn test_multi_module_output() {
    let model = load_model(&fixture("shop.json")).unwrap();
    let (source, _) = generate(&model);
    assert_eq!(
        source,
        r#"import ballerina/http;
import ballerina/log;

listener http:Listener public = new (8080);

listener http:Listener internal = new (8081);

service /catalog on public, internal {
    resource function get items() returns json {
        json[] items = [];
        foreach int i in [1, 2, 3] {
            items.push({id: i, name: "item"});
        }
        log:printInfo("listed items");
        return items;
    }

    resource function post items() returns json|error {
        json payload = {status: "created"};
        return payload;
    }
}

listener http:Listener orders = new (9000);

service /orders on orders {
    resource function get count() returns int {
        int total = 0;
        while total < 10 {
            total += 1;
        }
        return total;
    }

    resource function delete all() {
    }
}
"#
    );
}

#[test]
fn test_import_order_matches_model() {
    let model = load_model(&fixture("shop.json")).unwrap();
    let (source, _) = generate(&model);
    let expected: Vec<String> = model
        .modules
        .iter()
        .flat_map(|m| &m.imports)
        .map(|i| format!("import {}/{};", i.org, i.module))
        .collect();
    let actual: Vec<&str> = source
        .lines()
        .filter(|l| l.starts_with("import "))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_listeners_precede_their_service() {
    let model = load_model(&fixture("shop.json")).unwrap();
    let unit = TreeBuilder::new(&GeneratorConfig::default())
        .build(&model)
        .unwrap();

    let mut pending = Vec::new();
    let services = model.modules.iter().flat_map(|m| &m.services);
    let mut members = unit.members.iter();
    for service in services {
        for listener in &service.listeners {
            let Some(ModuleMember::Listener(decl)) = members.next() else {
                panic!("expected listener {}", listener.name);
            };
            assert_eq!(decl.name.as_str(), listener.name);
            pending.push(decl.name.as_str());
        }
        let Some(ModuleMember::Service(decl)) = members.next() else {
            panic!("expected service {}", service.base_path);
        };
        assert_eq!(decl.listeners.len(), pending.len());
        assert_eq!(decl.members.len(), service.resources.len());
        pending.clear();
    }
    assert!(members.next().is_none());
}

#[test]
fn test_output_round_trips() {
    for name in ["greeting.yaml", "shop.json"] {
        let model = load_model(&fixture(name)).unwrap();
        let config = GeneratorConfig::default();
        let unit = TreeBuilder::new(&config).build(&model).unwrap();
        let text = Renderer::new(&config).render(&unit).unwrap();
        let reparsed = parse_compilation_unit(&text).unwrap();
        assert_eq!(reparsed, unit, "round trip changed the tree for {name}");
    }
}

#[test]
fn test_unframed_output() {
    let model = load_model(&fixture("greeting.yaml")).unwrap();
    let config = GeneratorConfig {
        frame_output: false,
        ..Default::default()
    };
    let mut out = Vec::new();
    let source = Generator::new(config).generate_to(&model, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), source);
}

#[test]
fn test_bad_body_aborts_generation() {
    let model = load_model(&fixture("bad_body.yaml")).unwrap();
    let mut out = Vec::new();
    let err = Generator::new(GeneratorConfig::default())
        .generate_to(&model, &mut out)
        .unwrap_err();
    assert!(out.is_empty(), "no partial output expected");

    let GenerateError::FragmentParse {
        kind,
        location,
        fragment,
        ..
    } = &err
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*kind, FragmentKind::BodyBlock);
    assert_eq!(location.to_string(), "modules[0].services[0].resources[1]");
    assert_eq!(fragment, r#"{ return "missing semicolon" }"#);
}

/// Single-resource model whose body is `stmt`.
fn model_with_body(stmt: &str) -> Model {
    let yaml = format!(
        r#"
modules:
  - moduleName: single
    imports:
      - org: ballerina
        module: http
    services:
      - basePath: /x
        listeners:
          - name: l1
            port: 9090
        resources:
          - resourceMethodName: get
            path: item
            returnType: json
            body:
              - stmt: '{stmt}'
"#
    );
    parse_model(&yaml, true).unwrap()
}

fn generation_error(model: &Model) -> GenerateError {
    let mut out = Vec::new();
    let err = Generator::new(GeneratorConfig::default())
        .generate_to(model, &mut out)
        .unwrap_err();
    assert!(out.is_empty(), "no partial output expected");
    err
}

#[test]
fn test_new_with_named_type_generates() {
    let (source, _) = generate(&model_with_body(r#"var c = new http:Client("u");"#));
    assert!(source.contains("        var c = new http:Client(\"u\");\n"), "{source}");
}

#[test]
fn test_new_with_structural_type_is_a_body_error() {
    let err = generation_error(&model_with_body("var m = new map<int>();"));
    let GenerateError::FragmentParse {
        kind,
        location,
        source,
        ..
    } = &err
    else {
        panic!("expected a fragment parse error, got: {err}");
    };
    assert_eq!(*kind, FragmentKind::BodyBlock);
    assert_eq!(location.to_string(), "modules[0].services[0].resources[0]");
    assert!(source.message.ends_with("found `map`"), "{}", source.message);
}

#[test]
fn test_deeply_nested_body_is_a_body_error() {
    let depth = 200_000;
    let stmt = format!("return {}1{};", "(".repeat(depth), ")".repeat(depth));
    let err = generation_error(&model_with_body(&stmt));
    let GenerateError::FragmentParse { kind, source, .. } = &err else {
        panic!("expected a fragment parse error, got: {err}");
    };
    assert_eq!(*kind, FragmentKind::BodyBlock);
    assert_eq!(source.message, "nesting too deep");
}
