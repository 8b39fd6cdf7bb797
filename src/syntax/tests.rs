#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

fn body_error(source: &str) -> SyntaxError {
    parse_function_body_block(source).unwrap_err()
}

#[test]
fn test_keyword_forms() {
    assert!(is_keyword("service"));
    assert!(is_keyword("returns"));
    assert!(is_keyword("checkpanic"));
    assert!(is_keyword("map"));
    assert!(!is_keyword("services"));
    assert!(!is_keyword("http"));
    assert!(!is_keyword(" return"));
}

#[test]
fn test_literal_forms() {
    assert!(is_literal("42"));
    assert!(is_literal("4.25"));
    assert!(is_literal("1e10"));
    assert!(is_literal("2.5E-3"));
    assert!(is_literal(r#""say \"hi\"\n""#));
    assert!(!is_literal("1.foo"));
    assert!(!is_literal("\"open"));
    assert!(!is_literal("\"a\" + \"b\""));
    assert!(!is_literal("true"));
    assert!(!is_literal(" 1"));
}

#[test]
fn test_comments_and_whitespace_are_trivia() {
    let block = parse_function_body_block("{\n\treturn // trailing words\n x;\r\n}").unwrap();
    assert_eq!(
        block.statements,
        vec![Statement::Return(Some(Expression::var("x")))]
    );
}

#[test]
fn test_string_literal_keeps_raw_text() {
    let raw = r#""say \"hi\"\n""#;
    let block = parse_function_body_block(&format!("{{ return {raw}; }}")).unwrap();
    assert_eq!(
        block.statements,
        vec![Statement::Return(Some(Expression::Literal(Literal::Str(
            raw.to_string()
        ))))]
    );
}

#[test]
fn test_numeric_literals() {
    let value = |src: &str| match parse_function_body_block(&format!("{{ return {src}; }}"))
        .unwrap()
        .statements
        .remove(0)
    {
        Statement::Return(Some(expr)) => expr,
        other => panic!("expected return, got {other:?}"),
    };
    assert_eq!(value("42"), Expression::Literal(Literal::Int("42".into())));
    assert_eq!(value("2.5E-3"), Expression::Literal(Literal::Float("2.5E-3".into())));
    // `.` not followed by a digit is field access
    assert!(matches!(value("1.foo"), Expression::FieldAccess { .. }));
}

#[test]
fn test_keywords_need_a_word_boundary() {
    let block = parse_function_body_block("{ returnValue = newer; }").unwrap();
    assert_eq!(
        block.statements,
        vec![Statement::Assign {
            target: Expression::var("returnValue"),
            value: Expression::var("newer"),
        }]
    );
}

#[test]
fn test_unterminated_string() {
    let err = body_error("{ return \"abc");
    assert!(err.message.contains("unterminated string literal"), "{}", err.message);
    assert_eq!(err.position, Position { line: 1, column: 10 });
}

#[test]
fn test_unknown_character_position() {
    let err = body_error("{ x = 1;\n  y = @; }");
    assert!(err.message.contains("found `@`"), "{}", err.message);
    assert_eq!(err.position, Position { line: 2, column: 7 });
}

#[test]
fn test_identifier_forms() {
    assert!(is_identifier("sayHello"));
    assert!(is_identifier("_private"));
    assert!(is_identifier("'type"));
    assert!(is_identifier(r"say\-hello"));
    assert!(!is_identifier("type1 x"));
    assert!(!is_identifier("1abc"));
    assert!(!is_identifier("service"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("my-port"));
}

#[test]
fn test_parse_import_with_org() {
    let import = parse_import_declaration("import ballerina/http;").unwrap();
    assert_eq!(import.org, Some(Ident::new("ballerina")));
    assert_eq!(import.module, vec![Ident::new("http")]);
    assert_eq!(import.prefix, None);
}

#[test]
fn test_parse_import_dotted_with_prefix() {
    let import = parse_import_declaration("import ballerinax/java.jdbc as db;").unwrap();
    assert_eq!(import.org.unwrap().as_str(), "ballerinax");
    assert_eq!(
        import.module,
        vec![Ident::new("java"), Ident::new("jdbc")]
    );
    assert_eq!(import.prefix, Some(Ident::new("db")));
}

#[test]
fn test_parse_import_without_org() {
    let import = parse_import_declaration("import http;").unwrap();
    assert_eq!(import.org, None);
    assert_eq!(import.module, vec![Ident::new("http")]);
}

#[test]
fn test_parse_import_rejects_trailing_input() {
    let err = parse_import_declaration("import ballerina/http; import x;").unwrap_err();
    assert!(err.message.contains("end of input"), "{}", err.message);
}

#[test]
fn test_parse_import_missing_semicolon() {
    let err = parse_import_declaration("import ballerina/http").unwrap_err();
    assert!(err.message.contains("`;`"), "{}", err.message);
    assert!(err.message.ends_with("found end of input"), "{}", err.message);
    assert_eq!(err.position, Position { line: 1, column: 22 });
}

#[test]
fn test_parse_listener_member() {
    let member = parse_module_member("listener http:Listener l1 = new (9090);").unwrap();
    let ModuleMember::Listener(listener) = member else {
        panic!("expected listener");
    };
    assert_eq!(
        listener.ty,
        TypeDescriptor::Named {
            module: Some(Ident::new("http")),
            name: Ident::new("Listener"),
        }
    );
    assert_eq!(listener.name.as_str(), "l1");
    assert_eq!(
        listener.initializer,
        Expression::New {
            ty: None,
            args: vec![Expression::Literal(Literal::Int("9090".into()))],
        }
    );
}

#[test]
fn test_parse_listener_explicit_new() {
    let member = parse_module_member("listener http:Listener l = new http:Listener(8080);").unwrap();
    let ModuleMember::Listener(listener) = member else {
        panic!("expected listener");
    };
    let Expression::New { ty: Some(ty), args } = listener.initializer else {
        panic!("expected explicit new");
    };
    assert_eq!(
        ty,
        TypeDescriptor::Named {
            module: Some(Ident::new("http")),
            name: Ident::new("Listener"),
        }
    );
    assert_eq!(args.len(), 1);
}

#[test]
fn test_parse_service_header() {
    let member = parse_module_member("service /greeting on l1, l2 { }").unwrap();
    let ModuleMember::Service(service) = member else {
        panic!("expected service");
    };
    assert_eq!(
        service.base_path,
        ServicePath::Absolute(vec![Ident::new("greeting")])
    );
    assert_eq!(
        service.listeners,
        vec![Expression::var("l1"), Expression::var("l2")]
    );
    assert!(service.members.is_empty());
}

#[test]
fn test_parse_service_without_listeners() {
    let member = parse_module_member("service /x on { }").unwrap();
    let ModuleMember::Service(service) = member else {
        panic!("expected service");
    };
    assert!(service.listeners.is_empty());
}

#[test]
fn test_parse_service_paths() {
    let path = |src: &str| match parse_module_member(src).unwrap() {
        ModuleMember::Service(s) => s.base_path,
        ModuleMember::Listener(_) => panic!("expected service"),
    };
    assert_eq!(path("service on l { }"), ServicePath::None);
    assert_eq!(path("service / on l { }"), ServicePath::Absolute(vec![]));
    assert_eq!(
        path("service /api/v1 on l { }"),
        ServicePath::Absolute(vec![Ident::new("api"), Ident::new("v1")])
    );
    assert_eq!(
        path(r#"service "hello" on l { }"#),
        ServicePath::Literal(r#""hello""#.into())
    );
}

#[test]
fn test_parse_service_unclosed() {
    assert!(parse_module_member("service /x on l {").is_err());
}

#[test]
fn test_parse_module_member_rejects_other_input() {
    let err = parse_module_member("return 1;").unwrap_err();
    assert!(err.message.contains("`listener` or `service`"));
}

#[test]
fn test_parse_resource_header() {
    let method = parse_object_member("resource function get sayHello() returns string {}").unwrap();
    assert_eq!(method.method.as_str(), "get");
    assert_eq!(
        method.path,
        vec![ResourcePathSegment::Name(Ident::new("sayHello"))]
    );
    assert!(method.params.is_empty());
    assert_eq!(method.return_type, Some(TypeDescriptor::named("string")));
    assert!(method.body.statements.is_empty());
}

#[test]
fn test_parse_resource_path_params() {
    let method = parse_object_member(
        "resource function get users/[string id]/files/[string... rest](int limit) returns json|error {}",
    )
    .unwrap();
    assert_eq!(method.path.len(), 4);
    assert_eq!(
        method.path[1],
        ResourcePathSegment::Param {
            ty: TypeDescriptor::named("string"),
            name: Ident::new("id"),
        }
    );
    assert!(matches!(method.path[3], ResourcePathSegment::Rest { .. }));
    assert_eq!(method.params.len(), 1);
    assert_eq!(
        method.return_type,
        Some(TypeDescriptor::Union(vec![
            TypeDescriptor::named("json"),
            TypeDescriptor::named("error"),
        ]))
    );
}

#[test]
fn test_parse_resource_dot_path_no_return() {
    let method = parse_object_member("resource function post .() {}").unwrap();
    assert_eq!(method.path, vec![ResourcePathSegment::Dot]);
    assert_eq!(method.return_type, None);
}

#[test]
fn test_parse_resource_invalid_path() {
    let err = parse_object_member("resource function get 123() {}").unwrap_err();
    assert_eq!(err.message, "expected resource path, found number `123`");
    assert_eq!(err.to_string(), "syntax error at 1:23: expected resource path, found number `123`");
    assert_eq!(err.position, Position { line: 1, column: 23 });
}

#[test]
fn test_parse_types() {
    let ty = |src: &str| {
        let block = parse_function_body_block(&format!("{{ {src} x; }}")).unwrap();
        match &block.statements[0] {
            Statement::Local { binding, .. } => binding.ty.clone().unwrap(),
            other => panic!("expected local, got {other:?}"),
        }
    };
    assert_eq!(
        ty("map<string>"),
        TypeDescriptor::Map(Box::new(TypeDescriptor::named("string")))
    );
    assert_eq!(
        ty("int[]"),
        TypeDescriptor::Array(Box::new(TypeDescriptor::named("int")))
    );
    assert_eq!(
        ty("string?"),
        TypeDescriptor::Optional(Box::new(TypeDescriptor::named("string")))
    );
    assert_eq!(
        ty("(int|string)[]"),
        TypeDescriptor::Array(Box::new(TypeDescriptor::Union(vec![
            TypeDescriptor::named("int"),
            TypeDescriptor::named("string"),
        ])))
    );
}

#[test]
fn test_parse_body_statements() {
    let block = parse_function_body_block(
        r#"{
            int count = 0;
            var name = "x";
            final string greeting = "hi";
            count += 1;
            count = count - 1;
            log:printInfo("done");
            return greeting;
        }"#,
    )
    .unwrap();
    assert_eq!(block.statements.len(), 7);
    assert!(matches!(
        block.statements[0],
        Statement::Local { is_final: false, .. }
    ));
    assert!(matches!(
        &block.statements[1],
        Statement::Local { binding: Binding { ty: None, .. }, .. }
    ));
    assert!(matches!(
        block.statements[2],
        Statement::Local { is_final: true, .. }
    ));
    assert!(matches!(
        block.statements[3],
        Statement::CompoundAssign {
            operator: CompoundOperator::Add,
            ..
        }
    ));
    assert!(matches!(block.statements[4], Statement::Assign { .. }));
    assert!(matches!(
        &block.statements[5],
        Statement::Expression(Expression::Call { .. })
    ));
    assert!(matches!(block.statements[6], Statement::Return(Some(_))));
}

#[test]
fn test_parse_indexed_assignment_is_not_a_declaration() {
    let block = parse_function_body_block("{ xs[0] = 1; }").unwrap();
    let Statement::Assign { target, .. } = &block.statements[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(target, Expression::MemberAccess { .. }));
}

#[test]
fn test_parse_control_flow() {
    let block = parse_function_body_block(
        r#"{
            if x > 1 { return "big"; } else if x == 1 { return "one"; } else { return "small"; }
            while i < 10 { i += 1; if i == 5 { break; } continue; }
            foreach string item in items { panic error("bad"); }
        }"#,
    )
    .unwrap();
    assert_eq!(block.statements.len(), 3);
    let Statement::If(stmt) = &block.statements[0] else {
        panic!("expected if");
    };
    let Some(ElseClause::If(next)) = &stmt.else_clause else {
        panic!("expected else if");
    };
    assert!(matches!(next.else_clause, Some(ElseClause::Block(_))));
    assert!(matches!(block.statements[1], Statement::While { .. }));
    assert!(matches!(block.statements[2], Statement::Foreach { .. }));
}

#[test]
fn test_parse_precedence() {
    let block = parse_function_body_block("{ return a + b * c == d || e && f; }").unwrap();
    let Statement::Return(Some(expr)) = &block.statements[0] else {
        panic!("expected return");
    };
    let Expression::Binary { operator, lhs, rhs } = expr else {
        panic!("expected binary");
    };
    assert_eq!(*operator, BinaryOperator::Or);
    assert!(matches!(
        **rhs,
        Expression::Binary {
            operator: BinaryOperator::And,
            ..
        }
    ));
    let Expression::Binary {
        operator: BinaryOperator::Equal,
        lhs: sum,
        ..
    } = &**lhs
    else {
        panic!("expected equality");
    };
    let Expression::Binary {
        operator: BinaryOperator::Add,
        rhs: product,
        ..
    } = &**sum
    else {
        panic!("expected addition");
    };
    assert!(matches!(
        **product,
        Expression::Binary {
            operator: BinaryOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn test_parse_left_associative() {
    let block = parse_function_body_block("{ return a - b - c; }").unwrap();
    let Statement::Return(Some(Expression::Binary { lhs, rhs, .. })) = &block.statements[0] else {
        panic!("expected binary return");
    };
    assert!(matches!(**lhs, Expression::Binary { .. }));
    assert_eq!(**rhs, Expression::var("c"));
}

#[test]
fn test_parse_postfix_and_constructors() {
    let block = parse_function_body_block(
        r#"{ json payload = {name: "x", "id": [1, 2.5, true, null, ()]}; var n = check req.getJsonPayload().items[0].map(f); }"#,
    )
    .unwrap();
    assert_eq!(block.statements.len(), 2);
    let Statement::Local {
        initializer: Some(Expression::Mapping(fields)),
        ..
    } = &block.statements[0]
    else {
        panic!("expected mapping initializer");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].key, MappingKey::Str(r#""id""#.into()));
    let Statement::Local {
        initializer: Some(Expression::Unary { operator, operand }),
        ..
    } = &block.statements[1]
    else {
        panic!("expected check expression");
    };
    assert_eq!(*operator, UnaryOperator::Check);
    assert!(matches!(**operand, Expression::MethodCall { .. }));
}

#[test]
fn test_parse_invalid_assignment_target() {
    let err = parse_function_body_block("{ f() = 1; }").unwrap_err();
    assert_eq!(err.message, "invalid assignment target");
    assert_eq!(err.position, Position { line: 1, column: 3 });
}

#[test]
fn test_parse_body_missing_semicolon() {
    let err = parse_function_body_block("{ return \"Hello\" }").unwrap_err();
    assert_eq!(err.message, "expected `;`, found `}`");
    assert_eq!(err.position, Position { line: 1, column: 18 });
}

#[test]
fn test_parse_body_unbalanced() {
    assert!(parse_function_body_block("{ if x { return 1; }").is_err());
    assert!(parse_function_body_block("{ return 1; } }").is_err());
}

#[test]
fn test_parse_compilation_unit() {
    let unit = parse_compilation_unit(
        r#"
import ballerina/http;
import ballerina/log;

listener http:Listener l1 = new (9090);

service /greeting on l1 {
    resource function get sayHello() returns string {
        return "Hello";
    }
}
"#,
    )
    .unwrap();
    assert_eq!(unit.imports.len(), 2);
    assert_eq!(unit.members.len(), 2);
    assert_eq!(unit.listeners().count(), 1);
    assert_eq!(unit.services().count(), 1);
    assert_eq!(unit.services().next().unwrap().members.len(), 1);
}

#[test]
fn test_parse_empty_compilation_unit() {
    let unit = parse_compilation_unit("  // nothing here\n").unwrap();
    assert_eq!(unit, CompilationUnit::default());
}

#[test]
fn test_trees_ignore_layout() {
    let a = parse_compilation_unit("service /x on l { resource function get a() { return 1; } }").unwrap();
    let b = parse_compilation_unit(
        "service /x\n    on l {\n\n resource function get a()\n{ return 1 ; }\n}\n",
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_with_body_grafts_block() {
    let method = parse_object_member("resource function get a() returns string {}").unwrap();
    let body = parse_function_body_block(r#"{ return "x"; }"#).unwrap();
    let grafted = method.clone().with_body(body.clone());
    assert_eq!(grafted.body, body);
    assert_eq!(grafted.method, method.method);
    assert_eq!(grafted.return_type, method.return_type);
}

#[test]
fn test_with_members_replaces_body() {
    let ModuleMember::Service(service) = parse_module_member("service /x on l { }").unwrap() else {
        panic!("expected service");
    };
    let method = parse_object_member("resource function get a() {}").unwrap();
    let service = service.with_members(vec![method.clone(), method]);
    assert_eq!(service.members.len(), 2);
    assert_eq!(service.listeners, vec![Expression::var("l")]);
}

#[test]
fn test_syntax_tree_modify_with() {
    let tree = SyntaxTree::empty();
    assert!(tree.root().members.is_empty());

    let unit = parse_compilation_unit("import a/b;").unwrap();
    let tree = tree.modify_with(unit.clone());
    assert_eq!(tree.root(), &unit);
    assert_eq!(tree.into_root(), unit);
}

#[test]
fn test_syntax_error_display() {
    let err = SyntaxError::new("expected `;`", Position { line: 3, column: 14 });
    assert_eq!(err.to_string(), "syntax error at 3:14: expected `;`");
}

#[test]
fn test_new_takes_a_qualified_name() {
    let block = parse_function_body_block(r#"{ var c = new http:Client("u"); }"#).unwrap();
    let Statement::Local {
        initializer: Some(Expression::New { ty: Some(ty), args }),
        ..
    } = &block.statements[0]
    else {
        panic!("expected new expression");
    };
    assert_eq!(
        *ty,
        TypeDescriptor::Named {
            module: Some(Ident::new("http")),
            name: Ident::new("Client"),
        }
    );
    assert_eq!(args.len(), 1);

    let err = body_error("{ var m = new map<int>(); }");
    assert!(err.message.ends_with("found `map`"), "{}", err.message);
    assert_eq!(err.position, Position { line: 1, column: 15 });
    assert!(parse_function_body_block("{ var xs = new int[](); }").is_err());
}

#[test]
fn test_deep_brackets_are_rejected() {
    let depth = 200_000;
    let source = format!("{{ return {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    let err = body_error(&source);
    assert_eq!(err.message, "nesting too deep");
    assert_eq!(err.position.line, 1);

    let source = format!("{{ x = {}1{}; }}", "[".repeat(depth), "]".repeat(depth));
    assert_eq!(body_error(&source).message, "nesting too deep");

    let source = format!("{{ {} }}", "map<".repeat(depth));
    assert_eq!(body_error(&source).message, "nesting too deep");
}

#[test]
fn test_brackets_inside_strings_and_comments_do_not_nest() {
    let brackets = "(".repeat(MAX_NESTING * 2);
    let source = format!("{{\n    // {brackets}\n    return \"{brackets}\";\n}}");
    assert!(parse_function_body_block(&source).is_ok());
}

#[test]
fn test_moderate_nesting_is_accepted() {
    let source = format!("{{ return {}1{}; }}", "(".repeat(20), ")".repeat(20));
    let block = parse_function_body_block(&source).unwrap();
    let Statement::Return(Some(mut expr)) = block.statements.into_iter().next().unwrap() else {
        panic!("expected return");
    };
    let mut groups = 0;
    while let Expression::Group(inner) = expr {
        groups += 1;
        expr = *inner;
    }
    assert_eq!(groups, 20);

    let nested = format!("{}{}", "if x { ".repeat(20), "} ".repeat(20));
    assert!(parse_function_body_block(&format!("{{ {nested} }}")).is_ok());
}

#[test]
fn test_long_operator_chains_are_rejected() {
    let chain = "!".repeat(200_000);
    let err = body_error(&format!("{{ return {chain}x; }}"));
    assert_eq!(err.message, "nesting too deep");

    let chain = vec!["a"; 100_000].join(" + ");
    assert_eq!(body_error(&format!("{{ return {chain}; }}")).message, "nesting too deep");

    let chain = "x.y".to_string() + &".z".repeat(100_000);
    assert_eq!(body_error(&format!("{{ {chain} = 1; }}")).message, "nesting too deep");

    let chain = "if a { } else ".repeat(100_000);
    assert_eq!(body_error(&format!("{{ {chain}{{ }} }}")).message, "nesting too deep");
}

#[test]
fn test_short_operator_chains_are_accepted() {
    let chain = vec!["a"; 100].join(" + ");
    assert!(parse_function_body_block(&format!("{{ return {chain}; }}")).is_ok());
    assert!(parse_function_body_block("{ return !!!-x; }").is_ok());
}
