//! Fragment parsers built on the pest grammar in `grammar.pest`.
//!
//! Each public entry point parses exactly one construct and rejects trailing
//! input, which is what lets the generator parse independently synthesized
//! fragments and trust each node on its own. Parse trees are turned into
//! [`ast`](super::ast) nodes through [`Lexeme`].

use super::ast::*;
use super::error::{Position, SyntaxError};
use pest::error::{Error as PestError, ErrorVariant, InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser as _;
use pest_derive::Parser;

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest bracket nesting accepted in a fragment.
pub const MAX_NESTING: usize = 32;
/// Deepest syntax tree accepted, counting operator and `else if` chains.
pub const MAX_DEPTH: usize = 256;

const NESTING_TOO_DEEP: &str = "nesting too deep";

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct ServiceParser;

/// Conversion from a pest parse tree into a syntax tree node.
///
/// `depth` is the depth of the node being built; conversions fail once it
/// passes [`MAX_DEPTH`].
pub(crate) trait Lexeme: Sized {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self>;
}

/// Parse `import org/module;`.
pub fn parse_import_declaration(source: &str) -> ParseResult<ImportDeclaration> {
    parse_entry(Rule::import_declaration, source)
}

/// Parse a module-level listener or service declaration.
pub fn parse_module_member(source: &str) -> ParseResult<ModuleMember> {
    parse_entry(Rule::module_member, source)
}

/// Parse a service body member (a resource method).
pub fn parse_object_member(source: &str) -> ParseResult<ResourceMethod> {
    parse_entry(Rule::object_member, source)
}

/// Parse a braced function body, e.g. `{ return "x"; }`.
pub fn parse_function_body_block(source: &str) -> ParseResult<Block> {
    parse_entry(Rule::function_body_block, source)
}

/// Parse an entire source file.
pub fn parse_compilation_unit(source: &str) -> ParseResult<CompilationUnit> {
    let unit = entry_pair(Rule::compilation_unit, source)?;
    let mut imports = Vec::new();
    let mut members = Vec::new();
    for pair in content(unit) {
        match pair.as_rule() {
            Rule::import_decl => imports.push(ImportDeclaration::from_parsed_rule(pair, 1)?),
            _ => members.push(ModuleMember::from_parsed_rule(pair, 1)?),
        }
    }
    Ok(CompilationUnit::new(imports, members, EndOfInput))
}

/// Whether `text` is exactly one identifier (plain, quoted or escaped).
pub fn is_identifier(text: &str) -> bool {
    ServiceParser::parse(Rule::identifier_text, text).is_ok()
}

/// Whether `text` is exactly one reserved word.
pub fn is_keyword(text: &str) -> bool {
    ServiceParser::parse(Rule::keyword_text, text).is_ok()
}

/// Whether `text` is exactly one numeric or string literal.
pub fn is_literal(text: &str) -> bool {
    ServiceParser::parse(Rule::literal_text, text).is_ok()
}

fn parse_entry<T: Lexeme>(rule: Rule, source: &str) -> ParseResult<T> {
    let entry = entry_pair(rule, source)?;
    let position = pair_position(&entry);
    match content(entry).next() {
        Some(node) => T::from_parsed_rule(node, 1),
        None => Err(SyntaxError::new("empty fragment", position)),
    }
}

fn entry_pair(rule: Rule, source: &str) -> ParseResult<Pair<'_, Rule>> {
    check_nesting(source)?;
    let mut pairs = ServiceParser::parse(rule, source).map_err(|err| syntax_error(source, err))?;
    pairs
        .next()
        .ok_or_else(|| SyntaxError::new("empty parse", Position { line: 1, column: 1 }))
}

// ----- errors -----

fn syntax_error(source: &str, err: PestError<Rule>) -> SyntaxError {
    let (line, column) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let offset = match err.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    let message = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            format!("expected {}, found {}", expected(&positives), found(source, offset))
        }
        ErrorVariant::CustomError { message } => message,
    };
    SyntaxError::new(message, Position { line, column })
}

/// Rules that only extend something already complete.
fn is_continuation(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::postfix_op
            | Rule::binary_operator
            | Rule::assign_operator
            | Rule::type_suffix
            | Rule::pipe
            | Rule::comma
    )
}

fn expected(positives: &[Rule]) -> String {
    let required: Vec<Rule> = positives
        .iter()
        .copied()
        .filter(|rule| !is_continuation(*rule))
        .collect();
    let rules = if required.is_empty() { positives } else { &required[..] };

    let mut names: Vec<String> = Vec::new();
    for rule in rules {
        let name = describe(*rule);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    if names.is_empty() {
        return "valid syntax".to_string();
    }
    names.join(" or ")
}

fn describe(rule: Rule) -> String {
    let text = match rule {
        Rule::EOI => "end of input",
        Rule::member_decl => "`listener` or `service` declaration",
        Rule::path_segment | Rule::resource_path => "resource path",
        Rule::expression | Rule::unary_expr | Rule::postfix_expr | Rule::primary => "expression",
        Rule::type_descriptor | Rule::postfix_type | Rule::primary_type | Rule::qualified_name => {
            "type descriptor"
        }
        Rule::statement => "statement",
        Rule::mapping_field | Rule::mapping_key => "mapping field name",
        Rule::member_name => "field or method name",
        Rule::postfix_op => "`.`, `(` or `[`",
        Rule::binary_operator => "operator",
        Rule::assign_operator => "`=`",
        Rule::type_suffix => "`[]` or `?`",
        Rule::final_modifier => "`final`",
        Rule::semicolon => "`;`",
        Rule::comma => "`,`",
        Rule::colon => "`:`",
        Rule::ellipsis => "`...`",
        Rule::dot => "`.`",
        Rule::slash => "`/`",
        Rule::pipe => "`|`",
        Rule::question => "`?`",
        Rule::assign => "`=`",
        Rule::lparen => "`(`",
        Rule::rparen => "`)`",
        Rule::lbrace => "`{`",
        Rule::rbrace => "`}`",
        Rule::lbracket => "`[`",
        Rule::rbracket => "`]`",
        Rule::langle => "`<`",
        Rule::rangle => "`>`",
        _ => {
            let name = format!("{rule:?}");
            return match name.strip_prefix("kw_") {
                Some(keyword) => format!("`{keyword}`"),
                None => name.replace('_', " "),
            };
        }
    };
    text.to_string()
}

/// Short description of the input at `offset` for error messages.
fn found(source: &str, offset: usize) -> String {
    let rest = source.get(offset..).unwrap_or("");
    let Some(first) = rest.chars().next() else {
        return "end of input".to_string();
    };
    if first.is_ascii_digit() {
        let digits: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '.')
            .collect();
        return format!("number `{digits}`");
    }
    if first == '"' {
        return match string_end(rest) {
            Some(end) => format!("string {}", &rest[..end]),
            None => "unterminated string literal".to_string(),
        };
    }
    if first.is_ascii_alphabetic() || first == '_' || first == '\'' {
        let word: String = rest
            .chars()
            .enumerate()
            .take_while(|(idx, c)| {
                c.is_ascii_alphanumeric() || *c == '_' || (*idx == 0 && *c == '\'')
            })
            .map(|(_, c)| c)
            .collect();
        return format!("`{word}`");
    }
    format!("`{first}`")
}

/// Byte length of the string literal starting `text`, closing quote included.
fn string_end(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in text.char_indices().skip(1) {
        match c {
            '\n' => return None,
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(idx + 1),
            _ => escaped = false,
        }
    }
    None
}

fn position_at(source: &str, offset: usize) -> Position {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    Position {
        line,
        column: before[line_start..].chars().count() + 1,
    }
}

/// Reject bracket nesting deeper than [`MAX_NESTING`] before running the
/// grammar, which recurses once per level.
fn check_nesting(source: &str) -> ParseResult<()> {
    let mut open: Vec<char> = Vec::new();
    let mut word = String::new();
    let mut after_map = false;
    let mut chars = source.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            after_map = word == "map";
            word.clear();
        }
        match c {
            '"' => {
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' | '\n' => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek().is_some_and(|(_, next)| *next == '/') => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '\\' => {
                chars.next();
            }
            '(' | '[' | '{' => open.push(c),
            '<' if after_map => open.push(c),
            ')' | ']' | '}' => {
                open.pop();
            }
            '>' if open.last() == Some(&'<') => {
                open.pop();
            }
            _ => {}
        }
        if !c.is_whitespace() {
            after_map = false;
        }
        if open.len() > MAX_NESTING {
            return Err(SyntaxError::new(NESTING_TOO_DEEP, position_at(source, offset)));
        }
    }
    Ok(())
}

// ----- tree helpers -----

/// Token rules carry no information once the parse has succeeded.
fn is_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::EOI
            | Rule::semicolon
            | Rule::comma
            | Rule::colon
            | Rule::ellipsis
            | Rule::dot
            | Rule::slash
            | Rule::pipe
            | Rule::question
            | Rule::assign
            | Rule::lparen
            | Rule::rparen
            | Rule::lbrace
            | Rule::rbrace
            | Rule::lbracket
            | Rule::rbracket
            | Rule::langle
            | Rule::rangle
            | Rule::kw_import
            | Rule::kw_as
            | Rule::kw_listener
            | Rule::kw_service
            | Rule::kw_on
            | Rule::kw_resource
            | Rule::kw_function
            | Rule::kw_returns
            | Rule::kw_return
            | Rule::kw_new
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_foreach
            | Rule::kw_in
            | Rule::kw_var
            | Rule::kw_panic
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_map
    )
}

fn content(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_token(p.as_rule()))
}

fn pair_position(pair: &Pair<'_, Rule>) -> Position {
    let (line, column) = pair.line_col();
    Position { line, column }
}

fn error_at(pair: &Pair<'_, Rule>, message: impl Into<String>) -> SyntaxError {
    SyntaxError::new(message, pair_position(pair))
}

/// Depth of a child `by` levels below `depth`.
fn deeper(pair: &Pair<'_, Rule>, depth: usize, by: usize) -> ParseResult<usize> {
    let next = depth.saturating_add(by);
    if next > MAX_DEPTH {
        return Err(error_at(pair, NESTING_TOO_DEEP));
    }
    Ok(next)
}

fn missing(rule: Rule, context: &str) -> SyntaxError {
    SyntaxError::new(
        format!("malformed {context}: missing {}", describe(rule)),
        Position::default(),
    )
}

/// Next child, which the grammar guarantees is present.
fn required<'i>(
    pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    rule: Rule,
    context: &str,
) -> ParseResult<Pair<'i, Rule>> {
    pairs.next().ok_or_else(|| missing(rule, context))
}

fn unexpected(pair: &Pair<'_, Rule>, context: &str) -> SyntaxError {
    error_at(pair, format!("unexpected {} in {context}", describe(pair.as_rule())))
}

fn ident(pair: Pair<'_, Rule>) -> Ident {
    Ident::new(pair.as_str())
}

fn expressions(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Vec<Expression>> {
    content(pair)
        .map(|arg| Expression::from_parsed_rule(arg, depth))
        .collect()
}

fn optional_arguments(pair: Option<Pair<'_, Rule>>, depth: usize) -> ParseResult<Vec<Expression>> {
    match pair {
        Some(arguments) => expressions(arguments, depth),
        None => Ok(Vec::new()),
    }
}

// ----- declarations -----

impl Lexeme for ImportDeclaration {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, _depth: usize) -> ParseResult<Self> {
        let mut org = None;
        let mut module = Vec::new();
        let mut prefix = None;
        for pair in content(parsed_rule) {
            match pair.as_rule() {
                Rule::org_name => org = content(pair).next().map(ident),
                Rule::module_name => module = content(pair).map(ident).collect(),
                Rule::import_prefix => prefix = content(pair).next().map(ident),
                _ => return Err(unexpected(&pair, "import declaration")),
            }
        }
        Ok(ImportDeclaration {
            org,
            module,
            prefix,
        })
    }
}

impl Lexeme for ModuleMember {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let member = required(&mut parsed_rule.into_inner(), Rule::member_decl, "module member")?;
        match member.as_rule() {
            Rule::listener_decl => {
                ListenerDeclaration::from_parsed_rule(member, depth).map(ModuleMember::Listener)
            }
            Rule::service_decl => {
                ServiceDeclaration::from_parsed_rule(member, depth).map(ModuleMember::Service)
            }
            _ => Err(unexpected(&member, "module member")),
        }
    }
}

impl Lexeme for ListenerDeclaration {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let depth = deeper(&parsed_rule, depth, 1)?;
        let mut inner = content(parsed_rule);
        let ty = TypeDescriptor::from_parsed_rule(
            required(&mut inner, Rule::type_descriptor, "listener declaration")?,
            depth,
        )?;
        let name = ident(required(&mut inner, Rule::identifier, "listener declaration")?);
        let initializer = Expression::from_parsed_rule(
            required(&mut inner, Rule::expression, "listener declaration")?,
            depth,
        )?;
        Ok(ListenerDeclaration {
            ty,
            name,
            initializer,
        })
    }
}

impl Lexeme for ServiceDeclaration {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let depth = deeper(&parsed_rule, depth, 1)?;
        let mut base_path = ServicePath::None;
        let mut listeners = Vec::new();
        let mut members = Vec::new();
        for pair in content(parsed_rule) {
            match pair.as_rule() {
                Rule::service_path => base_path = ServicePath::from_parsed_rule(pair, depth)?,
                Rule::listener_refs => listeners = expressions(pair, depth)?,
                Rule::resource_method => {
                    members.push(ResourceMethod::from_parsed_rule(pair, depth)?)
                }
                _ => return Err(unexpected(&pair, "service declaration")),
            }
        }
        Ok(ServiceDeclaration {
            base_path,
            listeners,
            members,
        })
    }
}

impl Lexeme for ServicePath {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, _depth: usize) -> ParseResult<Self> {
        let path = required(&mut parsed_rule.into_inner(), Rule::service_path, "service path")?;
        match path.as_rule() {
            Rule::string_literal => Ok(ServicePath::Literal(path.as_str().to_string())),
            Rule::absolute_path => Ok(ServicePath::Absolute(content(path).map(ident).collect())),
            _ => Err(unexpected(&path, "service path")),
        }
    }
}

impl Lexeme for ResourceMethod {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let depth = deeper(&parsed_rule, depth, 1)?;
        let mut inner = content(parsed_rule);
        let method = ident(required(&mut inner, Rule::identifier, "resource method")?);
        let path = content(required(&mut inner, Rule::resource_path, "resource method")?)
            .map(|segment| ResourcePathSegment::from_parsed_rule(segment, depth))
            .collect::<ParseResult<Vec<_>>>()?;

        let mut params = Vec::new();
        let mut return_type = None;
        let mut body = None;
        for pair in inner {
            match pair.as_rule() {
                Rule::parameters => {
                    params = content(pair)
                        .map(|param| Parameter::from_parsed_rule(param, depth))
                        .collect::<ParseResult<Vec<_>>>()?;
                }
                Rule::return_type => {
                    let ty = required(&mut content(pair), Rule::type_descriptor, "return type")?;
                    return_type = Some(TypeDescriptor::from_parsed_rule(ty, depth)?);
                }
                Rule::block => body = Some(Block::from_parsed_rule(pair, depth)?),
                _ => return Err(unexpected(&pair, "resource method")),
            }
        }
        Ok(ResourceMethod {
            method,
            path,
            params,
            return_type,
            body: body.ok_or_else(|| missing(Rule::block, "resource method"))?,
        })
    }
}

impl Lexeme for ResourcePathSegment {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let segment = required(&mut parsed_rule.into_inner(), Rule::path_segment, "resource path")?;
        match segment.as_rule() {
            Rule::dot => Ok(ResourcePathSegment::Dot),
            Rule::identifier => Ok(ResourcePathSegment::Name(ident(segment))),
            Rule::path_param | Rule::path_rest_param => {
                let rest = segment.as_rule() == Rule::path_rest_param;
                let Parameter { ty, name } = Parameter::from_parsed_rule(segment, depth)?;
                Ok(if rest {
                    ResourcePathSegment::Rest { ty, name }
                } else {
                    ResourcePathSegment::Param { ty, name }
                })
            }
            _ => Err(unexpected(&segment, "resource path")),
        }
    }
}

/// Also used for `[T name]` and `[T... name]` path parameters.
impl Lexeme for Parameter {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let mut inner = content(parsed_rule);
        let ty = TypeDescriptor::from_parsed_rule(
            required(&mut inner, Rule::type_descriptor, "parameter")?,
            depth,
        )?;
        let name = ident(required(&mut inner, Rule::identifier, "parameter")?);
        Ok(Parameter { ty, name })
    }
}

// ----- types -----

impl Lexeme for TypeDescriptor {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let depth = deeper(&parsed_rule, depth, 1)?;
        match parsed_rule.as_rule() {
            Rule::type_descriptor => {
                let mut members = content(parsed_rule)
                    .map(|member| TypeDescriptor::from_parsed_rule(member, depth))
                    .collect::<ParseResult<Vec<_>>>()?;
                if members.len() == 1 {
                    if let Some(single) = members.pop() {
                        return Ok(single);
                    }
                }
                Ok(TypeDescriptor::Union(members))
            }
            Rule::postfix_type => {
                let mut inner = parsed_rule.into_inner();
                let primary = required(&mut inner, Rule::primary_type, "type descriptor")?;
                let suffixes: Vec<Pair<'_, Rule>> = inner.collect();
                let Some(last) = suffixes.last() else {
                    return TypeDescriptor::from_parsed_rule(primary, depth);
                };
                let depth = deeper(last, depth, suffixes.len())?;
                let mut ty = TypeDescriptor::from_parsed_rule(primary, depth)?;
                for suffix in suffixes {
                    let wrapped = Box::new(ty);
                    ty = match suffix.into_inner().next().map(|s| s.as_rule()) {
                        Some(Rule::array_suffix) => TypeDescriptor::Array(wrapped),
                        _ => TypeDescriptor::Optional(wrapped),
                    };
                }
                Ok(ty)
            }
            Rule::primary_type => {
                let mut inner = parsed_rule.into_inner();
                let ty = required(&mut inner, Rule::primary_type, "type descriptor")?;
                match ty.as_rule() {
                    Rule::nil_type => Ok(TypeDescriptor::Nil),
                    Rule::qualified_name => Ok(qualified_name(ty)),
                    Rule::paren_type => {
                        let inner =
                            required(&mut content(ty), Rule::type_descriptor, "type descriptor")?;
                        TypeDescriptor::from_parsed_rule(inner, depth)
                    }
                    Rule::map_type => {
                        let inner = required(&mut content(ty), Rule::type_descriptor, "map type")?;
                        Ok(TypeDescriptor::Map(Box::new(TypeDescriptor::from_parsed_rule(
                            inner, depth,
                        )?)))
                    }
                    _ => Err(unexpected(&ty, "type descriptor")),
                }
            }
            Rule::qualified_name => Ok(qualified_name(parsed_rule)),
            _ => Err(unexpected(&parsed_rule, "type descriptor")),
        }
    }
}

fn qualified_name(pair: Pair<'_, Rule>) -> TypeDescriptor {
    let mut names: Vec<Ident> = content(pair).map(ident).collect();
    let name = names.pop().unwrap_or_else(|| Ident::new(""));
    TypeDescriptor::Named {
        module: names.pop(),
        name,
    }
}

// ----- statements -----

impl Lexeme for Block {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let depth = deeper(&parsed_rule, depth, 1)?;
        let statements = content(parsed_rule)
            .map(|statement| Statement::from_parsed_rule(statement, depth))
            .collect::<ParseResult<Vec<_>>>()?;
        Ok(Block { statements })
    }
}

impl Lexeme for Statement {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let depth = deeper(&parsed_rule, depth, 1)?;
        let statement = required(&mut parsed_rule.into_inner(), Rule::statement, "statement")?;
        let rule = statement.as_rule();
        match rule {
            Rule::return_statement => {
                let value = content(statement)
                    .next()
                    .map(|value| Expression::from_parsed_rule(value, depth))
                    .transpose()?;
                Ok(Statement::Return(value))
            }
            Rule::if_statement => {
                IfStatement::from_parsed_rule(statement, depth).map(Statement::If)
            }
            Rule::while_statement => {
                let mut inner = content(statement);
                let condition = Expression::from_parsed_rule(
                    required(&mut inner, Rule::expression, "while statement")?,
                    depth,
                )?;
                let body = required(&mut inner, Rule::block, "while statement")?;
                let body = Block::from_parsed_rule(body, depth)?;
                Ok(Statement::While { condition, body })
            }
            Rule::foreach_statement => {
                let mut inner = content(statement);
                let binding = Binding::from_parsed_rule(
                    required(&mut inner, Rule::binding, "foreach statement")?,
                    depth,
                )?;
                let iterable = Expression::from_parsed_rule(
                    required(&mut inner, Rule::expression, "foreach statement")?,
                    depth,
                )?;
                let body = required(&mut inner, Rule::block, "foreach statement")?;
                let body = Block::from_parsed_rule(body, depth)?;
                Ok(Statement::Foreach {
                    binding,
                    iterable,
                    body,
                })
            }
            Rule::panic_statement => {
                let value = required(&mut content(statement), Rule::expression, "panic statement")?;
                Expression::from_parsed_rule(value, depth).map(Statement::Panic)
            }
            Rule::break_statement => Ok(Statement::Break),
            Rule::continue_statement => Ok(Statement::Continue),
            Rule::block => Block::from_parsed_rule(statement, depth).map(Statement::Block),
            Rule::local_declaration => local_declaration(statement, depth),
            Rule::expression_statement => expression_statement(statement, depth),
            _ => Err(unexpected(&statement, "statement")),
        }
    }
}

fn local_declaration(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Statement> {
    let mut is_final = false;
    let mut binding = None;
    let mut initializer = None;
    for part in content(pair) {
        match part.as_rule() {
            Rule::final_modifier => is_final = true,
            Rule::binding => binding = Some(Binding::from_parsed_rule(part, depth)?),
            Rule::expression => initializer = Some(Expression::from_parsed_rule(part, depth)?),
            _ => return Err(unexpected(&part, "local declaration")),
        }
    }
    Ok(Statement::Local {
        is_final,
        binding: binding.ok_or_else(|| missing(Rule::binding, "local declaration"))?,
        initializer,
    })
}

fn expression_statement(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Statement> {
    let mut inner = content(pair);
    let target_pair = required(&mut inner, Rule::expression, "expression statement")?;
    let target_position = pair_position(&target_pair);
    let target = Expression::from_parsed_rule(target_pair, depth)?;
    let Some(operator) = inner.next() else {
        return Ok(Statement::Expression(target));
    };
    if !target.is_lvalue() {
        return Err(SyntaxError::new("invalid assignment target", target_position));
    }
    let value = Expression::from_parsed_rule(
        required(&mut inner, Rule::expression, "assignment")?,
        depth,
    )?;
    Ok(match operator.as_str() {
        "+=" => Statement::CompoundAssign {
            target,
            operator: CompoundOperator::Add,
            value,
        },
        "-=" => Statement::CompoundAssign {
            target,
            operator: CompoundOperator::Subtract,
            value,
        },
        _ => Statement::Assign { target, value },
    })
}

impl Lexeme for Binding {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let binding = required(&mut parsed_rule.into_inner(), Rule::binding, "binding")?;
        let typed = binding.as_rule() == Rule::typed_binding;
        let mut inner = content(binding);
        let ty = if typed {
            Some(TypeDescriptor::from_parsed_rule(
                required(&mut inner, Rule::type_descriptor, "binding")?,
                depth,
            )?)
        } else {
            None
        };
        let name = ident(required(&mut inner, Rule::identifier, "binding")?);
        Ok(Binding { ty, name })
    }
}

impl Lexeme for IfStatement {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        let parts: Vec<Pair<'_, Rule>> = content(parsed_rule).collect();
        let chain = parts.iter().filter(|p| p.as_rule() == Rule::else_if_clause).count();
        let Some(last) = parts.last() else {
            return Err(missing(Rule::expression, "if statement"));
        };
        let depth = deeper(last, depth, chain)?;

        let mut parts = parts.into_iter();
        let condition = Expression::from_parsed_rule(
            required(&mut parts, Rule::expression, "if statement")?,
            depth,
        )?;
        let then_block = required(&mut parts, Rule::block, "if statement")?;
        let then_block = Block::from_parsed_rule(then_block, depth)?;

        let mut branches = Vec::new();
        let mut tail = None;
        for part in parts {
            match part.as_rule() {
                Rule::else_if_clause => {
                    let mut inner = content(part);
                    let condition = Expression::from_parsed_rule(
                        required(&mut inner, Rule::expression, "else if clause")?,
                        depth,
                    )?;
                    let block = required(&mut inner, Rule::block, "else if clause")?;
                    let block = Block::from_parsed_rule(block, depth)?;
                    branches.push((condition, block));
                }
                Rule::else_clause => {
                    let block = required(&mut content(part), Rule::block, "else clause")?;
                    tail = Some(ElseClause::Block(Block::from_parsed_rule(block, depth)?));
                }
                _ => return Err(unexpected(&part, "if statement")),
            }
        }

        for (condition, then_block) in branches.into_iter().rev() {
            tail = Some(ElseClause::If(Box::new(IfStatement {
                condition,
                then_block,
                else_clause: tail,
            })));
        }
        Ok(IfStatement {
            condition,
            then_block,
            else_clause: tail,
        })
    }
}

// ----- expressions -----

impl Lexeme for Expression {
    fn from_parsed_rule(parsed_rule: Pair<'_, Rule>, depth: usize) -> ParseResult<Self> {
        match parsed_rule.as_rule() {
            Rule::expression => binary_expression(parsed_rule, depth),
            Rule::unary_expr => unary_expression(parsed_rule, depth),
            Rule::postfix_expr => postfix_expression(parsed_rule, depth),
            Rule::primary => primary(parsed_rule, depth),
            _ => Err(unexpected(&parsed_rule, "expression")),
        }
    }
}

fn binary_operator(pair: &Pair<'_, Rule>) -> ParseResult<BinaryOperator> {
    Ok(match pair.as_str() {
        "||" => BinaryOperator::Or,
        "&&" => BinaryOperator::And,
        "==" => BinaryOperator::Equal,
        "!=" => BinaryOperator::NotEqual,
        "<" => BinaryOperator::Less,
        ">" => BinaryOperator::Greater,
        "<=" => BinaryOperator::LessEqual,
        ">=" => BinaryOperator::GreaterEqual,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        other => return Err(error_at(pair, format!("unknown operator `{other}`"))),
    })
}

fn binary_expression(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Expression> {
    let parts: Vec<Pair<'_, Rule>> = pair.into_inner().collect();
    let operators = parts.len() / 2;
    let Some(last) = parts.last() else {
        return Err(missing(Rule::unary_expr, "expression"));
    };
    let depth = deeper(last, depth, operators + 1)?;

    let mut parts = parts.into_iter();
    let first = required(&mut parts, Rule::unary_expr, "expression")?;
    let first = Expression::from_parsed_rule(first, depth)?;
    let mut rest = Vec::with_capacity(operators);
    while let Some(operator) = parts.next() {
        let operator = binary_operator(&operator)?;
        let operand = required(&mut parts, Rule::unary_expr, "expression")?;
        rest.push((operator, Expression::from_parsed_rule(operand, depth)?));
    }
    Ok(climb(first, &mut rest.into_iter().peekable(), 1))
}

/// Precedence climbing over an already parsed operator chain; every binary
/// operator is left associative.
fn climb(
    mut lhs: Expression,
    rest: &mut std::iter::Peekable<std::vec::IntoIter<(BinaryOperator, Expression)>>,
    min_precedence: u8,
) -> Expression {
    while let Some((operator, mut rhs)) =
        rest.next_if(|(op, _)| op.precedence() >= min_precedence)
    {
        while rest
            .peek()
            .is_some_and(|(next, _)| next.precedence() > operator.precedence())
        {
            rhs = climb(rhs, rest, operator.precedence() + 1);
        }
        lhs = Expression::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
    lhs
}

fn unary_expression(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Expression> {
    let parts: Vec<Pair<'_, Rule>> = pair.into_inner().collect();
    let Some(last) = parts.last() else {
        return Err(missing(Rule::postfix_expr, "unary expression"));
    };
    let depth = deeper(last, depth, parts.len())?;

    let mut parts = parts;
    let operand = parts.pop().ok_or_else(|| missing(Rule::postfix_expr, "unary expression"))?;
    let mut expr = Expression::from_parsed_rule(operand, depth)?;
    for operator in parts.into_iter().rev() {
        let operator = match operator.as_str() {
            "!" => UnaryOperator::Not,
            "-" => UnaryOperator::Negate,
            "check" => UnaryOperator::Check,
            "checkpanic" => UnaryOperator::CheckPanic,
            other => return Err(error_at(&operator, format!("unknown operator `{other}`"))),
        };
        expr = Expression::Unary {
            operator,
            operand: Box::new(expr),
        };
    }
    Ok(expr)
}

fn postfix_expression(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Expression> {
    let parts: Vec<Pair<'_, Rule>> = pair.into_inner().collect();
    let Some(last) = parts.last() else {
        return Err(missing(Rule::primary, "expression"));
    };
    let depth = deeper(last, depth, parts.len())?;

    let mut parts = parts.into_iter();
    let primary = required(&mut parts, Rule::primary, "expression")?;
    let mut expr = Expression::from_parsed_rule(primary, depth)?;
    for op in parts {
        let op = required(&mut op.into_inner(), Rule::postfix_op, "postfix expression")?;
        let target = Box::new(expr);
        expr = match op.as_rule() {
            Rule::method_call => {
                let mut inner = content(op);
                let method = ident(required(&mut inner, Rule::member_name, "method call")?);
                Expression::MethodCall {
                    target,
                    method,
                    args: optional_arguments(inner.next(), depth)?,
                }
            }
            Rule::field_access => {
                let field = ident(required(&mut content(op), Rule::member_name, "field access")?);
                Expression::FieldAccess { target, field }
            }
            Rule::call => Expression::Call {
                callee: target,
                args: optional_arguments(content(op).next(), depth)?,
            },
            Rule::index => {
                let index = required(&mut content(op), Rule::expression, "member access")?;
                Expression::MemberAccess {
                    target,
                    index: Box::new(Expression::from_parsed_rule(index, depth)?),
                }
            }
            _ => return Err(unexpected(&op, "postfix expression")),
        };
    }
    Ok(expr)
}

fn primary(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<Expression> {
    let primary = required(&mut pair.into_inner(), Rule::primary, "expression")?;
    let raw = primary.as_str().to_string();
    Ok(match primary.as_rule() {
        Rule::int_literal => Expression::Literal(Literal::Int(raw)),
        Rule::float_literal => Expression::Literal(Literal::Float(raw)),
        Rule::string_literal => Expression::Literal(Literal::Str(raw)),
        Rule::boolean_literal => Expression::Literal(Literal::Bool(raw == "true")),
        Rule::null_literal => Expression::Literal(Literal::Null),
        Rule::nil_literal => Expression::Literal(Literal::Nil),
        Rule::group => {
            let inner = required(&mut content(primary), Rule::expression, "group")?;
            Expression::Group(Box::new(Expression::from_parsed_rule(inner, depth)?))
        }
        Rule::list_constructor => {
            Expression::List(optional_arguments(content(primary).next(), depth)?)
        }
        Rule::mapping_constructor => Expression::Mapping(
            content(primary)
                .map(|field| mapping_field(field, depth))
                .collect::<ParseResult<Vec<_>>>()?,
        ),
        Rule::new_expression => {
            let mut ty = None;
            let mut args = Vec::new();
            for part in content(primary) {
                match part.as_rule() {
                    Rule::qualified_name => ty = Some(qualified_name(part)),
                    Rule::arguments => args = expressions(part, depth)?,
                    _ => return Err(unexpected(&part, "new expression")),
                }
            }
            Expression::New { ty, args }
        }
        Rule::variable_reference => {
            let mut names: Vec<Ident> = content(primary).map(ident).collect();
            let name = names
                .pop()
                .ok_or_else(|| missing(Rule::identifier, "variable reference"))?;
            Expression::VarRef {
                module: names.pop(),
                name,
            }
        }
        _ => return Err(unexpected(&primary, "expression")),
    })
}

fn mapping_field(pair: Pair<'_, Rule>, depth: usize) -> ParseResult<MappingField> {
    let mut inner = content(pair);
    let key_pair = required(&mut inner, Rule::mapping_key, "mapping field")?;
    let key = required(&mut key_pair.into_inner(), Rule::mapping_key, "mapping field")?;
    let key = match key.as_rule() {
        Rule::string_literal => MappingKey::Str(key.as_str().to_string()),
        _ => MappingKey::Ident(ident(key)),
    };
    let value = Expression::from_parsed_rule(
        required(&mut inner, Rule::expression, "mapping field")?,
        depth,
    )?;
    Ok(MappingField { key, value })
}
