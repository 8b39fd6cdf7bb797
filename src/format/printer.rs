use super::{FormatError, FormatOptions, MAX_INDENT_WIDTH};
use crate::syntax::*;

type PrintResult<T> = Result<T, FormatError>;

/// Precedence reported for unary expressions.
const UNARY_PRECEDENCE: u8 = 7;
/// Precedence of primaries and postfix expressions.
const ATOM_PRECEDENCE: u8 = 8;

/// Line-oriented printer producing canonical source text.
pub struct Printer {
    options: FormatOptions,
    out: String,
    level: usize,
}

impl Printer {
    pub fn new(options: FormatOptions) -> Self {
        Printer {
            options: FormatOptions {
                indent_width: options.indent_width.min(MAX_INDENT_WIDTH),
            },
            out: String::new(),
            level: 0,
        }
    }

    /// Print a compilation unit. An empty unit prints as an empty string;
    /// anything else ends with exactly one newline.
    pub fn print_unit(mut self, unit: &CompilationUnit) -> PrintResult<String> {
        for import in &unit.imports {
            let text = self.import(import)?;
            self.line(&text);
        }
        for (idx, member) in unit.members.iter().enumerate() {
            if idx > 0 || !unit.imports.is_empty() {
                self.blank();
            }
            match member {
                ModuleMember::Listener(listener) => self.listener(listener)?,
                ModuleMember::Service(service) => self.service(service)?,
            }
        }
        Ok(self.out)
    }

    fn line(&mut self, text: &str) {
        let width = self.level * self.options.indent_width;
        self.out.extend(std::iter::repeat(' ').take(width));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn nested(&mut self, block: &Block) -> PrintResult<()> {
        self.level += 1;
        for statement in &block.statements {
            self.statement(statement)?;
        }
        self.level -= 1;
        Ok(())
    }

    /// `header {`, the block's statements one level deeper, then `}`.
    fn braced(&mut self, header: &str, block: &Block) -> PrintResult<()> {
        self.line(&format!("{header} {{"));
        self.nested(block)?;
        self.line("}");
        Ok(())
    }

    // ----- declarations -----

    fn import(&self, import: &ImportDeclaration) -> PrintResult<String> {
        if import.module.is_empty() {
            return Err(FormatError::Unprintable {
                context: "import declaration",
                reason: "module name is empty".to_string(),
            });
        }
        let module = import
            .module
            .iter()
            .map(|part| ident(part, "import module"))
            .collect::<PrintResult<Vec<_>>>()?
            .join(".");
        let mut text = match &import.org {
            Some(org) => format!("import {}/{module}", ident(org, "import organization")?),
            None => format!("import {module}"),
        };
        if let Some(prefix) = &import.prefix {
            text.push_str(" as ");
            text.push_str(ident(prefix, "import prefix")?);
        }
        text.push(';');
        Ok(text)
    }

    fn listener(&mut self, listener: &ListenerDeclaration) -> PrintResult<()> {
        let text = format!(
            "listener {} {} = {};",
            type_descriptor(&listener.ty)?,
            ident(&listener.name, "listener name")?,
            expression(&listener.initializer, 0)?
        );
        self.line(&text);
        Ok(())
    }

    fn service(&mut self, service: &ServiceDeclaration) -> PrintResult<()> {
        let mut header = String::from("service");
        match &service.base_path {
            ServicePath::None => {}
            ServicePath::Absolute(segments) => {
                let segments = segments
                    .iter()
                    .map(|s| ident(s, "service path"))
                    .collect::<PrintResult<Vec<_>>>()?;
                header.push_str(" /");
                header.push_str(&segments.join("/"));
            }
            ServicePath::Literal(raw) => {
                header.push(' ');
                header.push_str(literal(raw, "service path")?);
            }
        }
        header.push_str(" on");
        if !service.listeners.is_empty() {
            header.push(' ');
            header.push_str(&expression_list(&service.listeners)?);
        }
        self.line(&format!("{header} {{"));
        self.level += 1;
        for (idx, method) in service.members.iter().enumerate() {
            if idx > 0 {
                self.blank();
            }
            self.resource_method(method)?;
        }
        self.level -= 1;
        self.line("}");
        Ok(())
    }

    fn resource_method(&mut self, method: &ResourceMethod) -> PrintResult<()> {
        if method.path.is_empty() {
            return Err(FormatError::Unprintable {
                context: "resource method",
                reason: "resource path is empty".to_string(),
            });
        }
        let path = method
            .path
            .iter()
            .map(resource_path_segment)
            .collect::<PrintResult<Vec<_>>>()?
            .join("/");
        let params = method
            .params
            .iter()
            .map(|p| {
                Ok(format!(
                    "{} {}",
                    type_descriptor(&p.ty)?,
                    ident(&p.name, "parameter name")?
                ))
            })
            .collect::<PrintResult<Vec<_>>>()?
            .join(", ");
        let mut header = format!(
            "resource function {} {path}({params})",
            ident(&method.method, "resource method name")?
        );
        if let Some(ty) = &method.return_type {
            header.push_str(" returns ");
            header.push_str(&type_descriptor(ty)?);
        }
        self.braced(&header, &method.body)
    }

    // ----- statements -----

    fn statement(&mut self, statement: &Statement) -> PrintResult<()> {
        match statement {
            Statement::Local {
                is_final,
                binding,
                initializer,
            } => {
                let mut text = String::new();
                if *is_final {
                    text.push_str("final ");
                }
                text.push_str(&self.binding(binding)?);
                if let Some(value) = initializer {
                    text.push_str(" = ");
                    text.push_str(&expression(value, 0)?);
                }
                text.push(';');
                self.line(&text);
            }
            Statement::Assign { target, value } => {
                let text = format!("{} = {};", expression(target, 0)?, expression(value, 0)?);
                self.line(&text);
            }
            Statement::CompoundAssign {
                target,
                operator,
                value,
            } => {
                let op = match operator {
                    CompoundOperator::Add => "+=",
                    CompoundOperator::Subtract => "-=",
                };
                let text = format!("{} {op} {};", expression(target, 0)?, expression(value, 0)?);
                self.line(&text);
            }
            Statement::Expression(expr) => {
                let text = format!("{};", expression(expr, 0)?);
                self.line(&text);
            }
            Statement::Return(None) => self.line("return;"),
            Statement::Return(Some(value)) => {
                let text = format!("return {};", expression(value, 0)?);
                self.line(&text);
            }
            Statement::If(stmt) => self.if_statement(stmt, "")?,
            Statement::While { condition, body } => {
                let header = format!("while {}", expression(condition, 0)?);
                self.braced(&header, body)?;
            }
            Statement::Foreach {
                binding,
                iterable,
                body,
            } => {
                let header = format!(
                    "foreach {} in {}",
                    self.binding(binding)?,
                    expression(iterable, 0)?
                );
                self.braced(&header, body)?;
            }
            Statement::Panic(value) => {
                let text = format!("panic {};", expression(value, 0)?);
                self.line(&text);
            }
            Statement::Break => self.line("break;"),
            Statement::Continue => self.line("continue;"),
            Statement::Block(block) => {
                self.line("{");
                self.nested(block)?;
                self.line("}");
            }
        }
        Ok(())
    }

    fn if_statement(&mut self, stmt: &IfStatement, lead: &str) -> PrintResult<()> {
        let header = format!("{lead}if {} {{", expression(&stmt.condition, 0)?);
        self.line(&header);
        self.nested(&stmt.then_block)?;
        match &stmt.else_clause {
            None => self.line("}"),
            Some(ElseClause::If(next)) => self.if_statement(next, "} else ")?,
            Some(ElseClause::Block(block)) => {
                self.line("} else {");
                self.nested(block)?;
                self.line("}");
            }
        }
        Ok(())
    }

    fn binding(&self, binding: &Binding) -> PrintResult<String> {
        let name = ident(&binding.name, "variable name")?;
        Ok(match &binding.ty {
            Some(ty) => format!("{} {name}", type_descriptor(ty)?),
            None => format!("var {name}"),
        })
    }
}

fn ident<'a>(ident: &'a Ident, context: &'static str) -> PrintResult<&'a str> {
    if is_identifier(ident.as_str()) {
        Ok(ident.as_str())
    } else {
        Err(FormatError::InvalidIdentifier {
            context,
            text: ident.as_str().to_string(),
        })
    }
}

/// Field and method names additionally accept reserved words.
fn member_name<'a>(name: &'a Ident, context: &'static str) -> PrintResult<&'a str> {
    if is_keyword(name.as_str()) {
        return Ok(name.as_str());
    }
    ident(name, context)
}

fn literal<'a>(raw: &'a str, context: &'static str) -> PrintResult<&'a str> {
    if is_literal(raw) {
        Ok(raw)
    } else {
        Err(FormatError::InvalidLiteral {
            context,
            text: raw.to_string(),
        })
    }
}

fn resource_path_segment(segment: &ResourcePathSegment) -> PrintResult<String> {
    Ok(match segment {
        ResourcePathSegment::Name(name) => ident(name, "resource path")?.to_string(),
        ResourcePathSegment::Dot => ".".to_string(),
        ResourcePathSegment::Param { ty, name } => format!(
            "[{} {}]",
            type_descriptor(ty)?,
            ident(name, "path parameter")?
        ),
        ResourcePathSegment::Rest { ty, name } => format!(
            "[{}... {}]",
            type_descriptor(ty)?,
            ident(name, "path parameter")?
        ),
    })
}

fn type_descriptor(ty: &TypeDescriptor) -> PrintResult<String> {
    Ok(match ty {
        TypeDescriptor::Named { module, name } => {
            let name = ident(name, "type name")?;
            match module {
                Some(module) => format!("{}:{name}", ident(module, "type module prefix")?),
                None => name.to_string(),
            }
        }
        TypeDescriptor::Map(inner) => format!("map<{}>", type_descriptor(inner)?),
        TypeDescriptor::Array(inner) => format!("{}[]", type_atom(inner)?),
        TypeDescriptor::Optional(inner) => format!("{}?", type_atom(inner)?),
        TypeDescriptor::Union(members) => {
            if members.is_empty() {
                return Err(FormatError::Unprintable {
                    context: "union type",
                    reason: "union has no members".to_string(),
                });
            }
            members
                .iter()
                .map(type_atom)
                .collect::<PrintResult<Vec<_>>>()?
                .join("|")
        }
        TypeDescriptor::Nil => "()".to_string(),
    })
}

/// Parenthesize unions where a tighter-binding position needs them.
fn type_atom(ty: &TypeDescriptor) -> PrintResult<String> {
    match ty {
        TypeDescriptor::Union(_) => Ok(format!("({})", type_descriptor(ty)?)),
        _ => type_descriptor(ty),
    }
}

fn precedence(expr: &Expression) -> u8 {
    match expr {
        Expression::Binary { operator, .. } => operator.precedence(),
        Expression::Unary { .. } => UNARY_PRECEDENCE,
        _ => ATOM_PRECEDENCE,
    }
}

fn expression_list(exprs: &[Expression]) -> PrintResult<String> {
    Ok(exprs
        .iter()
        .map(|e| expression(e, 0))
        .collect::<PrintResult<Vec<_>>>()?
        .join(", "))
}

/// Print `expr`, adding parentheses when it binds looser than `min_precedence`.
fn expression(expr: &Expression, min_precedence: u8) -> PrintResult<String> {
    let text = match expr {
        Expression::Literal(lit) => match lit {
            Literal::Int(raw) | Literal::Float(raw) | Literal::Str(raw) => {
                literal(raw, "literal")?.to_string()
            }
            Literal::Bool(true) => "true".to_string(),
            Literal::Bool(false) => "false".to_string(),
            Literal::Null => "null".to_string(),
            Literal::Nil => "()".to_string(),
        },
        Expression::VarRef { module, name } => {
            let name = ident(name, "variable reference")?;
            match module {
                Some(module) => format!("{}:{name}", ident(module, "module prefix")?),
                None => name.to_string(),
            }
        }
        Expression::FieldAccess { target, field } => format!(
            "{}.{}",
            expression(target, ATOM_PRECEDENCE)?,
            member_name(field, "field name")?
        ),
        Expression::MethodCall {
            target,
            method,
            args,
        } => format!(
            "{}.{}({})",
            expression(target, ATOM_PRECEDENCE)?,
            member_name(method, "method name")?,
            expression_list(args)?
        ),
        Expression::Call { callee, args } => format!(
            "{}({})",
            expression(callee, ATOM_PRECEDENCE)?,
            expression_list(args)?
        ),
        Expression::MemberAccess { target, index } => format!(
            "{}[{}]",
            expression(target, ATOM_PRECEDENCE)?,
            expression(index, 0)?
        ),
        Expression::Unary { operator, operand } => {
            let operand = expression(operand, UNARY_PRECEDENCE)?;
            match operator {
                UnaryOperator::Not => format!("!{operand}"),
                UnaryOperator::Negate => format!("-{operand}"),
                UnaryOperator::Check => format!("check {operand}"),
                UnaryOperator::CheckPanic => format!("checkpanic {operand}"),
            }
        }
        Expression::Binary { operator, lhs, rhs } => {
            let p = operator.precedence();
            format!(
                "{} {} {}",
                expression(lhs, p)?,
                operator.as_str(),
                expression(rhs, p + 1)?
            )
        }
        Expression::List(items) => format!("[{}]", expression_list(items)?),
        Expression::Mapping(fields) => {
            let fields = fields
                .iter()
                .map(|field| {
                    let key = match &field.key {
                        MappingKey::Ident(name) => ident(name, "mapping key")?,
                        MappingKey::Str(raw) => literal(raw, "mapping key")?,
                    };
                    Ok(format!("{key}: {}", expression(&field.value, 0)?))
                })
                .collect::<PrintResult<Vec<_>>>()?;
            format!("{{{}}}", fields.join(", "))
        }
        Expression::New { ty: None, args } => format!("new ({})", expression_list(args)?),
        Expression::New { ty: Some(ty), args } => match ty {
            TypeDescriptor::Named { .. } => {
                format!("new {}({})", type_descriptor(ty)?, expression_list(args)?)
            }
            _ => {
                return Err(FormatError::Unprintable {
                    context: "new expression",
                    reason: "only named types can be constructed".to_string(),
                })
            }
        },
        Expression::Group(inner) => format!("({})", expression(inner, 0)?),
    };
    if precedence(expr) < min_precedence {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}
