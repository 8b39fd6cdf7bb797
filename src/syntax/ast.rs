//! Syntax tree for a compilation unit.
//!
//! Nodes carry no source spans, so two trees compare equal when they have the
//! same structure regardless of how the source was laid out. Nodes are never
//! mutated in place: the `with_*` methods consume a node and return the
//! rebuilt one, which is how the generator grafts separately parsed children.

use std::fmt;

/// An identifier as spelled in source (escapes and a leading `'` included).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn new(text: impl Into<String>) -> Self {
        Ident(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Root node: every import followed by every module-level member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationUnit {
    pub imports: Vec<ImportDeclaration>,
    pub members: Vec<ModuleMember>,
    pub eof: EndOfInput,
}

/// End-of-input marker closing a compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndOfInput;

impl CompilationUnit {
    pub fn new(imports: Vec<ImportDeclaration>, members: Vec<ModuleMember>, eof: EndOfInput) -> Self {
        CompilationUnit {
            imports,
            members,
            eof,
        }
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDeclaration> {
        self.members.iter().filter_map(|m| match m {
            ModuleMember::Service(s) => Some(s),
            ModuleMember::Listener(_) => None,
        })
    }

    pub fn listeners(&self) -> impl Iterator<Item = &ListenerDeclaration> {
        self.members.iter().filter_map(|m| match m {
            ModuleMember::Listener(l) => Some(l),
            ModuleMember::Service(_) => None,
        })
    }
}

/// `import org/module.sub as prefix;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub org: Option<Ident>,
    pub module: Vec<Ident>,
    pub prefix: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleMember {
    Listener(ListenerDeclaration),
    Service(ServiceDeclaration),
}

impl ModuleMember {
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleMember::Listener(_) => "listener declaration",
            ModuleMember::Service(_) => "service declaration",
        }
    }
}

/// `listener http:Listener name = new (9090);`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerDeclaration {
    pub ty: TypeDescriptor,
    pub name: Ident,
    pub initializer: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServicePath {
    /// No attach point: `service on l1 { }`
    None,
    /// `/` followed by zero or more segments, e.g. `/greeting/v1`.
    Absolute(Vec<Ident>),
    /// String literal attach point, kept raw.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDeclaration {
    pub base_path: ServicePath,
    pub listeners: Vec<Expression>,
    pub members: Vec<ResourceMethod>,
}

impl ServiceDeclaration {
    /// Rebuild the service with `members` replacing its current body.
    pub fn with_members(self, members: Vec<ResourceMethod>) -> Self {
        ServiceDeclaration { members, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePathSegment {
    Name(Ident),
    /// `.`, the service root.
    Dot,
    /// `[string id]`
    Param { ty: TypeDescriptor, name: Ident },
    /// `[string... rest]`
    Rest { ty: TypeDescriptor, name: Ident },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: TypeDescriptor,
    pub name: Ident,
}

/// `resource function get path(params) returns T { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMethod {
    pub method: Ident,
    pub path: Vec<ResourcePathSegment>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeDescriptor>,
    pub body: Block,
}

impl ResourceMethod {
    /// Rebuild the method with `body` replacing its current body block.
    pub fn with_body(self, body: Block) -> Self {
        ResourceMethod { body, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `int`, `Person`, `http:Listener`
    Named { module: Option<Ident>, name: Ident },
    Map(Box<TypeDescriptor>),
    Array(Box<TypeDescriptor>),
    Optional(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    /// `()`
    Nil,
}

impl TypeDescriptor {
    pub fn named(name: &str) -> Self {
        TypeDescriptor::Named {
            module: None,
            name: Ident::new(name),
        }
    }
}

/// Variable binding in `foreach` or a local declaration; `ty: None` means `var`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub ty: Option<TypeDescriptor>,
    pub name: Ident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOperator {
    Add,
    Subtract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Local {
        is_final: bool,
        binding: Binding,
        initializer: Option<Expression>,
    },
    Assign {
        target: Expression,
        value: Expression,
    },
    CompoundAssign {
        target: Expression,
        operator: CompoundOperator,
        value: Expression,
    },
    Expression(Expression),
    Return(Option<Expression>),
    If(IfStatement),
    While {
        condition: Expression,
        body: Block,
    },
    Foreach {
        binding: Binding,
        iterable: Expression,
        body: Block,
    },
    Panic(Expression),
    Break,
    Continue,
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_block: Block,
    pub else_clause: Option<ElseClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElseClause {
    If(Box<IfStatement>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(String),
    Float(String),
    Str(String),
    Bool(bool),
    Null,
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
    Check,
    CheckPanic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 3,
            BinaryOperator::Less
            | BinaryOperator::Greater
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterEqual => 4,
            BinaryOperator::Add | BinaryOperator::Subtract => 5,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingKey {
    Ident(Ident),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingField {
    pub key: MappingKey,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(Literal),
    VarRef {
        module: Option<Ident>,
        name: Ident,
    },
    FieldAccess {
        target: Box<Expression>,
        field: Ident,
    },
    MethodCall {
        target: Box<Expression>,
        method: Ident,
        args: Vec<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    MemberAccess {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    List(Vec<Expression>),
    Mapping(Vec<MappingField>),
    /// `new (args)` when `ty` is `None`, otherwise `new T(args)`.
    New {
        ty: Option<TypeDescriptor>,
        args: Vec<Expression>,
    },
    Group(Box<Expression>),
}

impl Expression {
    pub fn var(name: &str) -> Self {
        Expression::VarRef {
            module: None,
            name: Ident::new(name),
        }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expression::VarRef { .. }
                | Expression::FieldAccess { .. }
                | Expression::MemberAccess { .. }
        )
    }
}
