pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Primitive {
        Int,
        Float,
        String,
        Bool,
    }

    impl Primitive {
        pub fn from_name(name: &str) -> Option<Self> {
            match name {
                "int" => Some(Primitive::Int),
                "float" => Some(Primitive::Float),
                "string" => Some(Primitive::String),
                "bool" => Some(Primitive::Bool),
                _ => None,
            }
        }

        pub fn name(self) -> &'static str {
            match self {
                Primitive::Int => "int",
                Primitive::Float => "float",
                Primitive::String => "string",
                Primitive::Bool => "bool",
            }
        }

        pub fn is_numeric(self) -> bool {
            matches!(self, Primitive::Int | Primitive::Float)
        }
    }

    /// Signature of a function value.
    ///
    /// `type_index` is a slot reserved for the code generator's type table; it
    /// never takes part in equality.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct FunctionType {
        pub arguments: Vec<Type>,
        pub returns: Vec<Type>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub type_index: Option<u32>,
    }

    impl FunctionType {
        pub fn new(arguments: Vec<Type>, returns: Vec<Type>) -> Self {
            Self { arguments, returns, type_index: None }
        }
    }

    impl PartialEq for FunctionType {
        fn eq(&self, other: &Self) -> bool {
            self.arguments == other.arguments && self.returns == other.returns
        }
    }
    impl Eq for FunctionType {}

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Type {
        Standard(Primitive),
        Array(Box<Type>),
        Function(FunctionType),
        /// Placeholder bound per call site; only built-in signatures carry these.
        AnyHole(String),
    }

    impl Type {
        pub fn int() -> Self {
            Type::Standard(Primitive::Int)
        }
        pub fn float() -> Self {
            Type::Standard(Primitive::Float)
        }
        pub fn string() -> Self {
            Type::Standard(Primitive::String)
        }
        pub fn bool() -> Self {
            Type::Standard(Primitive::Bool)
        }
        pub fn array(element: Type) -> Self {
            Type::Array(Box::new(element))
        }
        pub fn function(arguments: Vec<Type>, returns: Vec<Type>) -> Self {
            Type::Function(FunctionType::new(arguments, returns))
        }
        pub fn hole(name: &str) -> Self {
            Type::AnyHole(name.to_string())
        }

        pub fn primitive(&self) -> Option<Primitive> {
            match self {
                Type::Standard(p) => Some(*p),
                _ => None,
            }
        }

        pub fn as_function(&self) -> Option<&FunctionType> {
            match self {
                Type::Function(f) => Some(f),
                _ => None,
            }
        }

        pub fn is_function(&self) -> bool {
            matches!(self, Type::Function(_))
        }

        pub fn contains_hole(&self) -> bool {
            match self {
                Type::Standard(_) => false,
                Type::AnyHole(_) => true,
                Type::Array(el) => el.contains_hole(),
                Type::Function(f) => {
                    f.arguments.iter().any(Type::contains_hole)
                        || f.returns.iter().any(Type::contains_hole)
                }
            }
        }
    }

    pub fn format_list(types: &[Type]) -> String {
        types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
    }

    /// Surface syntax; two types are equal exactly when these renderings are.
    impl fmt::Display for Type {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Type::Standard(p) => f.write_str(p.name()),
                Type::Array(el) => write!(f, "[]{}", el),
                Type::Function(ft) => write!(
                    f,
                    "({}) -> ({})",
                    format_list(&ft.arguments),
                    format_list(&ft.returns)
                ),
                Type::AnyHole(name) => write!(f, "?{}", name),
            }
        }
    }
}

pub mod ast {
    use crate::types::{FunctionType, Type};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum BinaryOp {
        Add,
        Sub,
        Mul,
        Div,
        Eq,
        NotEq,
        Or,
        And,
        Greater,
        GreaterEq,
        Less,
        LessEq,
    }

    impl BinaryOp {
        pub fn symbol(self) -> &'static str {
            match self {
                BinaryOp::Add => "+",
                BinaryOp::Sub => "-",
                BinaryOp::Mul => "*",
                BinaryOp::Div => "/",
                BinaryOp::Eq => "==",
                BinaryOp::NotEq => "!=",
                BinaryOp::Or => "||",
                BinaryOp::And => "&&",
                BinaryOp::Greater => ">",
                BinaryOp::GreaterEq => ">=",
                BinaryOp::Less => "<",
                BinaryOp::LessEq => "<=",
            }
        }

        pub fn is_logical(self) -> bool {
            matches!(self, BinaryOp::Or | BinaryOp::And)
        }

        pub fn is_equality(self) -> bool {
            matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
        }

        pub fn is_ordering(self) -> bool {
            matches!(
                self,
                BinaryOp::Greater | BinaryOp::GreaterEq | BinaryOp::Less | BinaryOp::LessEq
            )
        }

        pub fn is_arithmetic(self) -> bool {
            matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
        }

        /// Result of applying the operator to operands of `operand` type.
        pub fn result_type(self, operand: &Type) -> Type {
            if self.is_arithmetic() {
                operand.clone()
            } else {
                Type::bool()
            }
        }
    }

    impl fmt::Display for BinaryOp {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.symbol())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Variable {
        pub identifier: String,
        /// `None` until annotated in source or inferred by the validator.
        pub ty: Option<Type>,
    }

    impl Variable {
        pub fn new(identifier: impl Into<String>, ty: Option<Type>) -> Self {
            Self { identifier: identifier.into(), ty }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct FunctionDefinition {
        pub arguments: Vec<Variable>,
        pub return_types: Vec<Type>,
        /// The source left out `-> (...)`; return types come from the body.
        pub return_types_omitted: bool,
        pub body: Block,
        pub function_type: Option<FunctionType>,
    }

    impl FunctionDefinition {
        /// The signature as written, if every argument is annotated.
        pub fn declared_type(&self) -> Option<FunctionType> {
            let arguments = self
                .arguments
                .iter()
                .map(|a| a.ty.clone())
                .collect::<Option<Vec<_>>>()?;
            Some(FunctionType::new(arguments, self.return_types.clone()))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Apply {
        pub function: Box<Expr>,
        pub arguments: Vec<Expr>,
        pub return_types: Vec<Type>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct If {
        pub condition: Box<Expr>,
        pub true_branch: Box<Expr>,
        pub false_branch: Box<Expr>,
        pub return_types: Vec<Type>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Operator {
        pub op: BinaryOp,
        pub operand_type: Option<Type>,
        pub left: Box<Expr>,
        pub right: Box<Expr>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ArrayLiteral {
        pub element_type: Option<Type>,
        pub elements: Vec<Expr>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Expr {
        Variable(Variable),
        FunctionDefinition(FunctionDefinition),
        Apply(Apply),
        If(If),
        Int(i64),
        Float(f64),
        Str(String),
        Bool(bool),
        Operator(Operator),
        Array(ArrayLiteral),
    }

    impl Expr {
        pub fn variable(name: &str) -> Self {
            Expr::Variable(Variable::new(name, None))
        }

        pub fn operator(op: BinaryOp, left: Expr, right: Expr) -> Self {
            Expr::Operator(Operator {
                op,
                operand_type: None,
                left: Box::new(left),
                right: Box::new(right),
            })
        }

        /// Types this expression yields; empty while still unvalidated.
        pub fn return_types(&self) -> Vec<Type> {
            match self {
                Expr::Variable(v) => v.ty.iter().cloned().collect(),
                Expr::FunctionDefinition(def) => def
                    .function_type
                    .iter()
                    .map(|ft| Type::Function(ft.clone()))
                    .collect(),
                Expr::Apply(a) => a.return_types.clone(),
                Expr::If(i) => i.return_types.clone(),
                Expr::Int(_) => vec![Type::int()],
                Expr::Float(_) => vec![Type::float()],
                Expr::Str(_) => vec![Type::string()],
                Expr::Bool(_) => vec![Type::bool()],
                Expr::Operator(o) => o
                    .operand_type
                    .iter()
                    .map(|t| o.op.result_type(t))
                    .collect(),
                Expr::Array(a) => a.element_type.iter().cloned().map(Type::array).collect(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Assignment {
        pub variables: Vec<Variable>,
        pub value: Expr,
        pub line: usize,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Return {
        pub expressions: Vec<Expr>,
        pub line: usize,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Statement {
        Assignment(Assignment),
        Return(Return),
    }

    impl Statement {
        pub fn line(&self) -> usize {
            match self {
                Statement::Assignment(a) => a.line,
                Statement::Return(r) => r.line,
            }
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Block {
        pub statements: Vec<Statement>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Program {
        pub body: Block,
    }

    /// Borrowed view over any tree position, for passes that only need to
    /// walk children without caring about the node kind.
    #[derive(Debug, Clone, Copy)]
    pub enum Node<'a> {
        Program(&'a Program),
        Block(&'a Block),
        Statement(&'a Statement),
        Expr(&'a Expr),
    }

    impl<'a> Node<'a> {
        pub fn children(self) -> Vec<Node<'a>> {
            match self {
                Node::Program(p) => vec![Node::Block(&p.body)],
                Node::Block(b) => b.statements.iter().map(Node::Statement).collect(),
                Node::Statement(Statement::Assignment(a)) => vec![Node::Expr(&a.value)],
                Node::Statement(Statement::Return(r)) => {
                    r.expressions.iter().map(Node::Expr).collect()
                }
                Node::Expr(e) => match e {
                    Expr::FunctionDefinition(def) => vec![Node::Block(&def.body)],
                    Expr::Apply(a) => std::iter::once(Node::Expr(a.function.as_ref()))
                        .chain(a.arguments.iter().map(Node::Expr))
                        .collect(),
                    Expr::If(i) => vec![
                        Node::Expr(i.condition.as_ref()),
                        Node::Expr(i.true_branch.as_ref()),
                        Node::Expr(i.false_branch.as_ref()),
                    ],
                    Expr::Operator(o) => {
                        vec![Node::Expr(o.left.as_ref()), Node::Expr(o.right.as_ref())]
                    }
                    Expr::Array(a) => a.elements.iter().map(Node::Expr).collect(),
                    Expr::Variable(_)
                    | Expr::Int(_)
                    | Expr::Float(_)
                    | Expr::Str(_)
                    | Expr::Bool(_) => Vec::new(),
                },
            }
        }

        pub fn return_types(self) -> Vec<Type> {
            match self {
                Node::Program(_) | Node::Block(_) => Vec::new(),
                Node::Statement(Statement::Assignment(_)) => Vec::new(),
                Node::Statement(Statement::Return(r)) => {
                    r.expressions.iter().flat_map(Expr::return_types).collect()
                }
                Node::Expr(e) => e.return_types(),
            }
        }

        /// Pre-order search: true if `pred` holds for this node or any descendant.
        pub fn any(self, pred: &mut impl FnMut(Node<'a>) -> bool) -> bool {
            if pred(self) {
                return true;
            }
            self.children().into_iter().any(|c| c.any(&mut *pred))
        }

        pub fn references(self, name: &str) -> bool {
            self.any(&mut |n| {
                matches!(n, Node::Expr(Expr::Variable(v)) if v.identifier == name)
            })
        }
    }
}

pub mod pretty {
    use crate::ast::*;
    use crate::types::format_list;

    fn join(xs: &[Expr]) -> String {
        xs.iter().map(print_expr).collect::<Vec<_>>().join(", ")
    }

    pub fn print_expr(e: &Expr) -> String {
        match e {
            Expr::Variable(v) => v.identifier.clone(),
            Expr::Int(n) => format!("{n}"),
            Expr::Float(f) => format!("{:?}", f),
            Expr::Str(s) => format!("\"{}\"", s.escape_default()),
            Expr::Bool(b) => format!("{}", b),
            Expr::Operator(o) => {
                format!("({} {} {})", print_expr(&o.left), o.op, print_expr(&o.right))
            }
            Expr::Apply(a) => {
                let mut parts = vec![print_expr(&a.function)];
                parts.extend(a.arguments.iter().map(print_expr));
                format!("(!{})", parts.join(" "))
            }
            Expr::If(i) => format!(
                "(if {} {} else {})",
                print_expr(&i.condition),
                print_expr(&i.true_branch),
                print_expr(&i.false_branch)
            ),
            Expr::Array(a) => format!("[{}]", join(&a.elements)),
            Expr::FunctionDefinition(def) => {
                let args = def
                    .arguments
                    .iter()
                    .map(print_variable)
                    .collect::<Vec<_>>()
                    .join(", ");
                let body = def
                    .body
                    .statements
                    .iter()
                    .map(print_statement)
                    .collect::<Vec<_>>()
                    .join("; ");
                if def.return_types_omitted {
                    format!("({}) -> {{ {} }}", args, body)
                } else {
                    format!("({}) -> ({}) {{ {} }}", args, format_list(&def.return_types), body)
                }
            }
        }
    }

    pub fn print_variable(v: &Variable) -> String {
        match &v.ty {
            Some(t) => format!("{} {}", v.identifier, t),
            None => v.identifier.clone(),
        }
    }

    pub fn print_statement(s: &Statement) -> String {
        match s {
            Statement::Assignment(a) => {
                let lhs = a.variables.iter().map(print_variable).collect::<Vec<_>>().join(", ");
                format!("{} = {}", lhs, print_expr(&a.value))
            }
            Statement::Return(r) => format!("return {}", join(&r.expressions)),
        }
    }

    pub fn print_program(p: &Program) -> String {
        p.body
            .statements
            .iter()
            .map(print_statement)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::ast::*;
    use super::pretty::*;
    use super::types::*;

    #[test]
    fn type_display_uses_surface_syntax() {
        let t = Type::function(
            vec![Type::array(Type::int()), Type::bool()],
            vec![Type::array(Type::array(Type::hole("a")))],
        );
        assert_eq!(t.to_string(), "([]int, bool) -> ([][]?a)");
    }

    #[test]
    fn type_index_does_not_affect_equality() {
        let mut ft = FunctionType::new(vec![Type::int()], vec![Type::float()]);
        let plain = Type::Function(ft.clone());
        ft.type_index = Some(7);
        assert_eq!(Type::Function(ft), plain);
        assert_ne!(Type::array(Type::int()), Type::array(Type::float()));
    }

    #[test]
    fn references_walks_nested_bodies() {
        let inner = Expr::Apply(Apply {
            function: Box::new(Expr::variable("f")),
            arguments: vec![Expr::operator(BinaryOp::Sub, Expr::variable("n"), Expr::Int(1))],
            return_types: vec![],
        });
        let body = Block {
            statements: vec![Statement::Return(Return { expressions: vec![inner], line: 1 })],
        };
        assert!(Node::Block(&body).references("f"));
        assert!(Node::Block(&body).references("n"));
        assert!(!Node::Block(&body).references("g"));
    }

    #[test]
    fn operator_result_type_follows_op() {
        let mut e = Expr::operator(BinaryOp::Less, Expr::Int(1), Expr::Int(2));
        assert!(e.return_types().is_empty());
        if let Expr::Operator(o) = &mut e {
            o.operand_type = Some(Type::int());
        }
        assert_eq!(e.return_types(), vec![Type::bool()]);
        assert_eq!(print_expr(&e), "(1 < 2)");
    }

    #[test]
    fn serializes_to_json() {
        let e = Expr::Array(ArrayLiteral {
            element_type: Some(Type::int()),
            elements: vec![Expr::Int(1)],
        });
        let s = serde_json::to_string(&e).unwrap();
        let back: Expr = serde_json::from_str(&s).unwrap();
        assert_eq!(back, e);
    }
}
