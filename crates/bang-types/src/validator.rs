//! Bottom-up type validation.
//!
//! Every node is consumed and rebuilt with its type fields filled in; the
//! result types of each expression travel back up alongside it.

use crate::builtins::builtin;
use crate::error::TypeError;
use crate::symbols::{ScopeKind, SymbolController};
use crate::unification::{bind_argument, substitute, Bindings};
use bang_ast::ast::*;
use bang_ast::types::{format_list, FunctionType, Primitive, Type};
use tracing::{debug, trace};

/// Return signatures collected from the `return` statements of one block.
type ReturnCandidates = Vec<Vec<Type>>;

pub struct Validator {
    symbols: SymbolController,
    line: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self { symbols: SymbolController::new(), line: 1 }
    }

    pub fn symbols(&self) -> &SymbolController {
        &self.symbols
    }

    pub fn validate(&mut self, program: Program) -> Result<Program, TypeError> {
        let (body, _) = self.block(program.body, false)?;
        Ok(Program { body })
    }

    fn block(&mut self, block: Block, in_function: bool) -> Result<(Block, ReturnCandidates), TypeError> {
        let outer_line = self.line;
        let mut statements = Vec::with_capacity(block.statements.len());
        let mut returns = ReturnCandidates::new();
        for stmt in block.statements {
            self.line = stmt.line();
            let stmt = match stmt {
                Statement::Assignment(a) => Statement::Assignment(self.assignment(a)?),
                Statement::Return(r) => {
                    if !in_function {
                        return Err(TypeError::ReturnOutsideFunction { line: r.line });
                    }
                    let mut expressions = Vec::with_capacity(r.expressions.len());
                    let mut types = Vec::new();
                    for e in r.expressions {
                        let (e, tys) = self.expression(e)?;
                        self.concrete(&tys)?;
                        expressions.push(e);
                        types.extend(tys);
                    }
                    returns.push(types);
                    Statement::Return(Return { expressions, line: r.line })
                }
            };
            statements.push(stmt);
        }
        self.line = outer_line;
        Ok((Block { statements }, returns))
    }

    fn assignment(&mut self, a: Assignment) -> Result<Assignment, TypeError> {
        let Assignment { mut variables, value, line } = a;
        let (value, types) = match value {
            Expr::FunctionDefinition(def) => {
                let single = variables.len() == 1;
                if single && Node::Block(&def.body).references(&variables[0].identifier) {
                    // The name must resolve inside its own body, so bind it first.
                    let name = variables[0].identifier.clone();
                    if def.return_types_omitted {
                        return Err(TypeError::RecursiveWithoutReturnTypes { line, name });
                    }
                    let signature = self.declared_signature(&def)?;
                    self.bind(&mut variables[0], Type::Function(signature))?;
                    debug!(name = %name, "recursive function registered");
                    let (value, _) = self.function_definition(def, true)?;
                    return Ok(Assignment { variables, value, line });
                }
                self.function_definition(def, single)?
            }
            other => self.expression(other)?,
        };
        if variables.len() != types.len() {
            return Err(TypeError::AssignmentArity {
                line,
                variables: variables.len(),
                values: types.len(),
            });
        }
        for (var, ty) in variables.iter_mut().zip(types) {
            self.bind(var, ty)?;
        }
        Ok(Assignment { variables, value, line })
    }

    /// Define or re-assign one variable with the value type `ty`.
    fn bind(&mut self, var: &mut Variable, ty: Type) -> Result<(), TypeError> {
        let line = self.line;
        if let Some(declared) = &var.ty {
            if *declared != ty {
                return Err(TypeError::AnnotationMismatch {
                    line,
                    name: var.identifier.clone(),
                    declared: declared.clone(),
                    found: ty,
                });
            }
        }
        if let Some(name) = first_hole(&ty) {
            return Err(TypeError::UnresolvedTypeHole { line, name });
        }
        match self.symbols.resolve(&var.identifier) {
            Some((_, ScopeKind::Global)) => {
                return Err(TypeError::GlobalMutation { line, name: var.identifier.clone() });
            }
            Some((sym, ScopeKind::Local)) => {
                if sym.ty != ty {
                    return Err(TypeError::LocalTypeChange {
                        line,
                        name: var.identifier.clone(),
                        previous: sym.ty.clone(),
                        found: ty,
                    });
                }
            }
            None => {
                self.symbols.define_variable(&var.identifier, ty.clone());
            }
        }
        var.ty = Some(ty);
        Ok(())
    }

    fn declared_signature(&self, def: &FunctionDefinition) -> Result<FunctionType, TypeError> {
        if let Some(untyped) = def.arguments.iter().find(|a| a.ty.is_none()) {
            return Err(TypeError::UntypedArgument { line: self.line, name: untyped.identifier.clone() });
        }
        def.declared_type()
            .ok_or_else(|| TypeError::UntypedArgument { line: self.line, name: String::new() })
    }

    /// A fixed value type may not keep a hole; only a callee's own signature can.
    fn concrete(&self, types: &[Type]) -> Result<(), TypeError> {
        match types.iter().find_map(first_hole) {
            Some(name) => Err(TypeError::UnresolvedTypeHole { line: self.line, name }),
            None => Ok(()),
        }
    }

    fn expression(&mut self, expr: Expr) -> Result<(Expr, Vec<Type>), TypeError> {
        match expr {
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) => {
                let types = expr.return_types();
                Ok((expr, types))
            }
            Expr::Variable(v) => self.variable(v),
            Expr::Operator(o) => self.operator(o),
            Expr::If(i) => self.if_expression(i),
            Expr::Array(a) => self.array(a),
            Expr::Apply(a) => self.application(a),
            Expr::FunctionDefinition(def) => self.function_definition(def, false),
        }
    }

    fn variable(&mut self, mut v: Variable) -> Result<(Expr, Vec<Type>), TypeError> {
        let ty = match self.symbols.resolve(&v.identifier) {
            Some((sym, _)) => sym.ty.clone(),
            None => match builtin(&v.identifier) {
                Some(sig) => {
                    trace!(name = %v.identifier, "builtin resolved");
                    Type::Function(sig)
                }
                None => {
                    return Err(TypeError::UndefinedIdentifier { line: self.line, name: v.identifier })
                }
            },
        };
        v.ty = Some(ty.clone());
        Ok((Expr::Variable(v), vec![ty]))
    }

    fn operator(&mut self, o: Operator) -> Result<(Expr, Vec<Type>), TypeError> {
        let line = self.line;
        let (left, left_types) = self.expression(*o.left)?;
        let (right, right_types) = self.expression(*o.right)?;
        let (l, r) = match (left_types.as_slice(), right_types.as_slice()) {
            ([l], [r]) => (l.clone(), r.clone()),
            _ => {
                return Err(TypeError::MultiValueOperand {
                    line,
                    op: o.op,
                    left: format_list(&left_types),
                    right: format_list(&right_types),
                })
            }
        };
        let mismatch = || TypeError::OperatorTypes { line, op: o.op, left: l.clone(), right: r.clone() };
        let prim = match (l.primitive(), r.primitive()) {
            (Some(a), Some(b)) if a == b => a,
            _ => return Err(mismatch()),
        };
        let allowed = if o.op.is_logical() {
            prim == Primitive::Bool
        } else if o.op.is_equality() {
            prim.is_numeric() || prim == Primitive::Bool
        } else {
            prim.is_numeric()
        };
        if !allowed {
            return Err(mismatch());
        }
        let result = o.op.result_type(&l);
        let node = Operator { op: o.op, operand_type: Some(l), left: Box::new(left), right: Box::new(right) };
        Ok((Expr::Operator(node), vec![result]))
    }

    fn if_expression(&mut self, i: If) -> Result<(Expr, Vec<Type>), TypeError> {
        let line = self.line;
        let (condition, cond_types) = self.expression(*i.condition)?;
        let (true_branch, then) = self.expression(*i.true_branch)?;
        let (false_branch, otherwise) = self.expression(*i.false_branch)?;
        if cond_types != [Type::bool()] {
            return Err(TypeError::ConditionNotBool { line, found: format_list(&cond_types) });
        }
        if then != otherwise {
            return Err(TypeError::BranchMismatch {
                line,
                then: format_list(&then),
                otherwise: format_list(&otherwise),
            });
        }
        self.concrete(&then)?;
        let node = If {
            condition: Box::new(condition),
            true_branch: Box::new(true_branch),
            false_branch: Box::new(false_branch),
            return_types: then.clone(),
        };
        Ok((Expr::If(node), then))
    }

    fn array(&mut self, a: ArrayLiteral) -> Result<(Expr, Vec<Type>), TypeError> {
        let line = self.line;
        if a.elements.is_empty() {
            return Err(TypeError::EmptyArrayLiteral { line });
        }
        let mut elements = Vec::with_capacity(a.elements.len());
        let mut element_type: Option<Type> = None;
        for (index, e) in a.elements.into_iter().enumerate() {
            let (e, types) = self.expression(e)?;
            let [ty] = types.as_slice() else {
                return Err(TypeError::MultiValueExpression {
                    line,
                    context: "array element",
                    found: format_list(&types),
                });
            };
            self.concrete(&types)?;
            match &element_type {
                None => element_type = Some(ty.clone()),
                Some(expected) if expected != ty => {
                    return Err(TypeError::ArrayElementMismatch {
                        line,
                        index,
                        expected: expected.clone(),
                        found: ty.clone(),
                    })
                }
                Some(_) => {}
            }
            elements.push(e);
        }
        let types: Vec<Type> = element_type.iter().cloned().map(Type::array).collect();
        Ok((Expr::Array(ArrayLiteral { element_type, elements }), types))
    }

    fn application(&mut self, a: Apply) -> Result<(Expr, Vec<Type>), TypeError> {
        let line = self.line;
        let mut arguments = Vec::with_capacity(a.arguments.len());
        let mut actual = Vec::with_capacity(a.arguments.len());
        for arg in a.arguments {
            let (arg, types) = self.expression(arg)?;
            let [ty] = types.as_slice() else {
                return Err(TypeError::MultiValueExpression {
                    line,
                    context: "function argument",
                    found: format_list(&types),
                });
            };
            self.concrete(&types)?;
            actual.push(ty.clone());
            arguments.push(arg);
        }
        let (function, callee_types) = self.expression(*a.function)?;
        let signature = match callee_types.as_slice() {
            [Type::Function(ft)] => ft.clone(),
            _ => return Err(TypeError::NotAFunction { line, found: format_list(&callee_types) }),
        };
        if signature.arguments.len() != actual.len() {
            return Err(TypeError::ArgumentCount {
                line,
                expected: signature.arguments.len(),
                found: actual.len(),
            });
        }
        let mut bindings = Bindings::default();
        for (position, (expected, found)) in signature.arguments.iter().zip(&actual).enumerate() {
            if !bind_argument(expected, found, &mut bindings) {
                return Err(TypeError::ArgumentType {
                    line,
                    position: position + 1,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        let return_types = signature
            .returns
            .iter()
            .map(|t| substitute(t, &bindings))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|name| TypeError::UnresolvedTypeHole { line, name })?;
        let node = Apply { function: Box::new(function), arguments, return_types: return_types.clone() };
        Ok((Expr::Apply(node), return_types))
    }

    /// `bound` is set when the literal is the whole right side of a
    /// single-variable assignment; any other literal takes an anonymous slot.
    fn function_definition(
        &mut self,
        def: FunctionDefinition,
        bound: bool,
    ) -> Result<(Expr, Vec<Type>), TypeError> {
        let line = self.line;
        let signature = self.declared_signature(&def)?;
        let FunctionDefinition { arguments, return_types, return_types_omitted, body, .. } = def;

        self.symbols.push_function(
            arguments
                .iter()
                .zip(&signature.arguments)
                .map(|(a, ty)| (a.identifier.as_str(), ty.clone())),
        );
        let result = self.block(body, true);
        self.symbols.pop_function();
        let (body, candidates) = result?;

        let return_types = if return_types_omitted {
            match <[Vec<Type>; 1]>::try_from(candidates) {
                Ok([only]) => only,
                Err(all) => return Err(TypeError::MissingReturnTypes { line, found: all.len() }),
            }
        } else {
            return_types
        };
        if !bound {
            self.symbols.define_anonymous_function();
        }
        let function_type = FunctionType::new(signature.arguments, return_types.clone());
        let ty = Type::Function(function_type.clone());
        let node = FunctionDefinition {
            arguments,
            return_types,
            return_types_omitted,
            body,
            function_type: Some(function_type),
        };
        Ok((Expr::FunctionDefinition(node), vec![ty]))
    }
}

fn first_hole(ty: &Type) -> Option<String> {
    match ty {
        Type::AnyHole(name) => Some(name.clone()),
        Type::Standard(_) => None,
        Type::Array(el) => first_hole(el),
        Type::Function(ft) => ft.arguments.iter().chain(&ft.returns).find_map(first_hole),
    }
}
