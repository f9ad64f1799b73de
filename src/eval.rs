//! Tree-walking evaluator.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::diag::Line;
use crate::env::Env;
use crate::value::Value;

/// Walks the AST in depth-first order against an environment chain,
/// writing `print` output to the given sink.
#[derive(Debug)]
pub struct Evaluator<'a, W: Write> {
    output: &'a mut W,
}

/// Errors raised during evaluation.
///
/// Every language-level variant carries the line of the responsible token.
/// `Io` is environmental (the output sink failed) and is deliberately not
/// formatted like a language runtime error.
#[derive(Debug)]
pub enum RuntimeError {
    OperandMustBeNumber { line: Line },
    OperandsMustBeNumbers { line: Line },
    OperandsMustBeNumbersOrStrings { line: Line },
    DivisionByZero { line: Line },
    UndefinedVariable { name: String, line: Line },
    Io(io::Error),
}

impl RuntimeError {
    pub fn message(&self) -> String {
        match self {
            RuntimeError::OperandMustBeNumber { .. } => "Operand must be a number.".to_string(),
            RuntimeError::OperandsMustBeNumbers { .. } => "Operands must be numbers.".to_string(),
            RuntimeError::OperandsMustBeNumbersOrStrings { .. } => {
                "Operands must be two numbers or two strings.".to_string()
            }
            RuntimeError::DivisionByZero { .. } => "Division by zero.".to_string(),
            RuntimeError::UndefinedVariable { name, .. } => {
                format!("Undefined variable '{}'.", name)
            }
            RuntimeError::Io(e) => format!("I/O error: {}", e),
        }
    }

    pub fn line(&self) -> Option<Line> {
        match self {
            RuntimeError::OperandMustBeNumber { line }
            | RuntimeError::OperandsMustBeNumbers { line }
            | RuntimeError::OperandsMustBeNumbersOrStrings { line }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::UndefinedVariable { line, .. } => Some(*line),
            RuntimeError::Io(_) => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(f, "{}\n[line {}]", self.message(), line),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        Evaluator { output }
    }

    /// Executes a whole program against the given environment.
    pub fn eval_program(&mut self, stmts: &[Stmt], env: Rc<Env>) -> Result<(), RuntimeError> {
        self.eval_stmts(stmts, env)
    }

    /// Evaluates a single expression, for the `evaluate` pipeline mode.
    pub fn eval_expression(&mut self, expr: &Expr, env: Rc<Env>) -> Result<Value, RuntimeError> {
        self.eval_expr(expr, env)
    }

    fn eval_stmts(&mut self, stmts: &[Stmt], env: Rc<Env>) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.eval_stmt(stmt, env.clone())?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: Rc<Env>) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(e) => {
                self.eval_expr(e, env)?;
            }
            Stmt::Print(e) => {
                let value = self.eval_expr(e, env)?;
                writeln!(self.output, "{}", value)?;
            }
            Stmt::VarDecl(name, init) => {
                let value = match init {
                    Some(e) => self.eval_expr(e, env.clone())?,
                    None => Value::Nil,
                };
                env.define(name, value);
            }
            // The child frame is dropped on every exit path, error included.
            Stmt::Block(stmts) => {
                self.eval_stmts(stmts, Env::with_enclosing(env))?;
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval_expr(cond, env.clone())?.is_truthy() {
                    self.eval_stmt(then_branch, env)?;
                } else if let Some(els) = else_branch {
                    self.eval_stmt(els, env)?;
                }
            }
            Stmt::While(cond, body) => {
                while self.eval_expr(cond, env.clone())?.is_truthy() {
                    self.eval_stmt(body, env.clone())?;
                }
            }
        };
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr, env: Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.eval_expr(inner, env),
            Expr::Variable(name, line) => {
                env.get(name).ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.name().to_owned(),
                    line: *line,
                })
            }
            Expr::Assign(name, rhs, line) => {
                let value = self.eval_expr(rhs, env.clone())?;
                if env.assign(name, value.clone()) {
                    Ok(value)
                } else {
                    Err(RuntimeError::UndefinedVariable {
                        name: name.name().to_owned(),
                        line: *line,
                    })
                }
            }
            Expr::Unary(op, operand, line) => {
                let value = self.eval_expr(operand, env)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Negate => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::OperandMustBeNumber { line: *line }),
                    },
                }
            }
            // The chosen operand's value is returned, not a coerced boolean.
            Expr::Logical(op, lhs, rhs) => {
                let left = self.eval_expr(lhs, env.clone())?;
                match op {
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.eval_expr(rhs, env),
                }
            }
            Expr::Binary(op, lhs, rhs, line) => {
                let left = self.eval_expr(lhs, env.clone())?;
                let right = self.eval_expr(rhs, env)?;
                apply_binary(*op, left, right, *line)
            }
        }
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value, line: Line) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(Rc::from(format!("{}{}", l, r)))),
            _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings { line }),
        },
        BinaryOp::Subtract => {
            let (l, r) = numeric_operands(left, right, line)?;
            Ok(Value::Number(l - r))
        }
        BinaryOp::Multiply => {
            let (l, r) = numeric_operands(left, right, line)?;
            Ok(Value::Number(l * r))
        }
        BinaryOp::Divide => {
            let (l, r) = numeric_operands(left, right, line)?;
            if r == 0.0 {
                Err(RuntimeError::DivisionByZero { line })
            } else {
                Ok(Value::Number(l / r))
            }
        }
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOp::Greater => {
            let (l, r) = numeric_operands(left, right, line)?;
            Ok(Value::Bool(l > r))
        }
        BinaryOp::GreaterEqual => {
            let (l, r) = numeric_operands(left, right, line)?;
            Ok(Value::Bool(l >= r))
        }
        BinaryOp::Less => {
            let (l, r) = numeric_operands(left, right, line)?;
            Ok(Value::Bool(l < r))
        }
        BinaryOp::LessEqual => {
            let (l, r) = numeric_operands(left, right, line)?;
            Ok(Value::Bool(l <= r))
        }
    }
}

fn numeric_operands(left: Value, right: Value, line: Line) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        _ => Err(RuntimeError::OperandsMustBeNumbers { line }),
    }
}
