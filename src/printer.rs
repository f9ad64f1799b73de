//! S-expression renderer for the `parse` CLI mode.

use crate::ast::{Expr, Stmt};
use crate::value::Value;

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expr(expr) => print_expr(expr),
        Stmt::Print(expr) => format!("(print {})", print_expr(expr)),
        Stmt::VarDecl(name, init) => match init {
            Some(expr) => format!("(var {} {})", name, print_expr(expr)),
            None => format!("(var {} nil)", name),
        },
        Stmt::Block(stmts) => {
            if stmts.is_empty() {
                "(block)".to_string()
            } else {
                let body: Vec<String> = stmts.iter().map(print_stmt).collect();
                format!("(block {})", body.join(" "))
            }
        }
        Stmt::If(cond, then_branch, else_branch) => match else_branch {
            Some(els) => format!(
                "(if {} {} {})",
                print_expr(cond),
                print_stmt(then_branch),
                print_stmt(els)
            ),
            None => format!("(if {} {})", print_expr(cond), print_stmt(then_branch)),
        },
        Stmt::While(cond, body) => {
            format!("(while {} {})", print_expr(cond), print_stmt(body))
        }
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => literal(value),
        Expr::Grouping(inner) => format!("(group {})", print_expr(inner)),
        Expr::Unary(op, operand, _) => format!("({} {})", op, print_expr(operand)),
        Expr::Binary(op, lhs, rhs, _) => {
            format!("({} {} {})", op, print_expr(lhs), print_expr(rhs))
        }
        Expr::Logical(op, lhs, rhs) => {
            format!("({} {} {})", op, print_expr(lhs), print_expr(rhs))
        }
        Expr::Variable(name, _) => name.to_string(),
        Expr::Assign(name, value, _) => format!("(assign {} {})", name, print_expr(value)),
    }
}

/// Number literals render in the normalized literal form (always with a
/// fractional part), unlike runtime value display.
fn literal(value: &Value) -> String {
    match value {
        Value::Number(n) if *n == n.trunc() && n.is_finite() => format!("{:.1}", n),
        other => other.to_string(),
    }
}
