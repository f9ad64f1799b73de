//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ctx::Context;
use crate::env::Env;
use crate::eval::Evaluator;
use crate::parser::Parser;
use crate::printer;
use crate::scanner::Scanner;
use crate::token::Token;

pub use crate::diag::Diagnostic;
pub use crate::eval::RuntimeError;

/// Tree-walk interpreter session.
///
/// One session owns the global environment, so consecutive calls share
/// definitions.
///
/// # Example
///
/// ```
/// # use emolox::interpreter::{Interpreter, LoxError};
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// interp.run("var greeting = \"hello\";")?;
/// interp.run("print greeting + \", world\"; print 1 + 2 * 3;")?;
///
/// assert_eq!(output, b"hello, world\n7\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    globals: Rc<Env>,
    output: &'t mut W,
}

/// Errors the interpreter can raise.
#[derive(Debug)]
pub enum LoxError {
    /// Errors collected during lexical or syntactic analysis.
    Parse(Vec<Diagnostic>),

    /// Error raised during evaluation.
    Runtime(RuntimeError),

    /// The output sink failed.
    Io(io::Error),
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Parse(diags) => {
                let mut first = true;
                for diag in diags {
                    if !first {
                        writeln!(f)?;
                    }
                    write!(f, "{}", diag)?;
                    first = false;
                }
                Ok(())
            }
            LoxError::Runtime(e) => write!(f, "{}", e),
            LoxError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for LoxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoxError::Parse(_) => None,
            LoxError::Runtime(e) => Some(e),
            LoxError::Io(e) => Some(e),
        }
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> LoxError {
        // A failed output sink is environmental, not a language error.
        match e {
            RuntimeError::Io(e) => LoxError::Io(e),
            e => LoxError::Runtime(e),
        }
    }
}

impl From<io::Error> for LoxError {
    fn from(e: io::Error) -> LoxError {
        LoxError::Io(e)
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        Interpreter {
            ctx: Context::new(),
            globals: Env::new(),
            output,
        }
    }

    /// Prints every scanned token in `<KIND> <lexeme> <literal|null>` form,
    /// ending with `EOF  null`, then reports any lexical errors.
    pub fn tokenize(&mut self, source: &str) -> Result<(), LoxError> {
        let (tokens, diags) = Scanner::new(source, self.ctx.clone()).scan_tokens();
        for token in &tokens {
            writeln!(self.output, "{}", token)?;
        }
        if diags.is_empty() {
            Ok(())
        } else {
            Err(LoxError::Parse(diags))
        }
    }

    /// Prints each parsed statement's s-expression form. Nothing is printed
    /// when any scan or parse error occurred.
    pub fn parse(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.scan(source)?;
        let (stmts, diags) = Parser::new(tokens, self.ctx.clone()).parse_program();
        if !diags.is_empty() {
            return Err(LoxError::Parse(diags));
        }
        for stmt in &stmts {
            writeln!(self.output, "{}", printer::print_stmt(stmt))?;
        }
        Ok(())
    }

    /// Parses a single expression, evaluates it against the session
    /// globals, and prints the displayed result.
    pub fn evaluate(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.scan(source)?;
        let expr = Parser::new(tokens, self.ctx.clone())
            .parse_expression()
            .map_err(LoxError::Parse)?;
        let mut evaluator = Evaluator::new(&mut *self.output);
        let value = evaluator.eval_expression(&expr, self.globals.clone())?;
        writeln!(self.output, "{}", value)?;
        Ok(())
    }

    /// Executes a whole program against the session globals.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.scan(source)?;
        let (stmts, diags) = Parser::new(tokens, self.ctx.clone()).parse_program();
        if !diags.is_empty() {
            return Err(LoxError::Parse(diags));
        }
        let mut evaluator = Evaluator::new(&mut *self.output);
        evaluator.eval_program(&stmts, self.globals.clone())?;
        Ok(())
    }

    fn scan(&mut self, source: &str) -> Result<Vec<Token>, LoxError> {
        let (tokens, diags) = Scanner::new(source, self.ctx.clone()).scan_tokens();
        if diags.is_empty() {
            Ok(tokens)
        } else {
            Err(LoxError::Parse(diags))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(input: &str) -> Result<String, LoxError> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        let result = interp.run(input);
        let output = String::from_utf8(raw_output).expect("cannot convert output to string");
        result.map(|()| output)
    }

    /// Like `interpret` but also returns the output produced before the
    /// failure.
    fn interpret_expecting_failure(input: &str) -> (String, LoxError) {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        let err = match interp.run(input) {
            Err(e) => e,
            Ok(()) => panic!("program unexpectedly succeeded: {}", input),
        };
        let output = String::from_utf8(raw_output).expect("cannot convert output to string");
        (output, err)
    }

    #[test]
    fn arithmetic_precedence() -> Result<(), LoxError> {
        assert_eq!(interpret("print 1 + 2 * 3;")?, "7\n");
        Ok(())
    }

    #[test]
    fn output_before_a_runtime_error_is_kept() {
        let (output, err) = interpret_expecting_failure("print \"hi\" + \"!\";\nprint \"hi\" + 1;");
        assert_eq!(output, "hi!\n");
        match err {
            LoxError::Runtime(e) => {
                assert_eq!(
                    e.to_string(),
                    "Operands must be two numbers or two strings.\n[line 2]"
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn lexical_scoping() -> Result<(), LoxError> {
        assert_eq!(
            interpret("var a = \"outer\";\n{ var a = \"inner\"; print a; }\nprint a;")?,
            "inner\nouter\n"
        );
        Ok(())
    }

    #[test]
    fn short_circuit_returns_operand_value() -> Result<(), LoxError> {
        assert_eq!(interpret("print nil or \"default\";")?, "default\n");
        assert_eq!(interpret("print 0 and \"unreached\";")?, "unreached\n");
        Ok(())
    }

    #[test]
    fn desugared_for_with_increment() -> Result<(), LoxError> {
        let prg = r#"
            var sum = 0;
            for (var i = 1; i <= 3; i = i + 1) { sum = sum + i; }
            print sum;
        "#;
        assert_eq!(interpret(prg)?, "6\n");
        Ok(())
    }

    #[test]
    fn undefined_variable_at_use_site() {
        let (output, err) = interpret_expecting_failure("var a = 1;\nprint b;");
        assert_eq!(output, "");
        match err {
            LoxError::Runtime(e) => {
                assert_eq!(e.to_string(), "Undefined variable 'b'.\n[line 2]");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn emoji_aliases_are_equivalent_to_ascii() -> Result<(), LoxError> {
        assert_eq!(
            interpret("print true;")?,
            interpret("\u{1f4e2} \u{2705};")?
        );
        Ok(())
    }

    #[test]
    fn emoji_program_runs_like_ascii() -> Result<(), LoxError> {
        let prg = "\u{1f381} n \u{1f449} 0;\n\
                   \u{1f504} (n \u{25c0}\u{fe0f} 3) { n \u{1f449} n + 1; }\n\
                   \u{1f500} (n \u{2696}\u{fe0f} 3) \u{1f4e2} \u{2705}; \u{21a9}\u{fe0f} \u{1f4e2} \u{26d4}\u{fe0f};";
        assert_eq!(interpret(prg)?, "true\n");
        Ok(())
    }

    #[test]
    fn session_state_persists_across_runs() -> Result<(), LoxError> {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        interp.run("var counter = 1;")?;
        interp.run("counter = counter + 1; print counter;")?;
        assert_eq!(output, b"2\n");
        Ok(())
    }

    #[test]
    fn global_frame_is_back_in_charge_after_blocks() -> Result<(), LoxError> {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        interp.run("var a = 1; { var a = 2; { var a = 3; } }")?;
        interp.run("print a;")?;
        assert_eq!(output, b"1\n");
        Ok(())
    }

    #[test]
    fn parse_errors_abort_run_with_diagnostics() {
        let (output, err) = interpret_expecting_failure("print 1");
        assert_eq!(output, "");
        match err {
            LoxError::Parse(diags) => {
                assert_eq!(
                    diags[0].to_string(),
                    "[line 1] Error at end: Expect ';' after value."
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn tokenize_prints_token_lines() -> Result<(), LoxError> {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        interp.tokenize("var x = 10.50;")?;
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "VAR var null\n\
             IDENTIFIER x null\n\
             EQUAL = null\n\
             NUMBER 10.50 10.5\n\
             SEMICOLON ; null\n\
             EOF  null\n"
        );
        Ok(())
    }

    #[test]
    fn tokenize_still_prints_tokens_when_lexing_fails() {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        match interp.tokenize("1 @ 2") {
            Err(LoxError::Parse(diags)) => {
                assert_eq!(
                    diags[0].to_string(),
                    "[line 1] Error: Unexpected character: @"
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "NUMBER 1 1.0\nNUMBER 2 2.0\nEOF  null\n"
        );
    }

    #[test]
    fn parse_prints_s_expressions() -> Result<(), LoxError> {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        interp.parse("print 1 + 2 * 3;\nvar a;\nif (a) { a = 1; }")?;
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "(print (+ 1.0 (* 2.0 3.0)))\n\
             (var a nil)\n\
             (if a (block (assign a 1.0)))\n"
        );
        Ok(())
    }

    #[test]
    fn parse_prints_nothing_on_error() {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        match interp.parse("print 1; print;") {
            Err(LoxError::Parse(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn evaluate_prints_displayed_value() -> Result<(), LoxError> {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        interp.evaluate("(1 + 2) * 3 - 4 / 2")?;
        assert_eq!(output, b"7\n");
        Ok(())
    }

    #[test]
    fn evaluate_runtime_error_produces_no_output() {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        match interp.evaluate("-\"muffin\"") {
            Err(LoxError::Runtime(e)) => {
                assert_eq!(e.to_string(), "Operand must be a number.\n[line 1]");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn evaluate_parse_error_is_static() {
        let mut output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut output);
        match interp.evaluate("()") {
            Err(LoxError::Parse(diags)) => {
                assert_eq!(
                    diags[0].to_string(),
                    "[line 1] Error at ')': Expect expression."
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (_, err) = interpret_expecting_failure("print 1 / 0;");
        match err {
            LoxError::Runtime(e) => {
                assert_eq!(e.to_string(), "Division by zero.\n[line 1]");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unterminated_string_is_a_lex_error() {
        let (_, err) = interpret_expecting_failure("print \"oops;");
        match err {
            LoxError::Parse(diags) => {
                assert_eq!(
                    diags[0].to_string(),
                    "[line 1] Error: Unterminated string."
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
