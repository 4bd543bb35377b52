// ============================
// crates/classroom-lib/src/runner.rs
// ============================
//! Code execution behind a capability boundary.
//!
//! The original surface evaluated the buffer directly in the host runtime;
//! here evaluation sits behind [`Evaluator`] so embedders choose their own
//! engine and isolation. The crate only owns log capture and output
//! formatting, plus a deliberately small built-in evaluator for demos and
//! tests.
use thiserror::Error;

/// Raised by an evaluator; becomes `Error: <message>` output text.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes buffer text, pushing each emitted log line into `log`.
pub trait Evaluator: Send + Sync {
    fn eval(&self, code: &str, log: &mut dyn FnMut(String)) -> Result<(), EvalError>;
}

/// Shown when a run finishes cleanly without logging anything.
pub const EMPTY_OUTPUT_PLACEHOLDER: &str = "Code executed successfully (no output)";

/// Run `code` and format its output: captured log lines joined by newlines,
/// the fixed placeholder when there are none, or `Error: <message>` when
/// evaluation raises. Logs captured before an error are discarded.
pub fn run_capture(evaluator: &dyn Evaluator, code: &str) -> String {
    let mut logs = Vec::new();
    match evaluator.eval(code, &mut |line| logs.push(line)) {
        Ok(()) if logs.is_empty() => EMPTY_OUTPUT_PLACEHOLDER.to_string(),
        Ok(()) => logs.join("\n"),
        Err(err) => format!("Error: {}", err.message),
    }
}

/// Minimal line-oriented evaluator for demos and tests.
///
/// Understands `console.log(...)` with string-literal and bare-token
/// arguments (joined by single spaces) and `throw new Error("...")`; every
/// other line is ignored. Real embedders plug in a proper engine via
/// [`Evaluator`].
#[derive(Debug, Default)]
pub struct MiniScript;

impl Evaluator for MiniScript {
    fn eval(&self, code: &str, log: &mut dyn FnMut(String)) -> Result<(), EvalError> {
        for raw in code.lines() {
            let line = raw.trim().trim_end_matches(';');
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(args) = call_args(line, "throw new Error(") {
                let message = parse_args(args).into_iter().next().unwrap_or_default();
                return Err(EvalError::new(message));
            }
            if let Some(args) = call_args(line, "console.log(") {
                log(parse_args(args).join(" "));
            }
        }
        Ok(())
    }
}

/// Extract the argument text of `prefix(...)`, if the line is such a call.
fn call_args<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)?.strip_suffix(')')
}

/// Split a comma-separated argument list, unquoting string literals and
/// passing other tokens through verbatim.
fn parse_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in args.chars() {
        if in_string {
            if escaped {
                current.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '"' => in_string = true,
                ',' => {
                    out.push(current.trim().to_string());
                    current.clear();
                },
                _ => current.push(ch),
            }
        }
    }
    if !current.trim().is_empty() || !out.is_empty() || !args.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_log_line() {
        let output = run_capture(&MiniScript, "console.log(\"hi\")");
        assert_eq!(output, "hi");
    }

    #[test]
    fn test_thrown_error_becomes_output() {
        let output = run_capture(&MiniScript, "throw new Error(\"boom\")");
        assert_eq!(output, "Error: boom");
    }

    #[test]
    fn test_no_output_placeholder() {
        let output = run_capture(&MiniScript, "// just a comment\n");
        assert_eq!(output, EMPTY_OUTPUT_PLACEHOLDER);
    }

    #[test]
    fn test_logs_join_with_newlines() {
        let code = "console.log(\"one\");\nconsole.log(\"two\");";
        assert_eq!(run_capture(&MiniScript, code), "one\ntwo");
    }

    #[test]
    fn test_logs_before_error_are_discarded() {
        let code = "console.log(\"kept?\");\nthrow new Error(\"nope\");";
        assert_eq!(run_capture(&MiniScript, code), "Error: nope");
    }

    #[test]
    fn test_multiple_args_join_with_spaces() {
        let code = "console.log(\"sum:\", 42)";
        assert_eq!(run_capture(&MiniScript, code), "sum: 42");
    }

    #[test]
    fn test_escaped_quote_in_literal() {
        let code = r#"console.log("she said \"hi\"")"#;
        assert_eq!(run_capture(&MiniScript, code), r#"she said "hi""#);
    }

    struct FailingEngine;
    impl Evaluator for FailingEngine {
        fn eval(&self, _code: &str, log: &mut dyn FnMut(String)) -> Result<(), EvalError> {
            log("partial".to_string());
            Err(EvalError::new("engine exploded"))
        }
    }

    #[test]
    fn test_custom_evaluator_error_formatting() {
        assert_eq!(
            run_capture(&FailingEngine, "whatever"),
            "Error: engine exploded"
        );
    }
}
