use std::{
    io::{BufRead, Write},
    rc::Rc,
};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtin,
            core::{EvalResult, Flow, Interpreter, OutputSink},
            env::Environment,
        },
        value::Value,
    },
};

/// Type of a builtin function handler.
///
/// A builtin receives the evaluated argument values and the call's source
/// line, and produces a value or a runtime error.
type BuiltinFn = fn(&[Value], usize) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
#[derive(Clone, Copy)]
enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// Any of the listed counts.
    OneOf(&'static [usize]),
}

impl Arity {
    /// Tests whether the given argument count is permitted.
    fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::OneOf(counts) => counts.contains(&n),
        }
    }

    /// The accepted counts as a phrase for error messages.
    fn describe(self) -> String {
        match self {
            Self::Exact(m) => format!("exactly {m}"),
            Self::OneOf(counts) => {
                counts.iter()
                      .map(ToString::to_string)
                      .collect::<Vec<_>>()
                      .join(" or ")
            },
        }
    }
}

/// Defines the builtin function table.
///
/// Each entry names the builtin, its arity constraint and its handler. The
/// macro produces the static lookup table and the public list of builtin
/// names.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of every builtin dispatched through the table, plus the
        /// I/O builtins `print` and `input` handled ahead of it.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            "print",
            "input",
            $($name,)*
        ];
    };
}

builtin_functions! {
    "len"         => { arity: Arity::Exact(1), func: builtin::len },
    "abs"         => { arity: Arity::Exact(1), func: builtin::abs },
    "sqrt"        => { arity: Arity::Exact(1), func: builtin::sqrt },
    "sin"         => { arity: Arity::Exact(1), func: builtin::sin },
    "cos"         => { arity: Arity::Exact(1), func: builtin::cos },
    "tan"         => { arity: Arity::Exact(1), func: builtin::tan },
    "pow"         => { arity: Arity::Exact(2), func: builtin::pow },
    "floor"       => { arity: Arity::Exact(1), func: |args, line| builtin::unary_round("floor", args, line) },
    "ceil"        => { arity: Arity::Exact(1), func: |args, line| builtin::unary_round("ceil", args, line) },
    "round"       => { arity: Arity::Exact(1), func: |args, line| builtin::unary_round("round", args, line) },
    "zeros"       => { arity: Arity::Exact(2), func: builtin::zeros },
    "ones"        => { arity: Arity::Exact(2), func: builtin::ones },
    "eye"         => { arity: Arity::Exact(1), func: builtin::eye },
    "transpose"   => { arity: Arity::Exact(1), func: builtin::transpose },
    "determinant" => { arity: Arity::Exact(1), func: builtin::determinant },
    "inverse"     => { arity: Arity::Exact(1), func: builtin::inverse },
    "range"       => { arity: Arity::OneOf(&[1, 2, 3]), func: builtin::range },
}

impl Interpreter<'_> {
    /// Dispatches a call by name: `print`/`input` first, then the builtin
    /// table, then user-defined functions.
    ///
    /// Arguments arrive fully evaluated, left to right.
    pub(crate) fn call_function(&mut self,
                                name: &str,
                                args: Vec<Value>,
                                line: usize)
                                -> EvalResult<Value> {
        match name {
            "print" => return self.builtin_print(&args, line),
            "input" => return self.builtin_input(&args, line),
            _ => {},
        }

        if let Some(def) = BUILTIN_TABLE.iter().find(|def| def.name == name) {
            if !def.arity.check(args.len()) {
                return Err(RuntimeError::ArityMismatch { name:     name.to_string(),
                                                         expected: def.arity.describe(),
                                                         found:    args.len(),
                                                         line });
            }
            return (def.func)(&args, line);
        }

        self.call_user_function(name, args, line)
    }

    /// Executes a user-defined function.
    ///
    /// Parameters bind by position in a fresh frame over the captured
    /// closure environment. A propagating `return` supplies the call's
    /// value; a body that falls off the end yields `none`. The caller's
    /// environment is restored on every path, including errors.
    fn call_user_function(&mut self,
                          name: &str,
                          args: Vec<Value>,
                          line: usize)
                          -> EvalResult<Value> {
        let Some(function) = self.function(name) else {
            return Err(RuntimeError::UndefinedFunction { name: name.to_string(),
                                                         line });
        };

        if args.len() != function.params.len() {
            return Err(RuntimeError::ArityMismatch { name:     name.to_string(),
                                                     expected: format!("exactly {}",
                                                                       function.params.len()),
                                                     found:    args.len(),
                                                     line });
        }

        let frame = Environment::with_parent(Rc::clone(&function.closure));
        for (param, value) in function.params.iter().zip(args) {
            frame.borrow_mut().define(param, value);
        }

        let previous = self.enter_frame(frame);
        let result = self.execute_statement(function.body);
        self.restore_frame(previous);

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::None),
        }
    }

    /// `print(...)`: joins the arguments with single spaces and writes a
    /// newline-terminated line to the output sink. Returns `none`.
    fn builtin_print(&mut self, args: &[Value], line: usize) -> EvalResult<Value> {
        let text = args.iter()
                       .map(ToString::to_string)
                       .collect::<Vec<_>>()
                       .join(" ");

        self.write_output(&text, line)?;
        Ok(Value::None)
    }

    /// `input(prompt?)`: emits the prompt without a newline, reads one line
    /// from standard input and returns it as a string.
    fn builtin_input(&mut self, args: &[Value], line: usize) -> EvalResult<Value> {
        if args.len() > 1 {
            return Err(RuntimeError::ArityMismatch { name:     "input".to_string(),
                                                     expected: "0 or 1".to_string(),
                                                     found:    args.len(),
                                                     line });
        }

        if let Some(prompt) = args.first() {
            self.write_prompt(&prompt.to_string(), line)?;
        }

        let mut buffer = String::new();
        std::io::stdin().lock()
                        .read_line(&mut buffer)
                        .map_err(|e| RuntimeError::Io { details: e.to_string(),
                                                        line })?;

        while buffer.ends_with('\n') || buffer.ends_with('\r') {
            buffer.pop();
        }
        Ok(Value::Str(buffer))
    }

    /// Writes one newline-terminated line to the output sink.
    fn write_output(&mut self, text: &str, line: usize) -> EvalResult<()> {
        match &self.output {
            OutputSink::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{text}").map_err(|e| RuntimeError::Io { details: e.to_string(),
                                                                       line })
            },
            OutputSink::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.extend_from_slice(text.as_bytes());
                buffer.push(b'\n');
                Ok(())
            },
        }
    }

    /// Writes prompt text without a trailing newline, flushing immediately.
    fn write_prompt(&mut self, text: &str, line: usize) -> EvalResult<()> {
        match &self.output {
            OutputSink::Stdout => {
                let mut out = std::io::stdout().lock();
                write!(out, "{text}").and_then(|()| out.flush())
                                     .map_err(|e| RuntimeError::Io { details: e.to_string(),
                                                                     line })
            },
            OutputSink::Buffer(buffer) => {
                buffer.borrow_mut().extend_from_slice(text.as_bytes());
                Ok(())
            },
        }
    }
}
