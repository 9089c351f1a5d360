use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{INVALID_INDEX, NodeData},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary,
            env::{EnvRef, Environment},
        },
        parser::{Parser, core::ROOT_NODE},
        value::{Matrix, Value},
    },
};

/// Result type used throughout the evaluator.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Control-flow outcome of executing one statement.
///
/// A `return` does not unwind the Rust stack; it travels as a value through
/// every enclosing block until a function call (or the top level) absorbs
/// it.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Execution continues with the next statement.
    Normal,
    /// A `return` is propagating; the payload is the returned value.
    Return(Value),
}

/// A user-defined function captured at its definition site.
#[derive(Debug, Clone)]
pub struct Function {
    /// The function name, for error messages.
    pub name:    String,
    /// Parameter names in declaration order.
    pub params:  Vec<String>,
    /// Arena index of the body block.
    pub body:    u32,
    /// The environment the function was defined in.
    pub closure: EnvRef,
}

/// Where program output goes.
pub(crate) enum OutputSink {
    /// The process standard output.
    Stdout,
    /// A shared in-memory buffer, for tests and embedding.
    Buffer(Rc<RefCell<Vec<u8>>>),
}

/// Tree-walking evaluator over a parsed arena.
///
/// The interpreter borrows the parser's arena and string table read-only and
/// owns all runtime state: the environment chain, the user function registry
/// and the output sink.
///
/// ## Example
/// ```
/// use dakota::interpreter::{evaluator::Interpreter, lexer::Lexer, parser::Parser};
///
/// let tokens = Lexer::new("x = 2 + 3\n").tokenize().unwrap();
/// let mut parser = Parser::new(tokens);
/// parser.parse();
///
/// let mut interpreter = Interpreter::new(&parser);
/// interpreter.interpret().unwrap();
///
/// assert_eq!(interpreter.global("x"),
///            Some(dakota::interpreter::value::Value::Integer(5)));
/// ```
pub struct Interpreter<'p> {
    parser:    &'p Parser,
    globals:   EnvRef,
    current:   EnvRef,
    functions: HashMap<String, Function>,

    pub(crate) output: OutputSink,
}

impl<'p> Interpreter<'p> {
    /// Creates an interpreter writing program output to standard output.
    #[must_use]
    pub fn new(parser: &'p Parser) -> Self {
        let globals = Environment::new();
        Self { parser,
               current: Rc::clone(&globals),
               globals,
               functions: HashMap::new(),
               output: OutputSink::Stdout }
    }

    /// Creates an interpreter that appends program output to `buffer`.
    #[must_use]
    pub fn with_captured_output(parser: &'p Parser, buffer: Rc<RefCell<Vec<u8>>>) -> Self {
        let globals = Environment::new();
        Self { parser,
               current: Rc::clone(&globals),
               globals,
               functions: HashMap::new(),
               output: OutputSink::Buffer(buffer) }
    }

    /// Executes the whole program from the root node.
    ///
    /// A `return` reaching the top level is absorbed silently. A runtime
    /// error stops execution; later statements do not run.
    ///
    /// # Errors
    /// Returns the first [`RuntimeError`] raised, or an error when the
    /// parser recorded diagnostics (an erroneous AST is never executed).
    pub fn interpret(&mut self) -> EvalResult<()> {
        if self.parser.has_errors() {
            let line = self.parser.diagnostics().first().map_or(0, |d| d.line);
            return Err(RuntimeError::Unsupported { details:
                                                       "Cannot interpret: parser has errors"
                                                                                            .to_string(),
                                                   line });
        }

        log::debug!("interpreting {} nodes", self.parser.node_count());

        self.execute_statement(ROOT_NODE)?;
        Ok(())
    }

    /// The global environment frame.
    #[must_use]
    pub fn globals(&self) -> EnvRef {
        Rc::clone(&self.globals)
    }

    /// Convenience lookup of a global binding, mainly for tests.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<Value> {
        Environment::get(&self.globals, name)
    }

    /// Registry accessor used by the call dispatcher.
    pub(crate) fn function(&self, name: &str) -> Option<Function> {
        self.functions.get(name).cloned()
    }

    /// Replaces the current environment, returning the previous one.
    pub(crate) fn enter_frame(&mut self, frame: EnvRef) -> EnvRef {
        std::mem::replace(&mut self.current, frame)
    }

    /// Restores a previously saved environment.
    pub(crate) fn restore_frame(&mut self, frame: EnvRef) {
        self.current = frame;
    }

    /// The source line of a node, via its recorded token.
    pub(crate) fn line_of(&self, index: u32) -> usize {
        let token_index = self.parser
                              .arena()
                              .get(index)
                              .map_or(0, |node| node.token_index as usize);
        self.parser.tokens().get(token_index).map_or(1, |t| t.line)
    }

    /// Resolves a string-table handle.
    pub(crate) fn text(&self, handle: u32) -> &'p str {
        self.parser.strings().get(handle)
    }

    /// Collects the first `count` indices of a sibling chain.
    pub(crate) fn chain(&self, start: u32, count: u32) -> Vec<u32> {
        if start == INVALID_INDEX {
            return Vec::new();
        }
        self.parser
            .arena()
            .siblings_from(start)
            .take(count as usize)
            .collect()
    }

    /// Executes one statement node.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn execute_statement(&mut self, index: u32) -> EvalResult<Flow> {
        let Some(node) = self.parser.arena().get(index) else {
            return Ok(Flow::Normal);
        };
        let line = self.line_of(index);
        let data = node.data.clone();

        match data {
            NodeData::Program { statements_start,
                                statement_count, }
            | NodeData::Block { statements_start,
                                statement_count, } => {
                for statement in self.chain(statements_start, statement_count) {
                    if let Flow::Return(value) = self.execute_statement(statement)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            },
            NodeData::ExpressionStatement { expression } => {
                if expression != INVALID_INDEX {
                    self.evaluate_node(expression)?;
                }
                Ok(Flow::Normal)
            },
            NodeData::Assignment { .. } => {
                self.evaluate_node(index)?;
                Ok(Flow::Normal)
            },
            NodeData::IfStatement { condition,
                                    then_block,
                                    else_block, } => {
                if self.evaluate_node(condition)?.is_truthy() {
                    self.execute_statement(then_block)
                } else if else_block != INVALID_INDEX {
                    self.execute_statement(else_block)
                } else {
                    Ok(Flow::Normal)
                }
            },
            NodeData::WhileStatement { condition, body } => {
                while self.evaluate_node(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute_statement(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            },
            NodeData::ForStatement { variable,
                                     iterable,
                                     body, } => self.execute_for(variable, iterable, body, line),
            NodeData::FunctionDef { name,
                                    params_start,
                                    param_count,
                                    body, } => {
                self.define_function(name, params_start, param_count, body, line)?;
                Ok(Flow::Normal)
            },
            NodeData::ReturnStatement { value } => {
                let result = if value == INVALID_INDEX {
                    Value::None
                } else {
                    self.evaluate_node(value)?
                };
                Ok(Flow::Return(result))
            },
            _ => Err(RuntimeError::Unsupported { details: format!("Cannot execute {:?} as a statement",
                                                                  node.kind()),
                                                 line }),
        }
    }

    /// Evaluates one expression node to a value.
    pub(crate) fn evaluate_node(&mut self, index: u32) -> EvalResult<Value> {
        let Some(node) = self.parser.arena().get(index) else {
            return Err(RuntimeError::Unsupported { details: "Invalid node index".to_string(),
                                                   line:    0, });
        };
        let line = self.line_of(index);
        let data = node.data.clone();

        match data {
            NodeData::IntegerLiteral { value } => Ok(Value::Integer(value)),
            NodeData::FloatLiteral { value } => Ok(Value::Float(value)),
            NodeData::StringLiteral { string, .. } => Ok(Value::Str(self.text(string).to_string())),
            NodeData::BooleanLiteral { value } => Ok(Value::Bool(value)),
            NodeData::Identifier { name } => {
                let name = self.text(name);
                Environment::get(&self.current, name).ok_or_else(|| {
                                                         RuntimeError::UndefinedVariable {
                        name: name.to_string(),
                        line,
                    }
                                                     })
            },
            NodeData::BinaryOp { op, left, right } => {
                let left = self.evaluate_node(left)?;
                let right = self.evaluate_node(right)?;
                binary::eval_binary(op, &left, &right, line)
            },
            NodeData::UnaryOp { op, operand } => {
                let operand = self.evaluate_node(operand)?;
                binary::eval_unary(op, &operand, line)
            },
            NodeData::Assignment { target, value } => {
                let value = self.evaluate_node(value)?;
                let target_node = self.parser.arena().get(target);
                let Some(NodeData::Identifier { name }) = target_node.map(|n| n.data.clone())
                else {
                    return Err(RuntimeError::Unsupported { details:
                                                               "Invalid assignment target"
                                                                                          .to_string(),
                                                           line });
                };
                let name = self.text(name).to_string();
                Environment::assign(&self.current, &name, value.clone());
                Ok(value)
            },
            NodeData::FunctionCall { name,
                                     args_start,
                                     arg_count, } => {
                let name = self.text(name).to_string();
                let mut args = Vec::with_capacity(arg_count as usize);
                for arg in self.chain(args_start, arg_count) {
                    args.push(self.evaluate_node(arg)?);
                }
                self.call_function(&name, args, line)
            },
            NodeData::MatrixLiteral { rows,
                                      cols,
                                      elements_start,
                                      is_empty,
                                      validation_error, } => {
                self.evaluate_matrix_literal(rows,
                                             cols,
                                             elements_start,
                                             is_empty,
                                             validation_error,
                                             line)
            },
            NodeData::ArrayAccess { object, index } => {
                let object = self.evaluate_node(object)?;
                let row_index = self.evaluate_node(index)?;
                self.evaluate_row_access(&object, &row_index, line)
            },
            NodeData::MemberAccess { object, member_name } => {
                let object = self.evaluate_node(object)?;
                let member = self.text(member_name).to_string();
                self.evaluate_member_access(&object, &member, line)
            },
            _ => Err(RuntimeError::Unsupported { details: format!("Cannot evaluate {:?} as an expression",
                                                                  node.kind()),
                                                 line }),
        }
    }

    /// Builds a matrix value from a literal's element chain.
    fn evaluate_matrix_literal(&mut self,
                               rows: u32,
                               cols: u32,
                               elements_start: u32,
                               is_empty: bool,
                               validation_error: crate::ast::MatrixError,
                               line: usize)
                               -> EvalResult<Value> {
        if is_empty {
            return Ok(Value::Matrix(Matrix::empty()));
        }
        if validation_error != crate::ast::MatrixError::None {
            return Err(RuntimeError::InvalidArgument { details:
                                                           "Matrix literal has inconsistent rows"
                                                                                                 .to_string(),
                                                       line });
        }

        let expected = (rows as usize) * (cols as usize);
        let mut data = Vec::with_capacity(expected);
        for element in self.chain(elements_start, rows * cols) {
            let value = self.evaluate_node(element)?;
            if !value.is_numeric() {
                return Err(RuntimeError::TypeMismatch { details:
                                                            "Matrix elements must be numeric"
                                                                                             .to_string(),
                                                        line });
            }
            data.push(value.to_float(line)?);
        }

        Matrix::from_row_major(rows as usize, cols as usize, data).map(Value::Matrix)
                                                                  .ok_or_else(|| {
                                                                      RuntimeError::InvalidArgument {
                details: "Matrix literal has inconsistent rows".to_string(),
                line,
            }
                                                                  })
    }

    /// `m[i]`: selects row `i` of a matrix as a `1×N` matrix.
    #[allow(clippy::cast_sign_loss)]
    fn evaluate_row_access(&self,
                           object: &Value,
                           row_index: &Value,
                           line: usize)
                           -> EvalResult<Value> {
        let Value::Matrix(matrix) = object else {
            return Err(RuntimeError::TypeMismatch { details: format!("Cannot index {}",
                                                                     object.type_name()),
                                                    line });
        };

        let index = match row_index {
            Value::Integer(n) => *n,
            _ => {
                return Err(RuntimeError::TypeMismatch { details:
                                                            "Matrix index must be an integer"
                                                                                             .to_string(),
                                                        line });
            },
        };

        if index < 0 || index as usize >= matrix.rows() {
            return Err(RuntimeError::IndexOutOfBounds { rows: matrix.rows(),
                                                        found: index,
                                                        line });
        }

        matrix.row(index as usize)
              .map(Value::Matrix)
              .ok_or(RuntimeError::IndexOutOfBounds { rows: matrix.rows(),
                                                      found: index,
                                                      line })
    }

    /// `m.T`, `m.d`, `m.I`: transpose, determinant and inverse of a matrix.
    fn evaluate_member_access(&self,
                              object: &Value,
                              member: &str,
                              line: usize)
                              -> EvalResult<Value> {
        if let Value::Matrix(matrix) = object {
            return match member {
                "T" => Ok(Value::Matrix(matrix.transpose())),
                "d" => Ok(Value::Float(matrix.determinant(line)?)),
                "I" => Ok(Value::Matrix(matrix.inverse(line)?)),
                _ => Err(RuntimeError::UnknownMember { name: member.to_string(),
                                                       line }),
            };
        }

        Err(RuntimeError::UnknownMember { name: member.to_string(),
                                          line })
    }

    /// Iterates the rows of a matrix, binding the loop variable in a fresh
    /// frame around the current environment.
    ///
    /// A single-column row unwraps to a scalar: `Integer` when the payload
    /// is exactly integral, `Float` otherwise. Wider rows bind as `1×N`
    /// matrices.
    fn execute_for(&mut self,
                   variable: u32,
                   iterable: u32,
                   body: u32,
                   line: usize)
                   -> EvalResult<Flow> {
        let variable_name = {
            let node = self.parser.arena().get(variable);
            let Some(NodeData::Identifier { name }) = node.map(|n| n.data.clone()) else {
                return Err(RuntimeError::Unsupported { details:
                                                           "Loop variable must be an identifier"
                                                                                                .to_string(),
                                                       line });
            };
            self.text(name).to_string()
        };

        let iterable = self.evaluate_node(iterable)?;
        let Value::Matrix(matrix) = iterable else {
            return Err(RuntimeError::NotIterable { line });
        };

        for row_index in 0..matrix.rows() {
            let element = if matrix.cols() == 1 {
                scalar_from(matrix.get(row_index, 0))
            } else {
                match matrix.row(row_index) {
                    Some(row) => Value::Matrix(row),
                    None => break,
                }
            };

            let frame = Environment::with_parent(Rc::clone(&self.current));
            frame.borrow_mut().define(&variable_name, element);

            let previous = self.enter_frame(frame);
            let flow = self.execute_statement(body);
            self.restore_frame(previous);

            if let Flow::Return(value) = flow? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Registers a user function, capturing the current environment.
    fn define_function(&mut self,
                       name: u32,
                       params_start: u32,
                       param_count: u32,
                       body: u32,
                       line: usize)
                       -> EvalResult<()> {
        let name = self.text(name).to_string();

        let mut params = Vec::with_capacity(param_count as usize);
        for param in self.chain(params_start, param_count) {
            let node = self.parser.arena().get(param);
            let Some(NodeData::Identifier { name: param_name }) = node.map(|n| n.data.clone())
            else {
                return Err(RuntimeError::Unsupported { details:
                                                           "Function parameter must be an identifier"
                                                                                                     .to_string(),
                                                       line });
            };
            params.push(self.text(param_name).to_string());
        }

        let function = Function { name:    name.clone(),
                                  params,
                                  body,
                                  closure: Rc::clone(&self.current), };
        self.functions.insert(name, function);
        Ok(())
    }
}

/// Converts an `f64` row payload to a scalar value.
///
/// Exactly integral payloads become `Integer`, so `for i in range(n)` binds
/// integers; anything else stays `Float`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn scalar_from(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Integer(value as i64)
    } else {
        Value::Float(value)
    }
}
