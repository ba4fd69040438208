use super::{builtins, EvalError, Interpreter};
use crate::ast::Function;
use crate::expand;
use crate::lexer::Token;

impl Interpreter {
    /// Expand a command's argument tokens and run it, publishing `$?`.
    pub(crate) fn evaluate_command(&mut self, argv: &[Token]) -> Result<i32, EvalError> {
        let args = expand::expand_argv(argv, self)?;
        let status = self.exec_command(&args)?;
        self.set_last_status(status);
        Ok(status)
    }

    /// Run an already-expanded argv.
    ///
    /// User functions shadow builtins, which shadow programs on `PATH`.
    /// An empty argv (every word expanded to nothing) succeeds.
    pub fn exec_command(&mut self, args: &[String]) -> Result<i32, EvalError> {
        let Some(name) = args.first() else {
            return Ok(0);
        };
        self.trace(args);

        if let Some(function) = self.state.select_function(name) {
            return self.call_function(&function, args);
        }
        if let Some(builtin) = builtins::lookup(name) {
            return Ok(builtin(self, args));
        }
        self.run_external(args)
    }

    pub(crate) fn trace(&self, args: &[String]) {
        if self.config.trace {
            eprintln!("+ {}", args.join(" "));
        }
    }

    /// Whether `name` resolves to something other than an external program.
    pub(crate) fn is_internal(&self, name: &str) -> bool {
        self.state.select_function(name).is_some() || builtins::lookup(name).is_some()
    }

    /// Calls a user function: `$1..$n` and `$@` are bound in a fresh scope.
    /// A call always yields status 0.
    fn call_function(&mut self, function: &Function, args: &[String]) -> Result<i32, EvalError> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(EvalError::RecursionLimit {
                name: function.name.lexeme.clone(),
                depth: self.config.max_call_depth,
            });
        }

        self.call_depth += 1;
        let result = self.scoped(|interp| {
            for (index, arg) in args.iter().enumerate().skip(1) {
                interp.state.create_variable(index.to_string(), arg.as_str());
            }
            interp
                .state
                .create_variable("@", args.get(1..).unwrap_or_default().join(" "));
            interp.evaluate_statements(&function.body)
        });
        self.call_depth -= 1;

        result.map(|_| 0)
    }
}
