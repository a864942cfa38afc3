//! Configuration options for the linevm engine.

/// Configuration options for program loading.
///
/// By default loading is lenient: lines with syntax errors are reported and
/// skipped, and warnings never stop a load.
///
/// # Example
///
/// ```
/// use linevm_core::api::LoadOptions;
///
/// let options = LoadOptions {
///     fail_on_errors: true,
///     ..LoadOptions::default()
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Reject the whole program if any line has a syntax error.
    ///
    /// Default: false
    pub fail_on_errors: bool,

    /// Reject the whole program if the loader emits any warning
    /// (unknown mnemonic, stray operands, duplicate address).
    ///
    /// Default: false
    pub deny_warnings: bool,
}

/// Configuration options for program execution.
///
/// These options control resource limits during a run.
///
/// # Example
///
/// ```
/// use linevm_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_steps: Some(10_000),
///     max_stack_size: 1024,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum number of instructions a run may execute (if Some).
    ///
    /// Set to `None` for unlimited steps (be careful with untrusted code!
    /// `JUMP` makes infinite loops trivial).
    ///
    /// Default: None
    pub max_steps: Option<u64>,

    /// Maximum number of values on the operand stack.
    ///
    /// Default: 65536
    pub max_stack_size: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_steps: None,
            max_stack_size: 65536,
        }
    }
}

/// Configuration options for the linevm engine.
///
/// These options set the defaults for loading and execution.
///
/// # Example
///
/// ```
/// use linevm_core::api::{EngineOptions, ExecutionOptions, LoadOptions};
///
/// let options = EngineOptions {
///     load: LoadOptions::default(),
///     execution: ExecutionOptions {
///         max_steps: Some(1_000_000),
///         ..ExecutionOptions::default()
///     },
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Options for [`Engine::load`](super::Engine::load).
    pub load: LoadOptions,

    /// Options for [`LoadedProgram::run`](super::LoadedProgram::run).
    pub execution: ExecutionOptions,
}
