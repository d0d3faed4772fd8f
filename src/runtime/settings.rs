/// Knobs for running bytecode
#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum number of frames on a thread
    ///
    /// There is no native stack overflow to fall back on, so unbounded recursion in the bytecode
    /// is cut off with `CallDepthExceeded` when a call would go past this.
    pub max_call_depth: usize,

    /// Log every instruction executed (at `trace` level)
    pub trace_instructions: bool,
}

impl Settings {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            max_call_depth: Settings::DEFAULT_MAX_CALL_DEPTH,
            trace_instructions: true,
        }
    }
}
