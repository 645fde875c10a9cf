//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

pub struct DebugFlags {
    /// Emit kind and elapsed time for every job the worker completes.
    pub print_job_timings: bool,
    /// Emit pending-table inserts and removals on the dispatch side.
    pub print_pending_table: bool,
    /// Emit a line for each response discarded because its caller already timed out.
    pub print_late_responses: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_job_timings: false,
    print_pending_table: false,
    print_late_responses: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_are_off_by_default() {
        assert!(!DEBUG_FLAGS.print_job_timings);
        assert!(!DEBUG_FLAGS.print_pending_table);
        assert!(!DEBUG_FLAGS.print_late_responses);
    }
}
