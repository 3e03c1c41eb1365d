//! Exit codes of `ice-compare`.
//!
//! Scripts and schedulers branch on these, so treat them as a contract.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Run completed (findings do not count unless opted in)      |
//! | 1    | Findings written and `--fail-on-findings` was given        |
//! | 2    | Usage error (bad arguments; emitted by clap)               |
//! | 3    | Configuration missing, unreadable or invalid               |
//! | 4    | Registry could not be opened or its startup reads failed   |
//! | 5    | Findings could not be written (stdout closed)              |
//!
//! Per-patient failures (forecaster down for one call, a registry read
//! failing for one patient) never change the exit code; they are logged and
//! counted in the summary.

/// Run completed.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one finding was written and `--fail-on-findings` was set.
/// Like `diff(1)`, 1 means "the two sides differ."
pub const EXIT_FINDINGS: u8 = 1;

/// Bad arguments. clap exits with this itself.
pub const EXIT_USAGE: u8 = 2;

/// Configuration could not be located, read, parsed or validated.
pub const EXIT_CONFIG: u8 = 3;

/// Registry open, cohort draw or evaluation-code load failed.
pub const EXIT_REGISTRY: u8 = 4;

/// Writing to stdout failed mid-run.
pub const EXIT_OUTPUT: u8 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_FINDINGS, EXIT_USAGE, EXIT_CONFIG, EXIT_REGISTRY, EXIT_OUTPUT];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
