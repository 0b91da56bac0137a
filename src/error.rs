//! Failure taxonomy for extraction.
//!
//! Ambiguity that the precedence rules can resolve is *not* an error;
//! it is resolved deterministically and at most logged. These variants
//! cover genuinely absent input, broken caller-supplied dates, and the
//! optional language-model fallback misbehaving. A failure never carries
//! a partially-filled candidate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input was empty or whitespace-only; there is nothing to parse.
    #[error("no text to parse")]
    EmptyInput,

    /// A caller-supplied date or time could not be interpreted or pushed
    /// past a calendar boundary.
    #[error("invalid date arithmetic: {0}")]
    InvalidDateArithmetic(String),

    /// The language-model fallback did not answer within its deadline.
    #[error("language-model request timed out")]
    OracleTimeout,

    /// The language-model fallback could not be reached or refused the
    /// request.
    #[error("language-model request failed: {0}")]
    OracleUnavailable(String),

    /// The language-model fallback answered with something that does not
    /// satisfy the candidate invariants.
    #[error("language-model reply was malformed: {0}")]
    OracleMalformedResponse(String),
}
