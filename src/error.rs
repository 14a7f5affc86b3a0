// src/error.rs
use thiserror::Error;

/// Which legitimately-empty exchange response was seen. These are expected
/// steady states, not lookup misses, but callers may want to report them
/// distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmptyKind {
    #[error("no accounts in wallet response")]
    NoAccounts,
    #[error("no coins in account")]
    NoCoins,
    #[error("no open positions")]
    NoPositions,
}

/// Classified gateway failure. Every exchange call resolves to a typed
/// payload or exactly one of these; nothing is retried or recovered below
/// the HTTP boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network-level failure reaching the exchange, or an undecodable body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The exchange answered with a non-zero result code. Code and message
    /// are carried verbatim so callers can tell a rejected symbol from an
    /// insufficient balance from a rate limit.
    #[error("bybit error {code}: {message}")]
    Exchange { code: i64, message: String },

    /// Well-formed success envelope, but the requested entity was not in it.
    #[error("not found: {0}")]
    NotFound(String),

    /// Well-formed success envelope legitimately containing zero items.
    #[error("empty result: {0}")]
    EmptyResult(EmptyKind),

    /// The caller's request violated a local constraint; nothing was sent.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}
