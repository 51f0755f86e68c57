/// How the provider registry reacts to a failed provider call.
///
/// | Class | Retry same provider? | Try next provider? | Circuit penalty? |
/// |-------|----------------------|--------------------|------------------|
/// | `Never` | No | No | No |
/// | `WithBackoff` | Yes, with exponential backoff | Yes, once retries run out | Yes |
/// | `NextProvider` | No | Yes | No |
/// | `CircuitOpen` | No | Yes | No (already open) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request itself is wrong (bad symbol, bad data). Nobody can serve it.
    Never,

    /// Transient upstream trouble: rate limiting, timeouts, dropped connections.
    ///
    /// The same provider is retried with backoff. If it keeps failing, the
    /// failure counts against its circuit breaker and the next provider is tried.
    WithBackoff,

    /// This provider cannot serve the request but another one might
    /// (unsupported data kind, missing API key, malformed upstream payload).
    NextProvider,

    /// The provider's circuit is open; skip it.
    CircuitOpen,
}
