/// Why the client force-ended the session out of band.
///
/// Broadcast by the API client when recovery is impossible; the session
/// manager observes it and drops its in-memory state. Storage is already
/// cleared by the raiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The refresh call failed (network error, non-2xx, or missing token in
    /// the response).
    RefreshFailed,
    /// A 401 arrived and no refresh token was stored.
    MissingRefreshToken,
    /// The login or refresh endpoint itself answered 401.
    TerminalUnauthorized,
}
