//! Error type shared by the backend gateway ports.

use super::define_port_error;

define_port_error! {
    /// Failures reported by domain backend gateways.
    pub enum GatewayError {
        /// The backend rejected or did not receive a bearer token.
        Unauthenticated => "backend rejected the session token",
        /// The caller may not act on the resource.
        Forbidden { message: String } => "backend refused the request: {message}",
        /// The resource does not exist.
        NotFound { message: String } => "backend resource not found: {message}",
        /// The backend could not be reached.
        Network { message: String } => "backend unreachable: {message}",
        /// The backend answered with a non-success status.
        Remote { message: String } => "backend error: {message}",
        /// The backend answered with a body we could not interpret.
        Decode { message: String } => "unexpected backend response: {message}",
    }
}
