pub mod classify;
pub mod decision;
pub mod errors;
pub mod protocol;
pub mod response;
pub mod validator;
#[cfg(test)]
pub mod tests;

pub use decision::{RejectReason, ScanDecision};
pub use errors::{InvalidInput, ScanError};
pub use protocol::ValidationProtocol;
pub use validator::ScanValidator;
