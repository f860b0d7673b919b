pub mod caller;
pub mod json;
pub use caller::{CallerId, CALLER_ID_HEADER};
pub use json::JsonBody;
