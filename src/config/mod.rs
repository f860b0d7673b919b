pub mod types;
pub mod catalogue;
pub mod validator;
pub mod resolved;
pub mod settings;

pub use types::*;
pub use catalogue::*;
pub use validator::*;
pub use resolved::*;
pub use settings::*;
