pub mod conversion;
pub mod field;
pub mod flag;
pub mod form;
pub mod options;
pub mod path;

pub use conversion::*;
pub use field::*;
pub use flag::*;
pub use form::*;
pub use options::*;
pub use path::*;
