mod attribute;
mod class;
mod constants;
mod field;
mod member;
mod method;
mod version;

pub use attribute::*;
pub use class::*;
pub use constants::*;
pub use field::*;
pub use member::*;
pub use method::*;
pub use version::*;
