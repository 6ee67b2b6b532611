mod locale;
mod tag;
mod translation;

pub use locale::*;
pub use tag::*;
pub use translation::*;
