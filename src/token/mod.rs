mod scanner;
mod source;
mod token;

pub use scanner::scan;
pub use source::*;
pub use token::*;
