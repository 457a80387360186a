mod checker;
mod symtable;
mod types;

pub use checker::check;
pub use symtable::SymTable;
pub use types::*;

#[cfg(test)]
mod checker_test;

#[cfg(test)]
mod symtable_test;
