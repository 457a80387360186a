mod driver;

pub use driver::*;

#[cfg(test)]
mod driver_test;
