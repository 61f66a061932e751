pub mod fees;
pub mod payment;

pub use fees::*;
pub use payment::*;
