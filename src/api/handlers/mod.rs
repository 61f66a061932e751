pub mod fees;
pub mod payments;
pub mod readers;
pub mod root;
