pub(crate) mod batch;

pub use batch::*;
