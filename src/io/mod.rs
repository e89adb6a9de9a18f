//! File-backed sources and file discovery.

pub mod compression;
pub mod glob;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod csv;
