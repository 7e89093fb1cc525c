//! AAR ledger bot library modules.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
