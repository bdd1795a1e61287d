//! Platform trust-source adapters behind the capability traits.

#[cfg(feature = "platform-unix")]
pub mod unix;

#[cfg(feature = "test-roots")]
pub mod test_roots;
