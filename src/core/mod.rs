pub mod registry;

pub use registry::LedgerRegistry;
