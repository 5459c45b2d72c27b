pub mod header;

pub use crypto_hashes::{double_sha256, lyra2z};
