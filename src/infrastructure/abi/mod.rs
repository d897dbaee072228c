//! ABI infrastructure - Alloy-based ABI scanning, decoding and signature lookup

mod decoder;
mod layered;
mod resolver;
mod scanner;

pub use decoder::AlloyAbiDecoder;
pub use layered::LayeredRegistry;
pub use resolver::{parse_text_signature, AbiResolver};
pub use scanner::AbiScanner;
