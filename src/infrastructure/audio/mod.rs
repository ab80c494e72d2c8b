//! Audio output adapters

mod rodio;

pub use rodio::{decode_file, RodioBackend, RodioDecoder};
