// GEDCOM byte-stream codec.
//
// # Modules
//
// - `encoding` — encodings, line terminators, detection and dispatch
// - `progress` — progress events, observers, cancellation handles
// - `reader`   — bytes -> decoded lines
// - `writer`   — lines -> encoded bytes

pub mod encoding;
pub mod progress;
pub mod reader;
pub mod writer;

pub use encoding::{Encoding, LineTerminator, UnknownTerminator};
pub use progress::{CancelHandle, FileProgress, ProgressObserver};
pub use reader::{LineReader, ReadError, ReadOptions, ReadStats};
pub use writer::{LineWriter, WriteError, WriteOptions, WriteStats, write_lines};
