// Decoder internals: byte primitives, framing, column decoders, and row assembly.
pub mod array;
pub mod bytes;
pub mod column;
pub mod error;
pub mod field;
pub mod format;
pub mod header;
pub mod scan;
pub mod table;
