//! User-facing message display.

/// Receives the messages shown to the user at the end of an operation.
pub trait MessageSink {
    /// Display `message`.
    fn show(&self, message: &str);
}

/// Prints messages to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn show(&self, message: &str) {
        println!("{message}");
    }
}
