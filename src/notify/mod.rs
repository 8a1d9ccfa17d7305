//! Outbound notifications.
//!
//! [`Notifier`] is the seam the poll loop delivers through; [`TelegramNotifier`]
//! is the production transport.  Message formatting lives here so it can be
//! tested without a transport.

mod telegram;

pub use self::telegram::TelegramNotifier;

use crate::error::Result;

/// Characters escaped for Telegram's MarkdownV2 dialect.
///
/// MarkdownV2 also reserves `= ( ) [ ] { } |`; text containing those is
/// passed through unescaped and Telegram rejects the message.
pub const RESERVED: &[char] = &['_', '*', '~', '`', '>', '#', '+', '-', '.', '!'];

/// Delivers one entry to the fixed destination.
pub trait Notifier {
    /// Send `title` and `link` as one message.
    ///
    /// Errors are [`RelayError::Delivery`](crate::error::RelayError::Delivery).
    async fn deliver(&self, title: &str, link: &str) -> Result<()>;
}

/// Prefix every [`RESERVED`] character with a backslash.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build the two-line message body.
///
/// The title is wrapped in backticks so Telegram renders it as inline code
/// and does not auto-link anything inside it; the link follows on its own
/// line.
pub fn compose_message(title: &str, link: &str) -> String {
    format!("`{}`\n{}", escape_markdown(title), escape_markdown(link))
}
