//! Remote exchange port.
//!
//! The core consumes the remote model purely as: request in, ordered
//! text-fragment sequence out, eventual close-or-error. Implementations
//! live in `creo-infra`.

use std::pin::Pin;

use futures_util::Stream;

use creo_types::chat::Message;
use creo_types::error::ExchangeError;

/// One open conversation with the remote model.
///
/// The exchange owns the multi-turn context on its side of the boundary;
/// sending a message returns a finite, non-restartable stream of text
/// fragments that ends when the remote side closes it.
///
/// The stream is boxed (not RPITIT) so a submission can hold it across
/// suspension points independently of the exchange borrow.
pub trait ChatExchange: Send + Sync + 'static {
    /// Open a streaming request for `text` against this exchange.
    fn send_message_stream(
        &self,
        text: &str,
    ) -> Pin<Box<dyn Stream<Item = Result<String, ExchangeError>> + Send + 'static>>;
}

/// Creates exchanges, optionally seeded with a prior transcript.
///
/// Uses RPITIT-adjacent associated types so controllers stay generic
/// without boxing the exchange itself.
pub trait ExchangeFactory: Send + Sync {
    type Exchange: ChatExchange;

    /// Create a fresh exchange seeded with `history` (empty for a new
    /// session). History must start with a user turn; callers strip any
    /// leading model messages before seeding.
    fn create(&self, history: &[Message]) -> Self::Exchange;
}
