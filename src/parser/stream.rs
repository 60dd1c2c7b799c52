//! Lazy parsing of response bodies.
//!
//! The parsers are synchronous and pull from [`std::io::Read`]. To run them over
//! a live response body without buffering it, two bounded channels bridge the
//! async and blocking worlds:
//!
//! ```text
//! body chunks --(pump task)--> chunk channel --(ChannelReader)--> parser
//!     parser --(spawn_blocking, blocking_send)--> item channel --> RdfItemStream
//! ```
//!
//! Both channels are bounded, so a slow consumer stalls the parser and the
//! parser stalls the body. Dropping the [`RdfItemStream`] closes the item
//! channel; the parser stops at its next item and the body is released.
//!
//! # Examples
//!
//! ```ignore
//! use graphdb_http::parser::ContentParser;
//!
//! let mut items = ContentParser::NTriples.parse_stream(response.body.into_stream(), Default::default());
//! while let Some(item) = items.next().await {
//!     println!("{:?}", item?);
//! }
//! ```

use super::{ContentParser, ParserConfig};
use crate::error::{GraphDbError, Result};
use crate::http::ByteStream;
use crate::types::RdfItem;
use bytes::{Buf, Bytes};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::io::{self, BufReader, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Body chunks buffered ahead of the parser.
const CHUNK_BUFFER: usize = 16;
/// Parsed items buffered ahead of the consumer.
const ITEM_BUFFER: usize = 256;

/// Blocking [`Read`] over the chunk channel.
struct ChannelReader {
    receiver: mpsc::Receiver<io::Result<Bytes>>,
    current: Bytes,
}

impl ChannelReader {
    fn new(receiver: mpsc::Receiver<io::Result<Bytes>>) -> Self {
        ChannelReader {
            receiver,
            current: Bytes::new(),
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.current.is_empty() {
            match self.receiver.blocking_recv() {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(err)) => return Err(err),
                None => return Ok(0),
            }
        }
        let len = buf.len().min(self.current.len());
        buf[..len].copy_from_slice(&self.current[..len]);
        self.current.advance(len);
        Ok(len)
    }
}

/// Parse a body on the blocking pool, delivering items as they are produced.
///
/// Must be called from within a tokio runtime.
pub(crate) fn spawn_parse(parser: ContentParser, body: ByteStream, config: ParserConfig) -> RdfItemStream {
    let (chunk_tx, chunk_rx) = mpsc::channel::<io::Result<Bytes>>(CHUNK_BUFFER);
    let (item_tx, item_rx) = mpsc::channel::<Result<RdfItem>>(ITEM_BUFFER);
    let body_failure: Arc<Mutex<Option<GraphDbError>>> = Arc::new(Mutex::new(None));

    let pump_failure = body_failure.clone();
    tokio::spawn(async move {
        let mut body = body;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| {
                *pump_failure.lock() = Some(err);
                io::Error::other("response body interrupted")
            });
            let failed = chunk.is_err();
            if chunk_tx.send(chunk).await.is_err() || failed {
                break;
            }
        }
    });

    tokio::task::spawn_blocking(move || {
        let reader = BufReader::new(ChannelReader::new(chunk_rx));
        let result = parser.parse_into(reader, &config, &mut |item| {
            item_tx
                .blocking_send(Ok(item))
                .map_err(|_| GraphDbError::StreamClosed)
        });
        match result {
            Ok(()) | Err(GraphDbError::StreamClosed) => {}
            Err(err) => {
                // a broken body reports the transport error, not what the parser made of it
                let err = body_failure.lock().take().unwrap_or(err);
                let _ = item_tx.blocking_send(Err(err));
            }
        }
    });

    RdfItemStream::new(item_rx)
}

/// Items parsed lazily from a response body.
///
/// Implements [`Stream`], so `StreamExt` combinators apply. A parse or
/// transport failure is delivered as an `Err` item, after which the stream ends.
pub struct RdfItemStream {
    receiver: ReceiverStream<Result<RdfItem>>,
}

impl RdfItemStream {
    /// Wrap the receiving end of an item channel.
    pub fn new(receiver: mpsc::Receiver<Result<RdfItem>>) -> Self {
        RdfItemStream {
            receiver: ReceiverStream::new(receiver),
        }
    }

    /// Receive the next item; `None` once the body is exhausted.
    pub async fn next(&mut self) -> Option<Result<RdfItem>> {
        self.receiver.next().await
    }

    /// Drain the stream, failing on the first error item.
    pub async fn collect_items(mut self) -> Result<Vec<RdfItem>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }
}

impl Stream for RdfItemStream {
    type Item = Result<RdfItem>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}
