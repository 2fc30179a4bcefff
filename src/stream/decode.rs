//! Stream decoding of raw stamps

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::codec;
use crate::types::{DecodedFrame, FrameTimestamp};

/// Extension trait to decode any stream of raw stamps
pub trait DecodeExt: Stream<Item = u64> {
    /// Decode each stamp, dropping sentinels and stamps that are not from `version`
    /// of this protocol.
    fn decode_stamps(self, version: u8) -> Decoded<Self>
    where
        Self: Sized,
    {
        Decoded::new(self, version)
    }
}

impl<T: Stream<Item = u64>> DecodeExt for T {}

pin_project! {
    /// A stream combinator that yields decoded frame metadata
    pub struct Decoded<S> {
        #[pin]
        stream: S,
        version: u8,
        skipped: u64,
    }
}

impl<S> Decoded<S> {
    pub fn new(stream: S, version: u8) -> Self {
        Self { stream, version, skipped: 0 }
    }

    /// Stamps dropped so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<S: Stream<Item = u64>> Stream for Decoded<S> {
    type Item = DecodedFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(value)) => {
                    if FrameTimestamp::new(value).is_protocol_stamp(*this.version) {
                        if let Some(frame) = codec::decode(value) {
                            return Poll::Ready(Some(frame));
                        }
                    }
                    *this.skipped += 1;
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.stream.size_hint().1)
    }
}
