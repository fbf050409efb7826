//! A module for all encoding needs.
use crate::bits::BitSink;
use crate::dict::{Schedule, Tree};
use crate::{Code, END_OF_STREAM, LITERAL_16, LITERAL_8};

#[cfg(feature = "std")]
use crate::decode::AllResult;
#[cfg(feature = "std")]
use std::io::{self, Read, Write};

use rustc_hash::FxHashMap;

/// The state of one compression.
///
/// Input may be supplied in several calls to [`encode_units`], the result is the same as for the
/// concatenated input. [`finish`] completes the stream and resets the encoder for a new one.
///
/// [`encode_units`]: #method.encode_units
/// [`finish`]: #method.finish
#[derive(Debug)]
pub struct Encoder {
    state: EncodeState,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

/// An async encoding sink.
///
/// See [`Encoder::into_async`] on how to create this type and more information.
///
/// [`Encoder::into_async`]: struct.Encoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

#[derive(Debug)]
struct EncodeState {
    /// The entries seen so far.
    tree: Tree,
    /// The width of index fields.
    schedule: Schedule,
    /// Singletons that were never written, by their code.
    pending: FxHashMap<Code, u16>,
    /// The code of the longest match of the current input, if any input was read.
    current_code: Option<Code>,
    /// The bit buffer for encoding.
    buffer: BitSink,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder {
            state: EncodeState::new(),
        }
    }

    /// Encode some code units.
    ///
    /// Finished bytes accumulate in the encoder, see [`take_bytes`] and [`finish`].
    ///
    /// [`take_bytes`]: #method.take_bytes
    /// [`finish`]: #method.finish
    pub fn encode_units(&mut self, inp: &[u16]) {
        self.state.advance(inp);
    }

    /// Remove the bytes completed so far.
    ///
    /// The last, partially filled byte stays in the encoder.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        self.state.buffer.take_bytes()
    }

    /// The current width of index fields.
    pub fn index_bits(&self) -> u8 {
        self.state.schedule.index_bits()
    }

    /// Write the last match and the end marker, returning all bytes not yet taken.
    ///
    /// Afterwards the encoder is ready to start a new stream.
    pub fn finish(&mut self) -> Vec<u8> {
        let bytes = self.state.finish();
        self.state.reset();
        bytes
    }

    /// Construct an encoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Construct an encoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&mut self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            encoder: self,
            writer,
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

#[cfg(feature = "std")]
impl<W: Write> IntoStream<'_, W> {
    /// Encode some text without ending the stream.
    ///
    /// Writes all bytes completed so far and returns their number.
    pub fn encode(&mut self, text: &str) -> io::Result<usize> {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.encoder.encode_units(&units);
        let bytes = self.encoder.take_bytes();
        self.writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Encode all text from a reader and end the stream.
    pub fn encode_all(self, mut read: impl Read) -> AllResult {
        let IntoStream { encoder, mut writer } = self;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let status = (|| -> io::Result<()> {
            let mut text = String::new();
            bytes_read = read.read_to_string(&mut text)?;

            let units: Vec<u16> = text.encode_utf16().collect();
            encoder.encode_units(&units);
            let bytes = encoder.finish();
            writer.write_all(&bytes)?;
            writer.flush()?;
            bytes_written = bytes.len();
            Ok(())
        })();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + core::marker::Unpin> IntoAsync<'_, W> {
    /// Encode all text from an async reader and end the stream.
    pub async fn encode_all(self, read: impl futures::io::AsyncRead + core::marker::Unpin) -> AllResult {
        use futures::io::{AsyncReadExt, AsyncWriteExt};

        let IntoAsync { encoder, mut writer } = self;
        let mut read = read;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut text = String::new();
        let status = match read.read_to_string(&mut text).await {
            Ok(count) => {
                bytes_read = count;
                let units: Vec<u16> = text.encode_utf16().collect();
                encoder.encode_units(&units);
                let bytes = encoder.finish();
                match writer.write_all(&bytes).await {
                    Ok(()) => {
                        bytes_written = bytes.len();
                        writer.flush().await
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        };

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl EncodeState {
    fn new() -> Self {
        EncodeState {
            tree: Tree::new(),
            schedule: Schedule::for_encoder(),
            pending: FxHashMap::default(),
            current_code: None,
            buffer: BitSink::new(),
        }
    }

    fn reset(&mut self) {
        self.tree.reset();
        self.schedule = Schedule::for_encoder();
        self.pending.clear();
        self.current_code = None;
    }

    fn advance(&mut self, inp: &[u16]) {
        for &unit in inp {
            let single = match self.tree.iterate(Tree::ROOT, unit) {
                Ok(code) => code,
                Err(code) => {
                    self.pending.insert(code, unit);
                    code
                }
            };

            self.current_code = match self.current_code {
                None => Some(single),
                Some(code) => match self.tree.iterate(code, unit) {
                    Ok(longer) => Some(longer),
                    Err(_) => {
                        // The extended match is now an entry of its own; the current one ends.
                        self.emit(code);
                        Some(single)
                    }
                },
            };
        }
    }

    fn finish(&mut self) -> Vec<u8> {
        if let Some(code) = self.current_code.take() {
            self.emit(code);
        }
        self.buffer_code(END_OF_STREAM);
        self.buffer.finish()
    }

    /// Write the code for a finished match.
    ///
    /// The first occurrence of a unit is written as a literal instead of its code, which the
    /// decoder takes as the definition of that code.
    fn emit(&mut self, code: Code) {
        if let Some(unit) = self.pending.remove(&code) {
            if unit < 256 {
                self.buffer_code(LITERAL_8);
                self.buffer.write_reversed_bits(Code::from(unit), 8);
            } else {
                self.buffer_code(LITERAL_16);
                self.buffer.write_reversed_bits(Code::from(unit), 16);
            }
            self.schedule.tick();
        } else {
            self.buffer_code(code);
        }
        self.schedule.tick();
    }

    fn buffer_code(&mut self, code: Code) {
        self.buffer
            .write_reversed_bits(code, self.schedule.index_bits());
    }
}
