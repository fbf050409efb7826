//! A module for all decoding needs.
use crate::bits::BitSource;
use crate::dict::Table;
use crate::error::{LzError, Result};
use crate::{Code, END_OF_STREAM, LITERAL_16, LITERAL_8};

#[cfg(feature = "std")]
use std::io::{self, Read, Write};

use log::debug;

/// The state of decompression.
///
/// Each call to [`decode_units`] decodes one complete stream. The dictionary is kept between
/// calls only to reuse its allocation.
///
/// [`decode_units`]: #method.decode_units
#[derive(Debug)]
pub struct Decoder {
    table: Table,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

/// An async decoding sink.
///
/// See [`Decoder::into_async`] on how to create this type and more information.
///
/// [`Decoder::into_async`]: struct.Decoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

/// The result of coding into an output stream.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The possible error that occurred.
    ///
    /// Note that when writing into streams it is not in general possible to recover from an
    /// error.
    pub status: std::io::Result<()>,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            table: Table::new(),
        }
    }

    /// Decode one complete stream into code units.
    ///
    /// Decoding ends at the end marker; any bytes after it are ignored. Running out of data
    /// before the marker is an error, as is a code referring to an entry that does not exist.
    pub fn decode_units(&mut self, inp: &[u8]) -> Result<Vec<u16>> {
        self.table.reset();
        let mut source = BitSource::new(inp);
        let result = self.run(&mut source);
        if let Err(err) = &result {
            debug!(
                "decoding stopped at bit {} of {}: {}",
                source.position(),
                inp.len() * 8,
                err
            );
        }
        result
    }

    /// Construct a decoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Construct a decoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&mut self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            decoder: self,
            writer,
        }
    }

    fn run(&mut self, source: &mut BitSource<'_>) -> Result<Vec<u16>> {
        let mut out = vec![];

        let first = match source.read_reversed_bits(self.table.index_bits())? {
            LITERAL_8 => source.read_reversed_bits(8)?,
            LITERAL_16 => source.read_reversed_bits(16)?,
            END_OF_STREAM => return Ok(out),
            code => return Err(self.not_decodable(code)),
        } as u16;

        // The entry decoded last, and its first unit.
        let mut word = self.table.len() as Code;
        let mut word_first = first;
        self.table.push_base(first);
        out.push(first);

        loop {
            let entries = self.table.len() as Code;
            let code = match source.read_reversed_bits(self.table.index_bits())? {
                LITERAL_8 => {
                    let unit = source.read_reversed_bits(8)? as u16;
                    self.table.push_base(unit);
                    entries
                }
                LITERAL_16 => {
                    let unit = source.read_reversed_bits(16)? as u16;
                    self.table.push_base(unit);
                    entries
                }
                END_OF_STREAM => return Ok(out),
                code => code,
            };

            let len = self.table.len();
            if (code as usize) < len {
                let first = self.table.reconstruct(code, &mut out);
                self.table.derive(word, first);
                word_first = first;
            } else if code as usize == len {
                // The encoder used the entry it created while writing the previous one. That entry
                // is the previous one extended by its own first unit.
                self.table.derive(word, word_first);
                self.table.reconstruct(code, &mut out);
            } else {
                return Err(self.not_decodable(code));
            }
            word = code;
        }
    }

    fn not_decodable(&self, code: Code) -> LzError {
        LzError::CorruptStream {
            code,
            entries: self.table.len(),
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

#[cfg(feature = "std")]
impl<W: Write> IntoStream<'_, W> {
    /// Decode a complete stream from a reader and write it as UTF-8.
    ///
    /// Unpaired surrogates are written as U+FFFD.
    pub fn decode_all(self, mut read: impl Read) -> AllResult {
        let IntoStream { decoder, mut writer } = self;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let status = (|| -> io::Result<()> {
            let mut data = vec![];
            bytes_read = read.read_to_end(&mut data)?;

            let units = decoder.decode_units(&data)?;
            let text = String::from_utf16_lossy(&units);
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
            bytes_written = text.len();
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
    /// Decode a complete stream from an async reader and write it as UTF-8.
    pub async fn decode_all(self, read: impl futures::io::AsyncRead + core::marker::Unpin) -> AllResult {
        use futures::io::{AsyncReadExt, AsyncWriteExt};

        let IntoAsync { decoder, mut writer } = self;
        let mut read = read;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut data = vec![];
        let status = match read.read_to_end(&mut data).await {
            Ok(count) => {
                bytes_read = count;
                match decoder.decode_units(&data) {
                    Ok(units) => {
                        let text = String::from_utf16_lossy(&units);
                        match writer.write_all(text.as_bytes()).await {
                            Ok(()) => {
                                bytes_written = text.len();
                                writer.flush().await
                            }
                            Err(err) => Err(err),
                        }
                    }
                    Err(err) => Err(err.into()),
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

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::error::LzError;

    #[test]
    fn end_marker_first() {
        let mut decoder = Decoder::new();
        assert!(decoder.decode_units(&[0b0100_0000]).unwrap().is_empty());
    }

    #[test]
    fn single_literal() {
        let mut decoder = Decoder::new();
        let units = decoder.decode_units(&[0b0010_0001, 0b1001_0000]).unwrap();
        assert_eq!(units, [u16::from(b'a')]);
    }

    #[test]
    fn invalid_first_code() {
        // Reversed 3 in two bits.
        let mut decoder = Decoder::new();
        let result = decoder.decode_units(&[0b1100_0000]);
        assert!(matches!(result, Err(LzError::CorruptStream { code: 3, entries: 3 })));
    }

    #[test]
    fn self_referencing_code() {
        // A run of one unit makes the encoder write codes 4 and 5 right as it creates them.
        let text = vec![u16::from(b'a'); 7];
        let packed = crate::compress(&text);
        assert_eq!(Decoder::new().decode_units(&packed).unwrap(), text);
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut packed = crate::compress_str("trailing");
        packed.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(crate::decompress_to_string(&packed).unwrap(), "trailing");
    }

    #[test]
    fn decoder_reuse() {
        let mut decoder = Decoder::new();
        let packed = crate::compress_str("reuse reuse reuse");
        let first = decoder.decode_units(&packed).unwrap();
        assert!(decoder.decode_units(&[]).is_err());
        assert_eq!(decoder.decode_units(&packed).unwrap(), first);
    }

    #[test]
    fn empty_input_is_end_of_stream() {
        let result = Decoder::new().decode_units(&[]);
        assert!(matches!(result, Err(LzError::EndOfStream)));
    }
}
