//! Canonical Huffman table construction and the two-level 256-entry decode
//! lookup (spec §4.B). Grounded on the canonical code assignment loop in
//! `zune-jpeg/src/huffman.rs::build_huffman`, re-targeted at the spec's
//! explicit two-level lookup instead of the teacher's `fast`/`fast_ac`
//! acceleration tables (a different, non-spec scheme).

use crate::errors::DecodeErrors;

/// One `(code, length, symbol)` triple of a canonical Huffman table.
#[derive(Copy, Clone, Debug)]
pub(crate) struct HuffmanEncoding {
    pub code: u16,
    pub bit_length: u8,
    pub symbol: u8,
}

/// One entry of the two-level decode lookup: `bit_length == 0` means "no
/// encoding here yet"; a non-empty `nested` table means the top-level
/// entry only resolved the high byte and the remaining suffix must be
/// looked up in the boxed sub-table (spec's "owned, optional inline
/// structure sitting inside its parent entry").
#[derive(Clone)]
struct DecodeEntry {
    bit_length: u8,
    symbol: u8,
    nested: Option<Box<[DecodeEntry; 256]>>,
}

impl Default for DecodeEntry {
    fn default() -> Self {
        DecodeEntry {
            bit_length: 0,
            symbol: 0,
            nested: None,
        }
    }
}

pub(crate) struct HuffmanTable {
    /// All canonical encodings, ascending by (length, symbol).
    pub encodings: Vec<HuffmanEncoding>,
    /// `symbol -> (code, bit_length)`, used by the encoder.
    encode_map: [Option<(u16, u8)>; 256],
    /// Two-level decode lookup, see `DecodeEntry`.
    top: Box<[DecodeEntry; 256]>,
}

impl HuffmanTable {
    /// Build from the wire format: 16 length-counts and the symbols in
    /// ascending code-length order (ties broken by symbol order already
    /// baked into how DHT lists them).
    pub(crate) fn from_counts_and_symbols(
        counts: &[u8; 16],
        symbols: &[u8],
    ) -> Result<HuffmanTable, DecodeErrors> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total != symbols.len() {
            return Err(DecodeErrors::Format(format!(
                "Huffman table declares {} codes but {} symbols were supplied",
                total,
                symbols.len()
            )));
        }

        let mut encodings = Vec::with_capacity(symbols.len());
        let mut code: u32 = 0;
        let mut sym_iter = symbols.iter();
        for (len_minus_1, &count) in counts.iter().enumerate() {
            let length = (len_minus_1 + 1) as u8;
            for _ in 0..count {
                let symbol = *sym_iter.next().expect("count matches symbols.len()");
                encodings.push(HuffmanEncoding {
                    code: code as u16,
                    bit_length: length,
                    symbol,
                });
                code += 1;
            }
            code <<= 1;
        }

        Self::from_encodings(encodings)
    }

    fn from_encodings(encodings: Vec<HuffmanEncoding>) -> Result<HuffmanTable, DecodeErrors> {
        let mut encode_map = [None; 256];
        let mut top: Box<[DecodeEntry; 256]> = Box::new(std::array::from_fn(|_| DecodeEntry::default()));

        for enc in &encodings {
            encode_map[enc.symbol as usize] = Some((enc.code, enc.bit_length));

            let HuffmanEncoding {
                code,
                bit_length: length,
                symbol,
            } = *enc;

            if length == 0 || length > 16 {
                return Err(DecodeErrors::Format(format!(
                    "Huffman code length {} out of range 1..=16",
                    length
                )));
            }

            if length <= 8 {
                let aligned = (code << (8 - length)) as usize;
                let span = 1usize << (8 - length);
                for i in 0..span {
                    top[i | aligned] = DecodeEntry {
                        bit_length: length,
                        symbol,
                        nested: None,
                    };
                }
            } else {
                let hi = (code >> (length - 8)) as usize;
                let lo = (code << (16 - length)) & 0xFF;
                let span = 1usize << (16 - length);

                if top[hi].nested.is_none() {
                    top[hi].nested = Some(Box::new(std::array::from_fn(|_| DecodeEntry::default())));
                }
                let nested = top[hi].nested.as_mut().unwrap();
                for i in 0..span {
                    nested[(i | lo as usize) & 0xFF] = DecodeEntry {
                        bit_length: length,
                        symbol,
                        nested: None,
                    };
                }
            }
        }

        Ok(HuffmanTable {
            encodings,
            encode_map,
            top,
        })
    }

    /// Decode the symbol whose code is a prefix of `word`'s top bits.
    /// Returns `(consumed_bits, symbol)`.
    #[inline]
    pub(crate) fn decode(&self, word: u16) -> Result<(u8, u8), DecodeErrors> {
        let top = &self.top[(word >> 8) as usize];
        let entry = match &top.nested {
            None => top,
            Some(nested) => &nested[(word & 0xFF) as usize],
        };
        if entry.bit_length == 0 {
            return Err(DecodeErrors::Corrupt(
                "Huffman decode miss: no code matches the bitstream".to_string(),
            ));
        }
        Ok((entry.bit_length, entry.symbol))
    }

    /// `symbol -> (code, bit_length)` for the encoder.
    #[inline]
    pub(crate) fn encode(&self, symbol: u8) -> Option<(u16, u8)> {
        self.encode_map[symbol as usize]
    }

    /// Re-derive `(symbols, counts)` from the encodings, ordered the way
    /// the wire format expects (ascending length, then ascending symbol).
    /// Used by the encoder when writing a DHT segment and by the
    /// canonical-law test.
    pub(crate) fn to_counts_and_symbols(&self) -> ([u8; 16], Vec<u8>) {
        let mut sorted = self.encodings.clone();
        sorted.sort_by_key(|e| (e.bit_length, e.symbol));
        let mut counts = [0u8; 16];
        let mut symbols = Vec::with_capacity(sorted.len());
        for e in sorted {
            counts[(e.bit_length - 1) as usize] += 1;
            symbols.push(e.symbol);
        }
        (counts, symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::HuffmanTable;

    #[test]
    fn canonical_round_trip() {
        // two length-2 codes, one length-3
        let mut counts = [0u8; 16];
        counts[1] = 2;
        counts[2] = 1;
        let symbols = vec![0x01, 0x02, 0x03];
        let table = HuffmanTable::from_counts_and_symbols(&counts, &symbols).unwrap();
        let (out_counts, out_symbols) = table.to_counts_and_symbols();
        assert_eq!(out_counts[1], 2);
        assert_eq!(out_counts[2], 1);
        assert_eq!(out_symbols, symbols);
    }

    #[test]
    fn decode_lookup_matches_encoding() {
        let mut counts = [0u8; 16];
        counts[1] = 2;
        counts[2] = 1;
        let symbols = vec![0x01, 0x02, 0x03];
        let table = HuffmanTable::from_counts_and_symbols(&counts, &symbols).unwrap();
        for enc in &table.encodings {
            let word = (enc.code as u16) << (16 - enc.bit_length);
            let (len, sym) = table.decode(word).unwrap();
            assert_eq!(len, enc.bit_length);
            assert_eq!(sym, enc.symbol);
        }
    }

    #[test]
    fn decode_miss_is_corrupt() {
        let mut counts = [0u8; 16];
        counts[0] = 1;
        let symbols = vec![0x00];
        // code "0" maps to symbol 0; "1xxxxxxx..." should miss.
        let table = HuffmanTable::from_counts_and_symbols(&counts, &symbols).unwrap();
        assert!(table.decode(0xFFFF).is_err());
    }

    #[test]
    fn long_code_uses_nested_table() {
        // force a 12-bit code by giving every length 1..11 a single code
        // and one symbol of length 12.
        let mut counts = [0u8; 16];
        for c in counts.iter_mut().take(11) {
            *c = 1;
        }
        counts[11] = 1;
        let symbols: Vec<u8> = (0..12).collect();
        let table = HuffmanTable::from_counts_and_symbols(&counts, &symbols).unwrap();
        let long = table
            .encodings
            .iter()
            .find(|e| e.bit_length == 12)
            .unwrap();
        let word = long.code << (16 - 12);
        let (len, sym) = table.decode(word).unwrap();
        assert_eq!(len, 12);
        assert_eq!(sym, long.symbol);
    }
}
