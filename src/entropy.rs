//! Baseline and progressive entropy decoding (spec §4.F): the DC/AC Huffman
//! decode helpers, EOBRUN bookkeeping, and successive-approximation
//! refinement. Grounded on the scan-loop shape of
//! `zune-jpeg/src/mcu_prog.rs` and the DC/AC decode structure of
//! `zune-jpeg/src/bitstream.rs::decode_mcu_block`, split out of the
//! teacher's fused "decode DC then all AC in one function" into the
//! named helpers the design spec calls for (`decode_value`, `extend`,
//! `decode_dc`, `decode_ac`) so the AC-refinement path doesn't have to
//! duplicate the baseline one. The AC-refinement traversal itself follows
//! the standard JPEG successive-approximation algorithm (libjpeg's
//! `decode_mcu_AC_refine`), since `zune-jpeg` only decodes (never
//! re-derives) refinement scans the same way an encoder's reference
//! decoder would need to be checked against.

use crate::bitstream::BitReader;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::ZIGZAG;

/// One 8x8 block of coefficients in natural (row-major) order.
pub(crate) type Block = [i32; 64];

/// Decode one Huffman symbol: peek 16 bits, resolve, consume the bits the
/// table says the code actually used.
#[inline]
pub(crate) fn decode_value(reader: &mut BitReader, table: &HuffmanTable) -> Result<u8, DecodeErrors> {
    let word = reader.peek_word();
    let (bit_length, symbol) = table.decode(word)?;
    reader.skip_bits(u32::from(bit_length));
    Ok(symbol)
}

/// JPEG "additional bits" sign extension (Annex F.2.2.1). `extend(0, _)`
/// is defined to be `0`.
#[inline]
pub(crate) fn extend(ssss: u8, bits: u32) -> i32 {
    if ssss == 0 {
        return 0;
    }
    let bits = bits as i32;
    let half = 1i32 << (ssss - 1);
    if bits < half {
        bits - ((1i32 << ssss) - 1)
    } else {
        bits
    }
}

/// Decode one DC difference: `ssss` from the Huffman table, then `ssss`
/// raw magnitude bits.
#[inline]
pub(crate) fn decode_dc(reader: &mut BitReader, dc_table: &HuffmanTable) -> Result<i32, DecodeErrors> {
    let ssss = decode_value(reader, dc_table)?;
    if ssss > 16 {
        return Err(DecodeErrors::Corrupt(format!("DC coefficient magnitude category {ssss} out of range")));
    }
    let bits = reader.get_n_bits(u32::from(ssss));
    Ok(extend(ssss, bits))
}

/// Decode one AC run/size pair: high nibble is the zero-run length, low
/// nibble is the magnitude category.
#[inline]
pub(crate) fn decode_ac(reader: &mut BitReader, ac_table: &HuffmanTable) -> Result<(u8, u8), DecodeErrors> {
    let byte = decode_value(reader, ac_table)?;
    Ok((byte >> 4, byte & 0x0F))
}

/// Decode one full baseline block: DC difference added to the running
/// predictor, then the AC run/size sweep through zigzag order until EOB.
pub(crate) fn decode_block_baseline(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    prev_dc: &mut i32,
) -> Result<Block, DecodeErrors> {
    let mut block: Block = [0; 64];

    let diff = decode_dc(reader, dc_table)?;
    let dc = *prev_dc + diff;
    *prev_dc = dc;
    block[0] = dc;

    let mut i: usize = 1;
    while i < 64 {
        let (run, size) = decode_ac(reader, ac_table)?;
        if run == 0 && size == 0 {
            break; // EOB
        }
        if run == 15 && size == 0 {
            i += 16; // ZRL
            continue;
        }
        i += run as usize;
        if i >= 64 {
            return Err(DecodeErrors::Corrupt("AC run overshoots the end of the block".to_string()));
        }
        let bits = reader.get_n_bits(u32::from(size));
        block[ZIGZAG[i]] = extend(size, bits);
        i += 1;
    }

    Ok(block)
}

/// Progressive DC first scan (`Ss = Se = 0, Ah = 0`): like baseline DC,
/// shifted left by `Al`.
pub(crate) fn decode_dc_first(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    prev_dc: &mut i32,
    al: u8,
) -> Result<i32, DecodeErrors> {
    let diff = decode_dc(reader, dc_table)?;
    let dc = *prev_dc + diff;
    *prev_dc = dc;
    Ok(dc << al)
}

/// Progressive DC refinement (`Ss = Se = 0, Ah > 0`): OR in one more bit.
pub(crate) fn decode_dc_refine(reader: &mut BitReader, al: u8) -> i32 {
    (reader.get_bit() as i32) << al
}

/// Progressive AC first scan (`Ss > 0, Ah = 0`). `eobrun` persists across
/// calls for blocks covered by the same scan; the caller decrements it
/// here when it's already running and skips the rest of the work for
/// this block.
pub(crate) fn decode_ac_first(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    ss: u8,
    se: u8,
    al: u8,
    eobrun: &mut u32,
    block: &mut Block,
) -> Result<(), DecodeErrors> {
    if *eobrun > 0 {
        *eobrun -= 1;
        return Ok(());
    }

    let mut k = ss as usize;
    let se = se as usize;
    while k <= se {
        let (run, size) = decode_ac(reader, ac_table)?;
        if size != 0 {
            k += run as usize;
            if k > se {
                return Err(DecodeErrors::Corrupt("AC-first run overshoots the scan's spectral range".to_string()));
            }
            let bits = reader.get_n_bits(u32::from(size));
            block[ZIGZAG[k]] = extend(size, bits) << al;
            k += 1;
        } else if run == 15 {
            k += 16; // ZRL
        } else {
            let extra = reader.get_n_bits(u32::from(run));
            *eobrun = (1u32 << run) + extra - 1;
            break;
        }
    }
    Ok(())
}

/// Progressive AC refinement (`Ss > 0, Ah > 0`), the standard
/// successive-approximation sweep: existing non-zero coefficients each
/// consume one correction bit; zero positions are the targets of the next
/// decoded run/size pair (or of the implicit run when `eobrun` is active).
pub(crate) fn decode_ac_refine(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    ss: u8,
    se: u8,
    al: u8,
    eobrun: &mut u32,
    block: &mut Block,
) -> Result<(), DecodeErrors> {
    let p1 = 1i32 << al;
    let m1 = -1i32 << al;
    let se = se as usize;
    let mut k = ss as usize;

    if *eobrun == 0 {
        while k <= se {
            let (mut run, size) = decode_ac(reader, ac_table)?;
            let mut new_coef = 0i32;
            if size != 0 {
                // size is always 1 here; the sign bit picks +-(1<<Al).
                if reader.get_bit() != 0 {
                    new_coef = p1;
                } else {
                    new_coef = m1;
                }
            } else if run != 15 {
                let extra = reader.get_n_bits(u32::from(run));
                *eobrun = (1u32 << run) + extra;
                break;
            }

            while k <= se {
                let pos = ZIGZAG[k];
                if block[pos] != 0 {
                    if reader.get_bit() != 0 && (block[pos] & p1) == 0 {
                        block[pos] += if block[pos] >= 0 { p1 } else { m1 };
                    }
                } else {
                    if run == 0 {
                        if new_coef != 0 {
                            block[pos] = new_coef;
                        }
                        k += 1;
                        break;
                    }
                    run -= 1;
                }
                k += 1;
            }
        }
    }

    if *eobrun > 0 {
        while k <= se {
            let pos = ZIGZAG[k];
            if block[pos] != 0 && reader.get_bit() != 0 && (block[pos] & p1) == 0 {
                block[pos] += if block[pos] >= 0 { p1 } else { m1 };
            }
            k += 1;
        }
        *eobrun -= 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwriter::BitWriter;

    #[test]
    fn extend_zero_length_is_zero() {
        assert_eq!(extend(0, 5), 0);
    }

    #[test]
    fn extend_matches_annex_f_examples() {
        // ssss=3: half range is 4; bits=3 -> 3-7=-4; bits=4 -> 4
        assert_eq!(extend(3, 3), -4);
        assert_eq!(extend(3, 4), 4);
        assert_eq!(extend(1, 0), -1);
        assert_eq!(extend(1, 1), 1);
    }

    fn single_symbol_table(symbol: u8) -> HuffmanTable {
        let mut counts = [0u8; 16];
        counts[0] = 1;
        HuffmanTable::from_counts_and_symbols(&counts, &[symbol]).unwrap()
    }

    #[test]
    fn progressive_eobrun_scenario() {
        // (r,s) = (3,0) then two extra bits 0b10 -> eobrun = (1<<3)+2-1 = 9.
        let ac_table = single_symbol_table(0x30); // run=3, size=0
        let mut writer = BitWriter::new();
        writer.write_bits(0, 1); // the single 1-bit code for the symbol above
        writer.write_bits(0b010, 3); // get_n_bits(3) must read all 3 extra bits
        writer.flush_byte(false);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::from_bytes(bytes);

        let mut block = [0i32; 64];
        let mut eobrun = 0u32;
        decode_ac_first(&mut reader, &ac_table, 1, 63, 0, &mut eobrun, &mut block).unwrap();
        assert_eq!(eobrun, 9);
    }
}
