//! Optimal Huffman code-length generation (spec §4.D, JPEG Annex K.2/K.3).
//!
//! No file in the reference corpus implements this — none of the pack's
//! JPEG decoders carry an encoder's table optimizer — so this follows the
//! algorithm description in the design spec directly (itself a
//! restatement of libjpeg's `jpeg_gen_optimal_table`). The RLE symbol
//! shape it consumes (one byte per emitted DC/AC code, see
//! `crate::encoder`) is grounded on
//! `other_examples/fc7a2e59_steganogram-stegano-rs__crates-stegano-f5-src-jpeg-huffman.rs.rs`.

use crate::errors::EncodeErrors;

/// Build a canonical `(symbols, code_length_counts)` pair from a stream of
/// RLE-encoded symbols, guaranteeing every length is in `[1, 16]`.
pub(crate) fn optimize_huffman(symbols: &[u8]) -> Result<([u8; 16], Vec<u8>), EncodeErrors> {
    // freq[256] is the reserved symbol: it never appears in real data, so
    // no real symbol can ever be assigned the all-ones code of its length.
    let mut freq = [0u32; 257];
    for &s in symbols {
        freq[s as usize] += 1;
    }
    freq[256] = 1;

    let mut code_size = [0u8; 257];
    let mut others: [i32; 257] = [-1; 257];

    loop {
        // Smallest non-zero frequency; ties keep the larger index.
        let mut v1: i32 = -1;
        let mut smallest = u32::MAX;
        for i in 0..=256 {
            if freq[i] != 0 && freq[i] <= smallest {
                smallest = freq[i];
                v1 = i as i32;
            }
        }

        // Second smallest, excluding v1; ties keep the larger index.
        let mut v2: i32 = -1;
        let mut second = u32::MAX;
        for i in 0..=256 {
            if freq[i] != 0 && i as i32 != v1 && freq[i] <= second {
                second = freq[i];
                v2 = i as i32;
            }
        }

        if v2 < 0 {
            break;
        }

        freq[v1 as usize] += freq[v2 as usize];
        freq[v2 as usize] = 0;

        let mut c1 = v1;
        code_size[c1 as usize] += 1;
        while others[c1 as usize] >= 0 {
            c1 = others[c1 as usize];
            code_size[c1 as usize] += 1;
        }
        others[c1 as usize] = v2;

        let mut c2 = v2;
        code_size[c2 as usize] += 1;
        while others[c2 as usize] >= 0 {
            c2 = others[c2 as usize];
            code_size[c2 as usize] += 1;
        }
    }

    // bits[1..=32], index 0 unused.
    let mut bits = [0u32; 33];
    for i in 0..=256 {
        let len = code_size[i];
        if len > 0 {
            bits[len as usize] += 1;
        }
    }

    // Length-limit to 16 (Annex K.3).
    let mut i = 32usize;
    while i > 16 {
        while bits[i] > 0 {
            let mut j = i - 2;
            while bits[j] == 0 {
                if j == 0 {
                    return Err(EncodeErrors::BudgetExceeded(
                        "could not length-limit Huffman table to 16 bits".to_string(),
                    ));
                }
                j -= 1;
            }
            bits[i] -= 2;
            bits[i - 1] += 1;
            bits[j + 1] += 2;
            bits[j] -= 1;
        }
        i -= 1;
    }

    // Remove the reserved symbol from the longest populated length.
    let mut top = 32usize;
    while top > 0 && bits[top] == 0 {
        top -= 1;
    }
    if top == 0 || top > 16 {
        return Err(EncodeErrors::BudgetExceeded(
            "Huffman code length generation degenerated".to_string(),
        ));
    }
    bits[top] -= 1;

    // Order real symbols (0..=255, excluding the reserved 256) by
    // ascending length, ties by ascending symbol value.
    let mut ordered: Vec<(u8, u8)> = (0..=255u16)
        .filter(|&s| code_size[s as usize] > 0)
        .map(|s| (code_size[s as usize], s as u8))
        .collect();
    ordered.sort_unstable();

    let mut counts = [0u8; 16];
    for len in 1..=16 {
        counts[len - 1] = bits[len] as u8;
    }
    let symbols_out: Vec<u8> = ordered.into_iter().map(|(_, s)| s).collect();

    debug_assert_eq!(
        counts.iter().map(|&c| c as usize).sum::<usize>(),
        symbols_out.len()
    );

    Ok((counts, symbols_out))
}

#[cfg(test)]
mod tests {
    use super::optimize_huffman;

    #[test]
    fn length_bound_holds() {
        // A skewed distribution: one very common symbol, many rare ones.
        let mut symbols = vec![0u8; 1000];
        for s in 1u8..=40 {
            symbols.push(s);
        }
        let (counts, syms) = optimize_huffman(&symbols).unwrap();
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        assert_eq!(total, syms.len());
        assert!(total > 0);
    }

    #[test]
    fn single_symbol_gets_length_one() {
        let symbols = vec![7u8; 50];
        let (counts, syms) = optimize_huffman(&symbols).unwrap();
        assert_eq!(syms, vec![7]);
        assert_eq!(counts[0], 1);
    }

    #[test]
    fn uniform_distribution_stays_in_range() {
        let symbols: Vec<u8> = (0..=255u16).flat_map(|s| vec![s as u8; 3]).collect();
        let (counts, syms) = optimize_huffman(&symbols).unwrap();
        assert_eq!(syms.len(), 256);
        assert!(counts.iter().map(|&c| c as usize).sum::<usize>() == 256);
    }
}
