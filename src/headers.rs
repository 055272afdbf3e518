//! Marker-segment body parsers (spec §4.E): DQT, DHT, SOF0/SOF2, SOS,
//! DRI, DNL, and the APPn/COM skip. Grounded on
//! `zune-jpeg/src/markers.rs::{parse_dqt, parse_huffman, parse_start_of_frame, parse_sos}`,
//! re-targeted at this crate's `QuantizationTable`/`HuffmanTable`/
//! `FrameHeader`/`ScanHeader` types and the registry-iteration resolution
//! the teacher's single-iteration tables never needed.

use crate::components::{Component, FrameHeader, ScanComponent, ScanHeader, TableRegistry};
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::{read_u16_be, read_u8, EncodingProcess};
use crate::quant::QuantizationTable;

fn seg_len(buf: &[u8], pos: &mut usize, what: &str) -> Result<u16, DecodeErrors> {
    read_u16_be(buf, pos).ok_or_else(|| DecodeErrors::Io(format!("truncated {what} length")))
}

/// Parse a DQT segment, returning `(destination 0..=3, table)` pairs. The
/// caller is responsible for pushing each into the quant-table registry.
pub(crate) fn parse_dqt(buf: &[u8], pos: &mut usize) -> Result<Vec<(u8, QuantizationTable)>, DecodeErrors> {
    let length = seg_len(buf, pos, "DQT")? as usize;
    let end = *pos + length - 2;
    let mut out = Vec::new();

    while *pos < end {
        let info = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DQT".into()))?;
        let precision = info >> 4;
        let dest = info & 0x0F;
        if dest > 3 {
            return Err(DecodeErrors::Format(format!("DQT destination {dest} out of range 0..=3")));
        }
        let is_16_bit = match precision {
            0 => false,
            1 => true,
            p => return Err(DecodeErrors::Format(format!("DQT precision nibble {p} must be 0 or 1"))),
        };

        let mut zigzag_values = [0u16; 64];
        if is_16_bit {
            for v in zigzag_values.iter_mut() {
                *v = read_u16_be(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DQT values".into()))?;
            }
        } else {
            for v in zigzag_values.iter_mut() {
                *v = u16::from(read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DQT values".into()))?);
            }
        }

        out.push((dest, QuantizationTable::from_zigzag(&zigzag_values, is_16_bit)));
    }

    if *pos != end {
        return Err(DecodeErrors::LengthMismatch("DQT segment length did not match its contents".into()));
    }
    Ok(out)
}

/// Parse a DHT segment, returning `(class 0=DC/1=AC, destination, table)`.
pub(crate) fn parse_dht(buf: &[u8], pos: &mut usize) -> Result<Vec<(u8, u8, HuffmanTable)>, DecodeErrors> {
    let length = seg_len(buf, pos, "DHT")? as usize;
    let end = *pos + length - 2;
    let mut out = Vec::new();

    while *pos < end {
        let info = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DHT".into()))?;
        let class = (info >> 4) & 0x01;
        let dest = info & 0x0F;
        if dest > 3 {
            return Err(DecodeErrors::Format(format!("DHT destination {dest} out of range 0..=3")));
        }

        let mut counts = [0u8; 16];
        for c in counts.iter_mut() {
            *c = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DHT counts".into()))?;
        }
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > 256 {
            return Err(DecodeErrors::Format("DHT declares more than 256 codes".into()));
        }
        let mut symbols = vec![0u8; total];
        for s in symbols.iter_mut() {
            *s = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DHT symbols".into()))?;
        }

        let table = HuffmanTable::from_counts_and_symbols(&counts, &symbols)?;
        out.push((class, dest, table));
    }

    if *pos != end {
        return Err(DecodeErrors::LengthMismatch("DHT segment length did not match its contents".into()));
    }
    Ok(out)
}

/// Parse a SOF0/SOF2 segment.
pub(crate) fn parse_sof(buf: &[u8], pos: &mut usize, process: EncodingProcess) -> Result<FrameHeader, DecodeErrors> {
    let length = seg_len(buf, pos, "SOF")?;
    let precision = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF".into()))?;
    if precision != 8 {
        return Err(DecodeErrors::Format(format!("unsupported sample precision {precision}, only 8-bit is supported")));
    }
    let height = read_u16_be(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF".into()))?;
    let width = read_u16_be(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF".into()))?;
    if width == 0 {
        return Err(DecodeErrors::Format("image width is zero".into()));
    }
    let num_components = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF".into()))?;
    if !(1..=4).contains(&num_components) {
        return Err(DecodeErrors::Format(format!(
            "component count {num_components} out of range 1..=4"
        )));
    }
    if length != 8 + 3 * u16::from(num_components) {
        return Err(DecodeErrors::LengthMismatch(format!(
            "SOF length {length} does not match {num_components} components"
        )));
    }

    let mut components = Vec::with_capacity(num_components as usize);
    let mut h_v_sum = 0usize;
    for _ in 0..num_components {
        let id = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF component".into()))?;
        let sampling = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF component".into()))?;
        let qtable_selector = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOF component".into()))?;
        let h_samp = sampling >> 4;
        let v_samp = sampling & 0x0F;
        if h_samp == 0 || h_samp > 2 || v_samp == 0 || v_samp > 2 {
            return Err(DecodeErrors::Format(format!(
                "unsupported sampling factors H={h_samp} V={v_samp} for component {id}"
            )));
        }
        if qtable_selector > 3 {
            return Err(DecodeErrors::Format(format!("quantization selector {qtable_selector} out of range 0..=3")));
        }
        h_v_sum += (h_samp as usize) * (v_samp as usize);
        components.push(Component {
            id,
            h_samp,
            v_samp,
            qtable_selector,
            dc_pred: 0,
        });
    }
    if h_v_sum > 10 {
        return Err(DecodeErrors::Format(format!(
            "sum of H*V sampling factors ({h_v_sum}) exceeds the maximum of 10"
        )));
    }
    // Non-luminance components must have H=V=1 (spec §3 FrameHeader constraint).
    if let Some(bad) = components.iter().skip(1).find(|c| c.h_samp != 1 || c.v_samp != 1) {
        return Err(DecodeErrors::Format(format!(
            "component {} is not luminance but has sampling H={} V={}",
            bad.id, bad.h_samp, bad.v_samp
        )));
    }

    Ok(FrameHeader {
        process,
        precision,
        height,
        width,
        components,
    })
}

/// Parse a SOS segment and resolve each referenced table to the registry
/// iteration in effect right now. `frame` must already be parsed.
pub(crate) fn parse_sos(
    buf: &[u8],
    pos: &mut usize,
    frame: &FrameHeader,
    dc_registry: &TableRegistry<HuffmanTable>,
    ac_registry: &TableRegistry<HuffmanTable>,
    qt_registry: &TableRegistry<QuantizationTable>,
) -> Result<ScanHeader, DecodeErrors> {
    let _length = seg_len(buf, pos, "SOS")?;
    let ns = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOS".into()))?;
    if !(1..=4).contains(&ns) {
        return Err(DecodeErrors::Format(format!("SOS component count {ns} out of range 1..=4")));
    }

    let mut components = Vec::with_capacity(ns as usize);
    for _ in 0..ns {
        let id = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOS component".into()))?;
        let selectors = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOS component".into()))?;
        let dc_sel = selectors >> 4;
        let ac_sel = selectors & 0x0F;
        let component_index = frame.component_index(id)?;

        let qt_sel = frame.components[component_index].qtable_selector;
        components.push(ScanComponent {
            component_index,
            dc_table_selector: dc_sel,
            ac_table_selector: ac_sel,
            dc_iteration: dc_registry.current_iteration(dc_sel as usize),
            ac_iteration: ac_registry.current_iteration(ac_sel as usize),
            qt_iteration: qt_registry.current_iteration(qt_sel as usize),
        });
    }

    let spectral_start = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOS".into()))?;
    let spectral_end = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOS".into()))?;
    let approx = read_u8(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated SOS".into()))?;
    let ah = approx >> 4;
    let al = approx & 0x0F;

    if spectral_start > 63 || spectral_end > 63 || spectral_start > spectral_end {
        return Err(DecodeErrors::Corrupt(format!(
            "spectral range [{spectral_start},{spectral_end}] invalid"
        )));
    }
    if spectral_start == 0 && spectral_end != 0 && frame.process == EncodingProcess::Progressive {
        return Err(DecodeErrors::Format("a DC scan (Ss=0) must have Se=0".into()));
    }

    Ok(ScanHeader {
        components,
        spectral_start,
        spectral_end,
        ah,
        al,
    })
}

/// Parse DRI, returning the new restart interval.
pub(crate) fn parse_dri(buf: &[u8], pos: &mut usize) -> Result<u16, DecodeErrors> {
    let length = seg_len(buf, pos, "DRI")?;
    if length != 4 {
        return Err(DecodeErrors::LengthMismatch(format!("DRI length {length} should be 4")));
    }
    read_u16_be(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DRI".into()))
}

/// Parse DNL, returning the overriding image height.
pub(crate) fn parse_dnl(buf: &[u8], pos: &mut usize) -> Result<u16, DecodeErrors> {
    let length = seg_len(buf, pos, "DNL")?;
    if length != 4 {
        return Err(DecodeErrors::LengthMismatch(format!("DNL length {length} should be 4")));
    }
    read_u16_be(buf, pos).ok_or_else(|| DecodeErrors::Io("truncated DNL".into()))
}

/// Skip an APPn/COM segment, optionally returning its payload.
pub(crate) fn skip_segment(buf: &[u8], pos: &mut usize, keep: bool) -> Result<Option<Vec<u8>>, DecodeErrors> {
    let length = seg_len(buf, pos, "APPn/COM")? as usize;
    let payload_len = length.checked_sub(2).ok_or_else(|| DecodeErrors::LengthMismatch("segment length < 2".into()))?;
    let end = *pos + payload_len;
    if end > buf.len() {
        return Err(DecodeErrors::Io("truncated APPn/COM payload".into()));
    }
    let payload = if keep { Some(buf[*pos..end].to_vec()) } else { None };
    *pos = end;
    Ok(payload)
}
