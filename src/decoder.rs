//! Top-level JPEG marker dispatch (spec §4.E) and the decode orchestration
//! that wires the entropy decoder (`crate::entropy`) to the pipeline
//! coordinator (`crate::pipeline`) and colour conversion
//! (`crate::color_convert`). Grounded on the marker-dispatch loop and
//! top-level scan loop of `zune-jpeg/src/headers.rs`/`src/image.rs`, with
//! the queue/fence wiring new (see `crate::pipeline`'s module doc).
//!
//! Simplifying scope decision (recorded in `DESIGN.md`): a non-interleaved
//! progressive AC scan's per-component block order is treated as the
//! flattened `(MCU, sub-block)` raster order rather than re-deriving the
//! component's own padded block grid. This coincides with the true JPEG
//! block order for images whose dimensions are aligned to the MCU grid.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::bitstream::BitReader;
use crate::color_convert::ycbcr_to_rgb;
use crate::components::{Component, FrameHeader, ScanComponent, ScanHeader, TableRegistry};
use crate::dct::inverse_dct;
use crate::entropy::{self, Block};
use crate::errors::{context, DecodeErrors};
use crate::headers;
use crate::huffman::HuffmanTable;
use crate::image::{ColorSpaceOutput, DecoderOptions, Image};
use crate::marker::Marker;
use crate::misc::EncodingProcess;
use crate::pipeline::{FatalSlot, FenceVector, Queue};
use crate::quant::QuantizationTable;

struct PendingScan {
    header: ScanHeader,
    data: Vec<u8>,
    restart_interval: u16,
}

/// Parse the full marker stream, then run the decode pipeline.
pub(crate) fn decode_jpeg_bytes(buf: &[u8], options: &DecoderOptions) -> Result<Image, DecodeErrors> {
    let mut pos = 0usize;
    expect_soi(buf, &mut pos)?;

    let mut qt_registry: TableRegistry<QuantizationTable> = TableRegistry::new();
    let mut dc_registry: TableRegistry<HuffmanTable> = TableRegistry::new();
    let mut ac_registry: TableRegistry<HuffmanTable> = TableRegistry::new();
    let mut frame: Option<FrameHeader> = None;
    let mut restart_interval: u16 = 0;
    let mut scans: Vec<PendingScan> = Vec::new();

    loop {
        let marker = next_marker(buf, &mut pos)?;
        match marker {
            Marker::SOI => return Err(DecodeErrors::Format("unexpected second SOI".to_string())),
            Marker::APP(_) | Marker::COM => {
                headers::skip_segment(buf, &mut pos, options.keep_metadata)?;
            }
            Marker::DQT => {
                for (dest, table) in headers::parse_dqt(buf, &mut pos)? {
                    qt_registry.define(dest as usize, table);
                }
            }
            Marker::DHT => {
                for (class, dest, table) in headers::parse_dht(buf, &mut pos)? {
                    if class == 0 {
                        dc_registry.define(dest as usize, table);
                    } else {
                        ac_registry.define(dest as usize, table);
                    }
                }
            }
            Marker::DRI => {
                restart_interval = headers::parse_dri(buf, &mut pos)?;
                log::debug!("restart interval set to {restart_interval}");
            }
            Marker::DNL => {
                let height = headers::parse_dnl(buf, &mut pos)?;
                if let Some(f) = frame.as_mut() {
                    f.height = height;
                }
                log::debug!("DNL overrides frame height to {height}");
            }
            Marker::SOF0 => frame = Some(headers::parse_sof(buf, &mut pos, EncodingProcess::Baseline)?),
            Marker::SOF2 => frame = Some(headers::parse_sof(buf, &mut pos, EncodingProcess::Progressive)?),
            Marker::SOFUnsupported(byte) => {
                return Err(DecodeErrors::Format(format!("unsupported start-of-frame marker 0x{byte:02X}")));
            }
            Marker::SOS => {
                let f = frame.as_ref().ok_or_else(|| DecodeErrors::Format("SOS before SOF".to_string()))?;
                let header = headers::parse_sos(buf, &mut pos, f, &dc_registry, &ac_registry, &qt_registry)
                    .map_err(|e| context("parsing SOS", e))?;
                let data = consume_entropy_segment(buf, &mut pos)?;
                scans.push(PendingScan {
                    header,
                    data,
                    restart_interval,
                });
            }
            Marker::RST(_) => {
                log::debug!("ignoring restart marker found outside scan data");
            }
            Marker::EOI => break,
            Marker::Other(byte) => {
                log::debug!("skipping unrecognised marker 0x{byte:02X}");
                headers::skip_segment(buf, &mut pos, false)?;
            }
        }
    }

    let frame = frame.ok_or_else(|| DecodeErrors::Format("no start-of-frame segment found".to_string()))?;
    if scans.is_empty() {
        return Err(DecodeErrors::Format("no scan data found".to_string()));
    }
    if scans.len() > options.max_scans {
        return Err(DecodeErrors::Format(format!(
            "frame declares {} scans, more than the configured max_scans limit of {}",
            scans.len(),
            options.max_scans
        )));
    }

    run_decode(frame, qt_registry, dc_registry, ac_registry, scans, options)
}

fn expect_soi(buf: &[u8], pos: &mut usize) -> Result<(), DecodeErrors> {
    if buf.len() < 2 || buf[0] != 0xFF || buf[1] != 0xD8 {
        return Err(DecodeErrors::Format("not a JPEG file (missing SOI marker)".to_string()));
    }
    *pos = 2;
    Ok(())
}

fn next_marker(buf: &[u8], pos: &mut usize) -> Result<Marker, DecodeErrors> {
    loop {
        let byte = *buf
            .get(*pos)
            .ok_or_else(|| DecodeErrors::Io("unexpected end of file while looking for a marker".to_string()))?;
        *pos += 1;
        if byte != 0xFF {
            continue; // stray fill byte between segments
        }
        let next = *buf
            .get(*pos)
            .ok_or_else(|| DecodeErrors::Io("unexpected end of file after 0xFF".to_string()))?;
        *pos += 1;
        if next == 0xFF {
            *pos -= 1; // fill byte, re-read next iteration
            continue;
        }
        if let Some(marker) = Marker::from_u8(next) {
            return Ok(marker);
        }
        return Err(DecodeErrors::Internal("encountered stuffed 0x00 outside scan data".to_string()));
    }
}

/// Consume the entropy-coded segment following a SOS header: copy bytes
/// to the output, de-stuffing `FF 00 -> FF` and dropping RSTn markers,
/// stopping just before the next real marker (left unconsumed).
fn consume_entropy_segment(buf: &[u8], pos: &mut usize) -> Result<Vec<u8>, DecodeErrors> {
    let mut out = Vec::new();
    loop {
        let byte = *buf
            .get(*pos)
            .ok_or_else(|| DecodeErrors::Io("unexpected end of file inside scan data".to_string()))?;
        if byte != 0xFF {
            out.push(byte);
            *pos += 1;
            continue;
        }
        let next = *buf
            .get(*pos + 1)
            .ok_or_else(|| DecodeErrors::Io("unexpected end of file after 0xFF in scan data".to_string()))?;
        match next {
            0x00 => {
                out.push(0xFF);
                *pos += 2;
            }
            0xD0..=0xD7 => {
                *pos += 2; // restart marker, dropped; MCU-count bookkeeping handles the reset
            }
            _ => return Ok(out), // real marker, leave it for the main loop
        }
    }
}

/// One decoded MCU: `blocks[component_index]` holds that component's
/// `H*V` (or 1) blocks.
struct Mcu {
    index: usize,
    blocks: Vec<Vec<Block>>,
}

struct FBlockMcu {
    index: usize,
    blocks: Vec<Vec<[f32; 64]>>,
}

fn run_decode(
    frame: FrameHeader,
    qt_registry: TableRegistry<QuantizationTable>,
    dc_registry: TableRegistry<HuffmanTable>,
    ac_registry: TableRegistry<HuffmanTable>,
    scans: Vec<PendingScan>,
    options: &DecoderOptions,
) -> Result<Image, DecodeErrors> {
    let grid_w = frame.mcu_grid_w();
    let grid_h = frame.mcu_grid_h();
    let mcu_count = grid_w * grid_h;
    let width = frame.width as usize;
    let height = frame.height as usize;
    let num_components = frame.components.len();

    let quant_tables = resolve_quant_tables(&frame, &qt_registry, &scans)?;
    let mcus: Vec<Mutex<Mcu>> = (0..mcu_count)
        .map(|i| {
            Mutex::new(Mcu {
                index: i,
                blocks: frame
                    .components
                    .iter()
                    .map(|c| vec![[0i32; 64]; (c.h_samp as usize) * (c.v_samp as usize)])
                    .collect(),
            })
        })
        .collect();
    let mcus = Arc::new(mcus);

    let output = Arc::new(Mutex::new(vec![0u8; 3 * width * height]));
    let fatal = Arc::new(FatalSlot::new());
    let dequant_queue: Arc<Queue<Mcu>> = Arc::new(Queue::new());
    let idct_queue: Arc<Queue<FBlockMcu>> = Arc::new(Queue::new());
    let color_queue: Arc<Queue<FBlockMcu>> = Arc::new(Queue::new());

    thread::scope(|scope| {
        match frame.process {
            EncodingProcess::Baseline => {
                if scans.len() != 1 {
                    fatal.set("baseline frames with more than one scan are not supported".to_string());
                    dequant_queue.close();
                } else {
                    spawn_baseline_entropy(scope, &frame, &scans[0], &dc_registry, &ac_registry, grid_w, grid_h, Arc::clone(&dequant_queue), Arc::clone(&fatal));
                }
            }
            EncodingProcess::Progressive => {
                spawn_progressive_entropy(scope, &frame, &scans, &dc_registry, &ac_registry, Arc::clone(&mcus), mcu_count, Arc::clone(&dequant_queue), Arc::clone(&fatal));
            }
        }

        spawn_dequant_worker(scope, Arc::clone(&dequant_queue), Arc::clone(&idct_queue), quant_tables.clone(), Arc::clone(&fatal));
        spawn_idct_worker(scope, Arc::clone(&idct_queue), Arc::clone(&color_queue));
        spawn_color_worker(scope, Arc::clone(&color_queue), Arc::clone(&output), &frame, width, height, grid_w, options);
    });

    if let Some(message) = fatal.take() {
        return Err(DecodeErrors::Corrupt(message));
    }

    let mut data = Arc::try_unwrap(output)
        .map_err(|_| DecodeErrors::Internal("output buffer still shared after join".to_string()))?
        .into_inner()
        .unwrap();
    if num_components == 1 && options.output_color_space == ColorSpaceOutput::Grayscale {
        data = rgb_to_grayscale(&data);
    }

    Ok(Image {
        width: frame.width as u32,
        height: frame.height as u32,
        data,
    })
}

fn rgb_to_grayscale(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3).map(|p| p[0]).collect()
}

fn resolve_quant_tables(frame: &FrameHeader, qt_registry: &TableRegistry<QuantizationTable>, scans: &[PendingScan]) -> Result<Vec<QuantizationTable>, DecodeErrors> {
    let mut resolved: Vec<Option<QuantizationTable>> = vec![None; frame.components.len()];
    for scan in scans {
        for sc in &scan.header.components {
            if resolved[sc.component_index].is_some() {
                continue;
            }
            let selector = frame.components[sc.component_index].qtable_selector as usize;
            let table = qt_registry
                .get(selector, sc.qt_iteration)
                .ok_or_else(|| DecodeErrors::Format(format!("component {} references an undefined quantization table", sc.component_index)))?;
            resolved[sc.component_index] = Some(table.clone());
        }
    }
    resolved
        .into_iter()
        .enumerate()
        .map(|(i, t)| t.ok_or_else(|| DecodeErrors::Format(format!("component {i} is never referenced by a scan"))))
        .collect()
}

fn dc_table_for<'a>(registry: &'a TableRegistry<HuffmanTable>, sc: &ScanComponent) -> Result<&'a HuffmanTable, DecodeErrors> {
    registry
        .get(sc.dc_table_selector as usize, sc.dc_iteration)
        .ok_or_else(|| DecodeErrors::Format("scan references an undefined DC Huffman table".to_string()))
}

fn ac_table_for<'a>(registry: &'a TableRegistry<HuffmanTable>, sc: &ScanComponent) -> Result<&'a HuffmanTable, DecodeErrors> {
    registry
        .get(sc.ac_table_selector as usize, sc.ac_iteration)
        .ok_or_else(|| DecodeErrors::Format("scan references an undefined AC Huffman table".to_string()))
}

#[allow(clippy::too_many_arguments)]
fn spawn_baseline_entropy<'scope>(
    scope: &'scope thread::Scope<'scope, '_>,
    frame: &'scope FrameHeader,
    scan: &'scope PendingScan,
    dc_registry: &'scope TableRegistry<HuffmanTable>,
    ac_registry: &'scope TableRegistry<HuffmanTable>,
    grid_w: usize,
    grid_h: usize,
    dequant_queue: Arc<Queue<Mcu>>,
    fatal: Arc<FatalSlot>,
) {
    scope.spawn(move || {
        let mut reader = BitReader::from_bytes(scan.data.clone());
        let mut prev_dc = vec![0i32; frame.components.len()];
        let mut mcus_since_restart = 0u16;

        for mcu_index in 0..(grid_w * grid_h) {
            if scan.restart_interval > 0 && mcus_since_restart == scan.restart_interval {
                reader.align_to_byte();
                prev_dc.iter_mut().for_each(|p| *p = 0);
                mcus_since_restart = 0;
            }

            let mut mcu = Mcu {
                index: mcu_index,
                blocks: frame.components.iter().map(|c| vec![[0i32; 64]; (c.h_samp as usize) * (c.v_samp as usize)]).collect(),
            };

            let outcome: Result<(), DecodeErrors> = (|| {
                for sc in &scan.header.components {
                    let dc_table = dc_table_for(dc_registry, sc)?;
                    let ac_table = ac_table_for(ac_registry, sc)?;
                    for block in mcu.blocks[sc.component_index].iter_mut() {
                        *block = entropy::decode_block_baseline(&mut reader, dc_table, ac_table, &mut prev_dc[sc.component_index])?;
                    }
                }
                Ok(())
            })();

            if let Err(e) = outcome {
                fatal.set(format!("baseline entropy decode: {e}"));
                break;
            }

            mcus_since_restart += 1;
            dequant_queue.push(mcu);
        }
        dequant_queue.close();
    });
}

#[allow(clippy::too_many_arguments)]
fn spawn_progressive_entropy<'scope>(
    scope: &'scope thread::Scope<'scope, '_>,
    frame: &'scope FrameHeader,
    scans: &'scope [PendingScan],
    dc_registry: &'scope TableRegistry<HuffmanTable>,
    ac_registry: &'scope TableRegistry<HuffmanTable>,
    mcus: Arc<Vec<Mutex<Mcu>>>,
    mcu_count: usize,
    dequant_queue: Arc<Queue<Mcu>>,
    fatal: Arc<FatalSlot>,
) {
    let fences = Arc::new(FenceVector::new(scans.len(), mcu_count as i64));

    for (scan_index, scan) in scans.iter().enumerate() {
        let fences = Arc::clone(&fences);
        let dequant_queue = Arc::clone(&dequant_queue);
        let mcus = Arc::clone(&mcus);
        let fatal = Arc::clone(&fatal);
        let is_last = scan_index == scans.len() - 1;

        scope.spawn(move || {
            run_progressive_scan(scan_index, scan, frame, dc_registry, ac_registry, &mcus, mcu_count, &fences, is_last, &dequant_queue, &fatal);
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn run_progressive_scan(
    scan_index: usize,
    scan: &PendingScan,
    frame: &FrameHeader,
    dc_registry: &TableRegistry<HuffmanTable>,
    ac_registry: &TableRegistry<HuffmanTable>,
    mcus: &Arc<Vec<Mutex<Mcu>>>,
    mcu_count: usize,
    fences: &Arc<FenceVector>,
    is_last: bool,
    dequant_queue: &Arc<Queue<Mcu>>,
    fatal: &Arc<FatalSlot>,
) {
    let header = &scan.header;
    let mut reader = BitReader::from_bytes(scan.data.clone());

    let outcome: Result<(), DecodeErrors> = (|| {
        if header.is_dc_scan() {
            let mut prev_dc = vec![0i32; frame.components.len()];
            let mut units_since_restart = 0u16;

            for mcu_index in 0..mcu_count {
                if fatal.is_set() {
                    return Ok(());
                }
                if scan.restart_interval > 0 && units_since_restart == scan.restart_interval {
                    reader.align_to_byte();
                    prev_dc.iter_mut().for_each(|p| *p = 0);
                    units_since_restart = 0;
                }
                fences.wait_for_predecessor(scan_index, mcu_index as i64 - 1);

                {
                    let mut guard = mcus[mcu_index].lock().unwrap();
                    for sc in &header.components {
                        let dc_table = dc_table_for(dc_registry, sc)?;
                        for block in guard.blocks[sc.component_index].iter_mut() {
                            if header.is_first_scan() {
                                block[0] = entropy::decode_dc_first(&mut reader, dc_table, &mut prev_dc[sc.component_index], header.al)?;
                            } else {
                                block[0] |= entropy::decode_dc_refine(&mut reader, header.al);
                            }
                        }
                    }
                    if is_last {
                        dequant_queue.push(Mcu {
                            index: guard.index,
                            blocks: guard.blocks.clone(),
                        });
                    }
                }

                units_since_restart += 1;
                fences.advance(scan_index, mcu_index as i64);
            }
        } else {
            let sc = &header.components[0];
            let ac_table = ac_table_for(ac_registry, sc)?;
            let blocks_per_mcu = (frame.components[sc.component_index].h_samp as usize) * (frame.components[sc.component_index].v_samp as usize);
            let mut eobrun = 0u32;
            let mut units_since_restart = 0u16;

            for mcu_index in 0..mcu_count {
                if fatal.is_set() {
                    return Ok(());
                }
                fences.wait_for_predecessor(scan_index, mcu_index as i64 - 1);

                {
                    let mut guard = mcus[mcu_index].lock().unwrap();
                    for sub in 0..blocks_per_mcu {
                        if scan.restart_interval > 0 && units_since_restart == scan.restart_interval {
                            reader.align_to_byte();
                            eobrun = 0;
                            units_since_restart = 0;
                        }
                        let block = &mut guard.blocks[sc.component_index][sub];
                        if header.is_first_scan() {
                            entropy::decode_ac_first(&mut reader, ac_table, header.spectral_start, header.spectral_end, header.al, &mut eobrun, block)?;
                        } else {
                            entropy::decode_ac_refine(&mut reader, ac_table, header.spectral_start, header.spectral_end, header.al, &mut eobrun, block)?;
                        }
                        units_since_restart += 1;
                    }
                    if is_last {
                        dequant_queue.push(Mcu {
                            index: guard.index,
                            blocks: guard.blocks.clone(),
                        });
                    }
                }

                fences.advance(scan_index, mcu_index as i64);
            }
        }
        Ok(())
    })();

    if let Err(e) = outcome {
        fatal.set(format!("progressive scan {scan_index}: {e}"));
    }
    if is_last {
        dequant_queue.close();
    }
}

fn spawn_dequant_worker<'scope>(scope: &'scope thread::Scope<'scope, '_>, input: Arc<Queue<Mcu>>, output: Arc<Queue<FBlockMcu>>, quant_tables: Vec<QuantizationTable>, fatal: Arc<FatalSlot>) {
    scope.spawn(move || {
        while let Some(mcu) = input.pop() {
            if fatal.is_set() {
                continue;
            }
            let blocks = mcu
                .blocks
                .iter()
                .enumerate()
                .map(|(ci, comp_blocks)| comp_blocks.iter().map(|block| dequantize(block, &quant_tables[ci])).collect())
                .collect();
            output.push(FBlockMcu { index: mcu.index, blocks });
        }
        output.close();
    });
}

fn dequantize(block: &Block, table: &QuantizationTable) -> [f32; 64] {
    let mut out = [0f32; 64];
    for i in 0..64 {
        out[i] = (block[i] * table.values[i] as i32) as f32;
    }
    out
}

/// IDCT is the pipeline's CPU-heavy stage, so it runs on `num_cpus::get()`
/// workers draining the same queue rather than a single one; the last
/// worker to see its input drained closes the downstream queue, since
/// closing early (while a sibling still holds an in-flight MCU) would let
/// the colour stage give up before that MCU's push ever lands.
fn spawn_idct_worker<'scope>(scope: &'scope thread::Scope<'scope, '_>, input: Arc<Queue<FBlockMcu>>, output: Arc<Queue<FBlockMcu>>) {
    let worker_count = num_cpus::get().max(1);
    let remaining = Arc::new(std::sync::atomic::AtomicUsize::new(worker_count));

    for _ in 0..worker_count {
        let input = Arc::clone(&input);
        let output = Arc::clone(&output);
        let remaining = Arc::clone(&remaining);

        scope.spawn(move || {
            while let Some(mut mcu) = input.pop() {
                for comp_blocks in mcu.blocks.iter_mut() {
                    for block in comp_blocks.iter_mut() {
                        inverse_dct(block);
                    }
                }
                output.push(mcu);
            }
            if remaining.fetch_sub(1, std::sync::atomic::Ordering::AcqRel) == 1 {
                output.close();
            }
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_color_worker<'scope>(
    scope: &'scope thread::Scope<'scope, '_>,
    input: Arc<Queue<FBlockMcu>>,
    output: Arc<Mutex<Vec<u8>>>,
    frame: &'scope FrameHeader,
    width: usize,
    height: usize,
    grid_w: usize,
    options: &'scope DecoderOptions,
) {
    let mcu_px_w = frame.mcu_px_w();
    let mcu_px_h = frame.mcu_px_h();
    let single_component = frame.components.len() == 1;
    let grayscale_passthrough = single_component && options.output_color_space == ColorSpaceOutput::Grayscale;

    scope.spawn(move || {
        while let Some(mcu) = input.pop() {
            let mcu_x = mcu.index % grid_w;
            let mcu_y = mcu.index / grid_w;
            let origin_x = mcu_x * mcu_px_w;
            let origin_y = mcu_y * mcu_px_h;

            let mut out = output.lock().unwrap();
            for py in 0..mcu_px_h {
                let y = origin_y + py;
                if y >= height {
                    continue;
                }
                for px in 0..mcu_px_w {
                    let x = origin_x + px;
                    if x >= width {
                        continue;
                    }

                    let y_sample = sample_component(&mcu.blocks[0], &frame.components[0], px, py, mcu_px_w, mcu_px_h) + 128.0;
                    let (r, g, b) = if single_component {
                        let v = crate::misc::clamp_u8(y_sample);
                        (v, v, v)
                    } else {
                        let cb = sample_component(&mcu.blocks[1], &frame.components[1], px, py, mcu_px_w, mcu_px_h) + 128.0;
                        let cr = sample_component(&mcu.blocks[2], &frame.components[2], px, py, mcu_px_w, mcu_px_h) + 128.0;
                        ycbcr_to_rgb(y_sample, cb, cr)
                    };

                    let offset = 3 * (y * width + x);
                    if grayscale_passthrough {
                        out[offset] = r;
                        out[offset + 1] = r;
                        out[offset + 2] = r;
                    } else {
                        out[offset] = r;
                        out[offset + 1] = g;
                        out[offset + 2] = b;
                    }
                }
            }
        }
    });
}

/// Nearest-neighbour sample of a (possibly subsampled) component's value
/// at pixel `(px, py)` within an MCU.
fn sample_component(blocks: &[[f32; 64]], component: &Component, px: usize, py: usize, mcu_px_w: usize, mcu_px_h: usize) -> f32 {
    let h = component.h_samp as usize;
    let comp_x = px * h * 8 / mcu_px_w.max(1);
    let comp_y = py * (component.v_samp as usize) * 8 / mcu_px_h.max(1);

    let block_col = comp_x / 8;
    let block_row = comp_y / 8;
    let block_index = block_row * h + block_col;
    let inner_x = comp_x % 8;
    let inner_y = comp_y % 8;
    blocks[block_index.min(blocks.len() - 1)][inner_y * 8 + inner_x]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_jpeg_bytes;
    use crate::image::EncoderOptions;

    #[test]
    fn rejects_a_frame_with_more_scans_than_max_scans_allows() {
        let image = Image {
            width: 8,
            height: 8,
            data: vec![128u8; 3 * 8 * 8],
        };
        let bytes = encode_jpeg_bytes(&image, &EncoderOptions::new()).unwrap();

        // This baseline file has exactly one scan, so a limit of zero must
        // reject it before the pipeline ever spawns a decode thread.
        let options = DecoderOptions::new().with_max_scans(0);
        let err = decode_jpeg_bytes(&bytes, &options).unwrap_err();
        assert!(matches!(err, DecodeErrors::Format(_)));

        let options = DecoderOptions::new().with_max_scans(1);
        assert!(decode_jpeg_bytes(&bytes, &options).is_ok());
    }
}
