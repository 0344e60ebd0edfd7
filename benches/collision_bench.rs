use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tpsblocks::collision::{find_identical_blocks, find_identical_blocks_bucketed};
use tpsblocks::pattern::FILLER_WORD;
use tpsblocks::{load_file, Block, BLOCK_SIZE};

/// 4096 blocks, every fourth one filler.
fn sample_file() -> Vec<Block> {
    let mut data = Vec::with_capacity(4096 * BLOCK_SIZE);
    for i in 0..4096u32 {
        for w in 0..16u32 {
            let word = if i % 4 == 0 { FILLER_WORD } else { i.wrapping_mul(0x9E37_79B9) ^ w };
            data.extend_from_slice(&word.to_le_bytes());
        }
    }
    load_file(&data, true).unwrap()
}

fn bench_grouping(c: &mut Criterion) {
    let blocks = sample_file();

    c.bench_function("find_identical_scan_4096", |b| b.iter(|| find_identical_blocks(black_box(&blocks))));
    c.bench_function("find_identical_bucketed_4096", |b| b.iter(|| find_identical_blocks_bucketed(black_box(&blocks))));
}

fn bench_segment(c: &mut Criterion) {
    let data = vec![0xB0u8; 1024 * 1024];

    c.bench_function("load_file_1mb", |b| b.iter(|| load_file(black_box(&data), true)));
}

criterion_group!(benches, bench_grouping, bench_segment);
criterion_main!(benches);
