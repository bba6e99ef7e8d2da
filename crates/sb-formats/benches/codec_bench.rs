use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sb_formats::{sqr_to_wav, wav_to_sqr, Channel};

fn make_wav(channels: u16, bits: u16, pcm_data: &[u8]) -> Vec<u8> {
    let sample_rate = 44100u32;
    let block_align = channels * (bits / 8);
    let data_size = pcm_data.len() as u32;

    let mut buf = Vec::new();
    buf.extend(b"RIFF");
    buf.extend(&(36 + data_size).to_le_bytes());
    buf.extend(b"WAVEfmt ");
    buf.extend(&16u32.to_le_bytes());
    buf.extend(&1u16.to_le_bytes());
    buf.extend(&channels.to_le_bytes());
    buf.extend(&sample_rate.to_le_bytes());
    buf.extend(&(sample_rate * block_align as u32).to_le_bytes());
    buf.extend(&block_align.to_le_bytes());
    buf.extend(&bits.to_le_bytes());
    buf.extend(b"data");
    buf.extend(&data_size.to_le_bytes());
    buf.extend(pcm_data);
    buf
}

fn bench_codec(c: &mut Criterion) {
    // One second of 16-bit stereo
    let pcm: Vec<u8> = (0..44100 * 2)
        .flat_map(|i: i32| (((i * 37) % 65536 - 32768) as i16).to_le_bytes())
        .collect();
    let wav = make_wav(2, 16, &pcm);

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(wav.len() as u64));
    group.bench_function("wav_to_sqr_stereo16", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(8192);
            wav_to_sqr(&mut black_box(&wav[..]), &mut out, Channel::Left).unwrap();
            out
        })
    });

    let mut sqr = Vec::new();
    wav_to_sqr(&mut &wav[..], &mut sqr, Channel::Left).unwrap();
    group.bench_function("sqr_to_wav", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(44100 + 44);
            sqr_to_wav(&mut black_box(&sqr[..]), &mut out).unwrap();
            out
        })
    });
    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
