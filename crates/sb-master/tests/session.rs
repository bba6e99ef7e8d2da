//! Controller-level conversion and dry-run playback.

use sb_master::{sqr_to_wav, wav_to_sqr, Channel, CycleWait, PlaybackSession, PlayerConfig, SessionError};

fn stereo8_wav(pcm: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(b"RIFF");
    buf.extend(&(36 + pcm.len() as u32).to_le_bytes());
    buf.extend(b"WAVEfmt ");
    buf.extend(&16u32.to_le_bytes());
    buf.extend(&1u16.to_le_bytes());
    buf.extend(&2u16.to_le_bytes());
    buf.extend(&11025u32.to_le_bytes());
    buf.extend(&(11025u32 * 2).to_le_bytes());
    buf.extend(&2u16.to_le_bytes());
    buf.extend(&8u16.to_le_bytes());
    buf.extend(b"data");
    buf.extend(&(pcm.len() as u32).to_le_bytes());
    buf.extend(pcm);
    buf
}

#[test]
fn converted_stream_plays_in_dry_run() {
    // Left: 1 0 1 0 1 0 1 0, right: all 1
    let pcm: Vec<u8> = (0..8).flat_map(|i| [if i % 2 == 0 { 0xFF } else { 0x00 }, 0xFF]).collect();
    let mut sqr = Vec::new();
    let stats = wav_to_sqr(&mut &stereo8_wav(&pcm)[..], &mut sqr, Channel::Left).unwrap();
    assert_eq!(stats.samples_out, 8);
    assert_eq!(&sqr[12..], &[0b1010_1010]);

    for wait in [CycleWait::StatusBit, CycleWait::CounterThreshold] {
        let config = PlayerConfig { wait, ..PlayerConfig::default() };
        let session = PlaybackSession::dry_run(config);
        let played = session.play(&sqr[..]).unwrap();
        assert_eq!(played.bytes_played, 1);
        assert!(!played.truncated());
    }
}

#[test]
fn right_channel_selects_second_sample() {
    let pcm: Vec<u8> = (0..8).flat_map(|_| [0x00, 0xFF]).collect();
    let mut sqr = Vec::new();
    wav_to_sqr(&mut &stereo8_wav(&pcm)[..], &mut sqr, Channel::Right).unwrap();
    assert_eq!(&sqr[12..], &[0xFF]);
}

#[test]
fn wav_fed_to_sqr_decoder_is_rejected() {
    let wav = stereo8_wav(&[0; 4]);
    let mut out = Vec::new();
    let err = sqr_to_wav(&mut &wav[..], &mut out).unwrap_err();
    assert!(matches!(err, SessionError::Format(_)));
    assert!(out.is_empty());
}

#[test]
fn truncated_stream_reports_short_playback() {
    let mut sqr = Vec::new();
    sqr.extend(b"SQR\0");
    sqr.extend(&8000u32.to_le_bytes());
    sqr.extend(&5u32.to_le_bytes());
    sqr.extend(&[0xFF, 0x00]);

    let session = PlaybackSession::dry_run(PlayerConfig::default());
    let stats = session.play(&sqr[..]).unwrap();
    assert_eq!(stats.bytes_played, 2);
    assert_eq!(stats.declared_bytes, 5);
    assert!(stats.truncated());
}
