//! 変更検出用シグネチャ
//!
//! 暗号学的ハッシュではない。順序依存の累積値で、ハイライトの
//! ダーティ判定・キャッシュキーとして使う。

const SEED: u64 = 5381;

#[inline]
fn mix(hash: u64, value: u64) -> u64 {
    (hash << 5).wrapping_add(hash).wrapping_add(value)
}

fn mix_line(mut hash: u64, line: &str) -> u64 {
    for ch in line.chars() {
        hash = mix(hash, ch as u64);
    }
    mix(hash, '\n' as u64)
}

/// 行集合のシグネチャを計算
///
/// `large_threshold` 行を超える場合は先頭・中央・末尾を `sample` 行ずつ
/// 抽出し、総行数を加えた値を返す。
pub fn content_signature(lines: &[String], large_threshold: usize, sample: usize) -> u64 {
    if lines.len() > large_threshold {
        return sampled_signature(lines, sample);
    }

    lines.iter().fold(SEED, |hash, line| mix_line(hash, line))
}

fn sampled_signature(lines: &[String], sample: usize) -> u64 {
    let total = lines.len();
    let mut hash = SEED;

    let head_end = sample.min(total);
    for line in &lines[..head_end] {
        hash = mix_line(hash, line);
    }

    let mid_start = sample.max((total / 2).saturating_sub(sample / 2)).min(total);
    let mid_end = (mid_start + sample).min(total);
    for line in &lines[mid_start..mid_end] {
        hash = mix_line(hash, line);
    }

    let tail_start = mid_end.max(total.saturating_sub(sample));
    for line in &lines[tail_start..] {
        hash = mix_line(hash, line);
    }

    mix(hash, total as u64)
}
