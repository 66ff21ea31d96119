//! キャンセルと時間予算
//!
//! 検索とハイライトの両方が使う外部キャンセル信号。

use crate::error::HighlightError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 複製可能なキャンセル信号
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// 信号をリセットして再利用する
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// 期限計算が `Instant` の表現範囲を超えたときに使う上限
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// 1パス分の時間予算
#[derive(Debug, Clone)]
pub struct Budget {
    deadline: Instant,
    token: Option<CancelToken>,
}

impl Budget {
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: deadline_after(timeout),
            token: None,
        }
    }

    pub fn with_token(timeout: Duration, token: &CancelToken) -> Self {
        Self {
            deadline: deadline_after(timeout),
            token: Some(token.clone()),
        }
    }

    /// 実質無制限の予算（ベンチマーク・テスト用）
    pub fn unbounded() -> Self {
        Self::new(Duration::from_secs(3600))
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// キャンセルを優先し、次に期限を確認する
    pub fn check(&self) -> Result<(), HighlightError> {
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(HighlightError::Cancelled);
        }
        if Instant::now() >= self.deadline {
            return Err(HighlightError::Timeout);
        }
        Ok(())
    }
}
