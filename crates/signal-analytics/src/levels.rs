//! 지지/저항 레벨 탐지.
//!
//! 피벗(국소 극값) 캔들을 인덱스 기반 대칭 윈도우 스캔으로 찾고,
//! 근접한 레벨을 클러스터링해 대표값으로 축약합니다. 레벨은 호출마다
//! 새로 계산되는 일시적 값입니다.

use rust_decimal::prelude::ToPrimitive;
use signal_core::Candle;

/// 한 방향당 유지하는 최대 레벨 수.
const MAX_LEVELS_PER_SIDE: usize = 5;

/// 탐지된 지지/저항 레벨.
///
/// 지지는 오름차순, 저항은 내림차순으로 정렬되어 있습니다.
#[derive(Debug, Clone, Default)]
pub struct SupportResistance {
    /// 지지 레벨 (오름차순)
    pub support: Vec<f64>,
    /// 저항 레벨 (내림차순)
    pub resistance: Vec<f64>,
}

/// 피벗 기반 레벨 탐지기.
#[derive(Debug, Clone)]
pub struct LevelDetector {
    /// 피벗 판정 대칭 윈도우 (±window 캔들)
    window: usize,
    /// 클러스터링 허용 오차 (%)
    cluster_tolerance_pct: f64,
}

impl LevelDetector {
    /// 새 레벨 탐지기를 생성합니다.
    pub fn new(window: usize, cluster_tolerance_pct: f64) -> Self {
        Self {
            window,
            cluster_tolerance_pct,
        }
    }

    /// 참조 구간에서 지지/저항 레벨을 탐지합니다.
    ///
    /// 캔들이 윈도우의 엄격한 최대 고가이면 저항 피벗, 엄격한 최소
    /// 저가이면 지지 피벗입니다. 동률은 피벗이 아닙니다.
    pub fn detect(&self, candles: &[Candle], lookback: usize) -> SupportResistance {
        let start = candles.len().saturating_sub(lookback);
        let slice = &candles[start..];

        let highs: Vec<f64> = slice
            .iter()
            .map(|c| c.high.to_f64().unwrap_or(0.0))
            .collect();
        let lows: Vec<f64> = slice
            .iter()
            .map(|c| c.low.to_f64().unwrap_or(0.0))
            .collect();

        let mut resistance = Vec::new();
        let mut support = Vec::new();

        if highs.len() <= self.window * 2 {
            return SupportResistance::default();
        }

        for i in self.window..highs.len() - self.window {
            let mut is_peak = true;
            let mut is_trough = true;
            for j in i - self.window..=i + self.window {
                if j == i {
                    continue;
                }
                if highs[j] >= highs[i] {
                    is_peak = false;
                }
                if lows[j] <= lows[i] {
                    is_trough = false;
                }
                if !is_peak && !is_trough {
                    break;
                }
            }

            if is_peak {
                resistance.push(highs[i]);
            }
            if is_trough {
                support.push(lows[i]);
            }
        }

        let mut resistance = self.cluster(resistance);
        let mut support = self.cluster(support);

        resistance.sort_by(|a, b| b.total_cmp(a));
        support.sort_by(f64::total_cmp);

        resistance.truncate(MAX_LEVELS_PER_SIDE);
        support.truncate(MAX_LEVELS_PER_SIDE);

        SupportResistance {
            support,
            resistance,
        }
    }

    /// 근접한 레벨을 클러스터 평균으로 축약합니다.
    ///
    /// 정렬된 레벨을 순회하며 진행 중인 클러스터 평균과의 차이가 허용
    /// 오차 이내이면 합치고, 아니면 새 클러스터를 시작합니다.
    fn cluster(&self, mut levels: Vec<f64>) -> Vec<f64> {
        if levels.is_empty() {
            return levels;
        }

        levels.sort_by(f64::total_cmp);

        let mut clustered = Vec::new();
        let mut current: Vec<f64> = vec![levels[0]];

        for &level in &levels[1..] {
            let avg = current.iter().sum::<f64>() / current.len() as f64;
            let tolerance = avg * (self.cluster_tolerance_pct / 100.0);

            if (level - avg).abs() <= tolerance {
                current.push(level);
            } else {
                clustered.push(avg);
                current = vec![level];
            }
        }

        clustered.push(current.iter().sum::<f64>() / current.len() as f64);
        clustered
    }
}

/// 가격 아래에서 가장 가까운 레벨을 찾습니다.
pub fn nearest_below(price: f64, levels: &[f64]) -> Option<f64> {
    levels
        .iter()
        .copied()
        .filter(|l| *l < price)
        .fold(None, |acc, l| match acc {
            Some(best) if best >= l => Some(best),
            _ => Some(l),
        })
}

/// 가격 위에서 가장 가까운 레벨을 찾습니다.
pub fn nearest_above(price: f64, levels: &[f64]) -> Option<f64> {
    levels
        .iter()
        .copied()
        .filter(|l| *l > price)
        .fold(None, |acc, l| match acc {
            Some(best) if best <= l => Some(best),
            _ => Some(l),
        })
}

/// 가격이 레벨 허용 오차 이내에 있는지 확인합니다.
pub fn is_near_level(price: f64, level: f64, tolerance_pct: f64) -> bool {
    let tolerance = level * (tolerance_pct / 100.0);
    (price - level).abs() <= tolerance
}
