//! 트레이딩 심볼 정의.
//!
//! 거래 가능한 페어를 나타내는 `Symbol` 타입을 정의합니다.
//! 예: BTC/USDT, ETH/USDT.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 기준 자산과 호가 자산으로 구성된 트레이딩 심볼.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// 기준 자산 (예: BTC)
    pub base: String,
    /// 호가 자산 (예: USDT)
    pub quote: String,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// USDT 호가 암호화폐 심볼을 생성합니다.
    pub fn crypto(base: impl Into<String>) -> Self {
        Self::new(base, "USDT")
    }

    /// 문자열에서 심볼을 파싱합니다.
    ///
    /// 호가 자산이 생략된 경우 USDT 페어로 정규화합니다
    /// (예: "BTC" -> BTC/USDT).
    pub fn parse(s: &str) -> Self {
        match s.split_once('/') {
            Some((base, quote)) => Self::new(base, quote),
            None => Self::crypto(s),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
