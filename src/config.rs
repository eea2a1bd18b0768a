//! 引擎配置
//!
//! 胜利条件、搜索参数和评估权重。由外部设置层提供（JSON），
//! 一次搜索期间不可变。

use crate::error::{EngineError, Result};
use crate::types::COUNTER_CAP;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub search: SearchConfig,
    pub weights: EvalWeights,
}

/// 胜利条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// 送回安全区多少座塔获胜，0 表示关闭
    pub safety_zone_count: u8,
    /// 金库中对方棋子达到多少获胜，0 表示关闭
    pub opponent_vault_threshold: u8,
    /// 塔的最大高度
    pub max_stack_size: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            safety_zone_count: 3,
            opponent_vault_threshold: 5,
            max_stack_size: 3,
        }
    }
}

/// 搜索参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 搜索深度（层）
    pub max_depth: u32,
    /// 时间限制（秒），0 表示不限
    pub timeout_seconds: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: 4,
            timeout_seconds: 10.0,
        }
    }
}

/// 评估权重（五组，相互独立）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub material: MaterialWeights,
    pub proximity: ProximityWeights,
    pub total_distance: TotalDistanceWeights,
    pub defensive: DefensiveWeights,
    pub accounted: AccountedWeights,
}

/// 场上塔数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialWeights {
    pub total: f64,
    pub opponent: f64,
}

impl Default for MaterialWeights {
    fn default() -> Self {
        MaterialWeights {
            total: 10.0,
            opponent: 1.0,
        }
    }
}

/// 折返塔距安全区的距离，`by_distance[d - 1]` 对应距离 d
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityWeights {
    pub total: f64,
    pub opponent: f64,
    pub by_distance: [f64; 5],
}

impl Default for ProximityWeights {
    fn default() -> Self {
        ProximityWeights {
            total: 1.0,
            opponent: 1.0,
            by_distance: [50.0, 30.0, 20.0, 12.0, 6.0],
        }
    }
}

/// 折返塔总距离很小时的"即将获胜"奖励
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalDistanceWeights {
    pub weight: f64,
    /// 总距离不超过该值时奖励
    pub threshold: u32,
}

impl Default for TotalDistanceWeights {
    fn default() -> Self {
        TotalDistanceWeights {
            weight: 40.0,
            threshold: 4,
        }
    }
}

/// 对方即将获胜时的防守系数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefensiveWeights {
    pub multiplier: f64,
}

impl Default for DefensiveWeights {
    fn default() -> Self {
        DefensiveWeights { multiplier: 1.5 }
    }
}

/// 金库中的对方棋子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountedWeights {
    pub total: f64,
}

impl Default for AccountedWeights {
    fn default() -> Self {
        AccountedWeights { total: 25.0 }
    }
}

impl Config {
    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(s: &str) -> Result<Config> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Config::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        if rules.max_stack_size == 0 {
            return Err(EngineError::Config("max_stack_size must be at least 1".into()));
        }
        if rules.safety_zone_count > COUNTER_CAP {
            return Err(EngineError::Config(format!(
                "safety_zone_count must be within 0..={}",
                COUNTER_CAP
            )));
        }
        if rules.opponent_vault_threshold > COUNTER_CAP {
            return Err(EngineError::Config(format!(
                "opponent_vault_threshold must be within 0..={}",
                COUNTER_CAP
            )));
        }
        if self.search.max_depth == 0 {
            return Err(EngineError::Config("max_depth must be at least 1".into()));
        }
        let timeout = self.search.timeout_seconds;
        if !timeout.is_finite() || timeout < 0.0 {
            return Err(EngineError::Config(format!(
                "timeout_seconds must be a non-negative number, got {}",
                timeout
            )));
        }
        Ok(())
    }
}
