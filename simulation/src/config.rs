use std::fs;
use std::str::FromStr;

use fee_recycler::RecyclerConfig;
use fee_recycler_core::constants::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64, PIPS_DENOMINATOR, Q64};
use fee_recycler_core::{Address, Currency, PoolKey, SwapParams};
use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};

/// Scenario loaded from a TOML file
///
/// Amounts and prices are written as decimal strings; TOML integers stop at
/// 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// Scenario name for logging and the report
    pub name: String,

    /// Recycler deployment
    pub engine: EngineConfig,

    /// The pool traded on
    pub pool: PoolConfig,

    /// Fees deposited into the ledger before the first trade
    #[serde(default)]
    pub seed_fees: SeedFees,

    /// Accounts funded before the first trade
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Trades executed in order
    pub trades: Vec<TradeConfig>,
}

/// Recycler deployment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Address pools bind as their hook
    #[serde(with = "string_serde")]
    pub hook_address: Address,

    /// Required base currency, `native` or a token address
    #[serde(with = "string_serde")]
    pub base_currency: Currency,
}

/// Pool of the reference curve
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolConfig {
    #[serde(with = "string_serde")]
    pub secondary_currency: Currency,

    /// Swap fee of the curve in pips
    pub fee_pips: u32,

    pub tick_spacing: i32,

    /// Initial sqrt price (Q64.64)
    #[serde(with = "string_serde")]
    pub sqrt_price_x64: u128,

    #[serde(with = "string_serde")]
    pub liquidity: u128,

    /// Custody seeded for liquidity providers
    #[serde(with = "string_serde")]
    pub reserve0: u128,

    #[serde(with = "string_serde")]
    pub reserve1: u128,

    /// Whether the pool is registered with the recycler
    pub register: bool,
}

/// Ledger seed; the recycler is minted the matching tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeedFees {
    #[serde(with = "string_serde")]
    pub amount0: u128,

    #[serde(with = "string_serde")]
    pub amount1: u128,
}

/// Funded account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountConfig {
    #[serde(with = "string_serde")]
    pub address: Address,

    #[serde(with = "string_serde")]
    pub amount0: u128,

    #[serde(with = "string_serde")]
    pub amount1: u128,
}

/// One trade
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TradeConfig {
    #[serde(with = "string_serde")]
    pub trader: Address,

    /// Trader supplies the base currency
    pub zero_for_one: bool,

    /// `amount` is what the trader pays rather than what it receives
    pub exact_input: bool,

    #[serde(with = "string_serde")]
    pub amount: u128,

    /// Price limit; the widest limit in the trade's direction when absent
    #[serde(default, with = "optional_string_serde")]
    pub sqrt_price_limit_x64: Option<u128>,
}

impl ScenarioConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> SimulationResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimulationError::Io(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> SimulationResult<Self> {
        let config: ScenarioConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> SimulationResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            SimulationError::Io(format!("Failed to write config file {}: {}", path, e))
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SimulationResult<()> {
        if self.name.is_empty() {
            return Err(invalid("name", "empty", "non-empty string"));
        }
        if self.trades.is_empty() {
            return Err(invalid("trades", "empty", "at least one trade"));
        }
        if self.pool.secondary_currency == self.engine.base_currency {
            return Err(invalid(
                "secondary_currency",
                &self.pool.secondary_currency.to_string(),
                "different from base_currency",
            ));
        }
        self.pool.validate()?;
        for trade in &self.trades {
            trade.validate()?;
        }
        Ok(())
    }

    /// The reference curve settles with the trader after the hooks, so it
    /// closes every trade itself
    pub fn recycler_config(&self) -> RecyclerConfig {
        RecyclerConfig::new(self.engine.hook_address, self.engine.base_currency)
            .with_deferred_completion()
    }

    pub fn pool_key(&self) -> PoolKey {
        PoolKey::new(
            self.engine.base_currency,
            self.pool.secondary_currency,
            self.pool.fee_pips,
            self.pool.tick_spacing,
            self.engine.hook_address,
        )
    }
}

impl PoolConfig {
    fn validate(&self) -> SimulationResult<()> {
        if self.fee_pips >= PIPS_DENOMINATOR {
            return Err(invalid(
                "fee_pips",
                &self.fee_pips.to_string(),
                "below 1000000 (100%)",
            ));
        }
        if self.tick_spacing <= 0 {
            return Err(invalid(
                "tick_spacing",
                &self.tick_spacing.to_string(),
                "greater than 0",
            ));
        }
        if !(MIN_SQRT_PRICE_X64..MAX_SQRT_PRICE_X64).contains(&self.sqrt_price_x64) {
            return Err(invalid(
                "sqrt_price_x64",
                &self.sqrt_price_x64.to_string(),
                "within the sqrt price bounds",
            ));
        }
        if self.liquidity == 0 {
            return Err(invalid("liquidity", "0", "greater than 0"));
        }
        Ok(())
    }
}

impl TradeConfig {
    fn validate(&self) -> SimulationResult<()> {
        if self.amount == 0 || self.amount > i128::MAX as u128 {
            return Err(invalid(
                "amount",
                &self.amount.to_string(),
                "between 1 and i128::MAX",
            ));
        }
        Ok(())
    }

    pub fn to_params(&self) -> SwapParams {
        let limit = self.sqrt_price_limit_x64.unwrap_or(if self.zero_for_one {
            MIN_SQRT_PRICE_X64
        } else {
            MAX_SQRT_PRICE_X64
        });
        if self.exact_input {
            SwapParams::exact_input(self.zero_for_one, self.amount, limit)
        } else {
            SwapParams::exact_output(self.zero_for_one, self.amount, limit)
        }
    }
}

fn invalid(field: &str, value: &str, expected: &str) -> SimulationError {
    SimulationError::InvalidConfig(format!("{} is {}, expected {}", field, value, expected))
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            engine: EngineConfig::default(),
            pool: PoolConfig::default(),
            seed_fees: SeedFees::default(),
            accounts: vec![],
            trades: vec![],
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hook_address: Address::from_low_u8(0xee),
            base_currency: Currency::NATIVE,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            secondary_currency: Currency(Address::from_low_u8(0x51)),
            fee_pips: 3_000, // 0.3%
            tick_spacing: 60,
            sqrt_price_x64: Q64, // price 1
            liquidity: 1_000_000 * 10u128.pow(18),
            reserve0: 1_000_000 * 10u128.pow(18),
            reserve1: 1_000_000 * 10u128.pow(18),
            register: true,
        }
    }
}

/// Create example configuration file
pub fn create_example_config(path: &str) -> SimulationResult<()> {
    example_config().save(path)
}

/// Seeded secondary fees netted by a base-supplying trade, then a trade in
/// the other direction
pub fn example_config() -> ScenarioConfig {
    let one = 10u128.pow(18);
    let trader = Address::from_low_u8(0x77);
    ScenarioConfig {
        name: "netting".to_string(),
        engine: EngineConfig::default(),
        pool: PoolConfig::default(),
        seed_fees: SeedFees {
            amount0: 0,
            amount1: 5 * one,
        },
        accounts: vec![AccountConfig {
            address: trader,
            amount0: 100 * one,
            amount1: 100 * one,
        }],
        trades: vec![
            TradeConfig {
                trader,
                zero_for_one: true,
                exact_input: true,
                amount: one,
                sqrt_price_limit_x64: None,
            },
            TradeConfig {
                trader,
                zero_for_one: false,
                exact_input: true,
                amount: 2 * one,
                sqrt_price_limit_x64: None,
            },
        ],
    }
}

// Custom serde module for values with a string form
mod string_serde {
    use super::*;
    use serde::{Deserializer, Serializer};
    use std::fmt::Display;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        T::from_str(&s).map_err(serde::de::Error::custom)
    }
}

mod optional_string_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u128>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| u128::from_str(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
