//! Pricing request and response schemas

use serde::{Deserialize, Serialize};

use super::PricingError;

/// Minimum number of lattice or grid steps.
pub const MIN_GRID_STEPS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    #[default]
    Analytic,
    Mc,
    Binomial,
    Trinomial,
    Pde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmericanEngineType {
    #[default]
    Binomial,
    Trinomial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsianAverageType {
    #[default]
    Arithmetic,
    Geometric,
}

fn default_paths() -> u64 {
    200_000
}

fn default_seed() -> u64 {
    1
}

fn default_steps() -> u32 {
    100
}

fn default_notional() -> f64 {
    1.0
}

fn default_coupon_frequency() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanillaRequest {
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub dividend: f64,
    pub vol: f64,
    pub is_call: bool,
    #[serde(default)]
    pub is_american: bool,
    #[serde(default)]
    pub engine: EngineType,
    #[serde(default = "default_paths")]
    pub n_paths: u64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub mc_epsilon: f64,
    #[serde(default = "default_steps")]
    pub tree_steps: u32,
    #[serde(default = "default_steps")]
    pub pde_space_steps: u32,
    #[serde(default = "default_steps")]
    pub pde_time_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmericanVanillaRequest {
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub dividend: f64,
    pub vol: f64,
    pub is_call: bool,
    #[serde(default)]
    pub engine: AmericanEngineType,
    #[serde(default = "default_steps")]
    pub tree_steps: u32,
    #[serde(default = "default_steps")]
    pub pde_space_steps: u32,
    #[serde(default = "default_steps")]
    pub pde_time_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsianRequest {
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub dividend: f64,
    pub vol: f64,
    pub is_call: bool,
    #[serde(default)]
    pub average_type: AsianAverageType,
    #[serde(default)]
    pub engine: EngineType,
    #[serde(default = "default_paths")]
    pub n_paths: u64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub mc_epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureRequest {
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub dividend: f64,
    #[serde(default = "default_notional")]
    pub notional: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCouponBondRequest {
    pub maturity: f64,
    pub rate: f64,
    #[serde(default = "default_notional")]
    pub notional: f64,
    #[serde(default)]
    pub discount_times: Vec<f64>,
    #[serde(default)]
    pub discount_factors: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedRateBondRequest {
    pub maturity: f64,
    pub rate: f64,
    pub coupon_rate: f64,
    #[serde(default = "default_coupon_frequency")]
    pub coupon_frequency: u32,
    #[serde(default = "default_notional")]
    pub notional: f64,
    #[serde(default)]
    pub discount_times: Vec<f64>,
    #[serde(default)]
    pub discount_factors: Vec<f64>,
}

/// Sensitivities reported by the engine; absent when not computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Greeks {
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub vega: Option<f64>,
    pub theta: Option<f64>,
    pub rho: Option<f64>,
    pub delta_std_error: Option<f64>,
    pub gamma_std_error: Option<f64>,
    pub vega_std_error: Option<f64>,
    pub theta_std_error: Option<f64>,
    pub rho_std_error: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResponse {
    pub npv: f64,
    #[serde(default)]
    pub greeks: Greeks,
    #[serde(default)]
    pub diagnostics: String,
    #[serde(default)]
    pub mc_std_error: f64,
}

/// Any priceable instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PricingRequest {
    Vanilla(VanillaRequest),
    AmericanVanilla(AmericanVanillaRequest),
    Asian(AsianRequest),
    Future(FutureRequest),
    ZeroCouponBond(ZeroCouponBondRequest),
    FixedRateBond(FixedRateBondRequest),
}

fn positive(field: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::Invalid(format!("{field} must be greater than 0")))
    }
}

fn finite(field: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PricingError::Invalid(format!("{field} must be a finite number")))
    }
}

fn min_steps(field: &str, value: u32) -> Result<(), PricingError> {
    if value >= MIN_GRID_STEPS {
        Ok(())
    } else {
        Err(PricingError::Invalid(format!(
            "{field} must be at least {MIN_GRID_STEPS}"
        )))
    }
}

fn market(spot: f64, strike: f64, maturity: f64, rate: f64, dividend: f64) -> Result<(), PricingError> {
    positive("spot", spot)?;
    positive("strike", strike)?;
    positive("maturity", maturity)?;
    finite("rate", rate)?;
    finite("dividend", dividend)
}

fn discounting(times: &[f64], factors: &[f64]) -> Result<(), PricingError> {
    if times.len() != factors.len() {
        return Err(PricingError::Invalid(format!(
            "discount_times and discount_factors must have the same length: got {} and {}",
            times.len(),
            factors.len()
        )));
    }
    Ok(())
}

impl PricingRequest {
    /// Engine endpoint path for this instrument
    pub fn path(&self) -> &'static str {
        match self {
            PricingRequest::Vanilla(_) => "/price/option/vanilla",
            PricingRequest::AmericanVanilla(_) => "/price/option/american-vanilla",
            PricingRequest::Asian(_) => "/price/option/asian",
            PricingRequest::Future(_) => "/price/future",
            PricingRequest::ZeroCouponBond(_) => "/price/bond/zero-coupon",
            PricingRequest::FixedRateBond(_) => "/price/bond/fixed-rate",
        }
    }

    /// Operation name used in log events
    pub fn operation(&self) -> &'static str {
        match self {
            PricingRequest::Vanilla(_) => "price_vanilla",
            PricingRequest::AmericanVanilla(_) => "price_american_vanilla",
            PricingRequest::Asian(_) => "price_asian",
            PricingRequest::Future(_) => "price_future",
            PricingRequest::ZeroCouponBond(_) => "price_zero_coupon_bond",
            PricingRequest::FixedRateBond(_) => "price_fixed_rate_bond",
        }
    }

    /// Check field constraints before the request reaches an engine.
    pub fn validate(&self) -> Result<(), PricingError> {
        match self {
            PricingRequest::Vanilla(r) => {
                market(r.spot, r.strike, r.maturity, r.rate, r.dividend)?;
                positive("vol", r.vol)?;
                finite("mc_epsilon", r.mc_epsilon)?;
                min_steps("tree_steps", r.tree_steps)?;
                min_steps("pde_space_steps", r.pde_space_steps)?;
                min_steps("pde_time_steps", r.pde_time_steps)
            }
            PricingRequest::AmericanVanilla(r) => {
                market(r.spot, r.strike, r.maturity, r.rate, r.dividend)?;
                positive("vol", r.vol)?;
                min_steps("tree_steps", r.tree_steps)?;
                min_steps("pde_space_steps", r.pde_space_steps)?;
                min_steps("pde_time_steps", r.pde_time_steps)
            }
            PricingRequest::Asian(r) => {
                market(r.spot, r.strike, r.maturity, r.rate, r.dividend)?;
                positive("vol", r.vol)?;
                finite("mc_epsilon", r.mc_epsilon)
            }
            PricingRequest::Future(r) => {
                market(r.spot, r.strike, r.maturity, r.rate, r.dividend)?;
                finite("notional", r.notional)
            }
            PricingRequest::ZeroCouponBond(r) => {
                positive("maturity", r.maturity)?;
                finite("rate", r.rate)?;
                finite("notional", r.notional)?;
                discounting(&r.discount_times, &r.discount_factors)
            }
            PricingRequest::FixedRateBond(r) => {
                positive("maturity", r.maturity)?;
                finite("rate", r.rate)?;
                if !r.coupon_rate.is_finite() || r.coupon_rate < 0.0 {
                    return Err(PricingError::Invalid(
                        "coupon_rate must be greater than or equal to 0".to_string(),
                    ));
                }
                if r.coupon_frequency < 1 {
                    return Err(PricingError::Invalid(
                        "coupon_frequency must be at least 1".to_string(),
                    ));
                }
                finite("notional", r.notional)?;
                discounting(&r.discount_times, &r.discount_factors)
            }
        }
    }
}
