//! Checkout query contract shared by the checkout, pay-intent and create-plan
//! screens.
//!
//! Values arrive as loosely typed query strings. Parsing never fails: missing,
//! unparsable or negative input falls back to fixed defaults.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::coverage::pay_intent_estimate;
use crate::core::types::Frequency;

pub const DEFAULT_MERCHANT: &str = "Netflix";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_BASE_AMOUNT: i64 = 19;
pub const DEFAULT_ADDON: i64 = 2;
/// APR assumed by the estimate when no strategy is seeded.
pub const FALLBACK_APR: Decimal = Decimal::from_parts(48, 0, 0, false, 1);

/// Raw query parameters, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutQuery {
    pub merchant: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub freq: Option<String>,
    pub addon: Option<String>,
}

/// Resolved checkout intent with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutIntent {
    pub merchant: String,
    pub base_amount_usd: Decimal,
    pub currency: String,
    pub frequency: Frequency,
}

/// Pay-intent screen summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayIntentQuote {
    pub merchant: String,
    pub base_amount_usd: Decimal,
    pub addon_usd: Decimal,
    pub total_usd: Decimal,
    pub currency: String,
    pub frequency: Frequency,
    pub estimated_coverage_pct: u8,
}

impl CheckoutQuery {
    /// Apply defaults to every missing or malformed parameter.
    pub fn resolve(&self) -> CheckoutIntent {
        CheckoutIntent {
            merchant: non_empty(self.merchant.as_deref()).unwrap_or(DEFAULT_MERCHANT).to_string(),
            base_amount_usd: parse_amount_or(
                self.amount.as_deref(),
                Decimal::from(DEFAULT_BASE_AMOUNT),
            ),
            currency: non_empty(self.currency.as_deref())
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            frequency: self
                .freq
                .as_deref()
                .and_then(Frequency::parse)
                .unwrap_or(Frequency::Monthly),
        }
    }

    /// Add-on chosen on the pay-intent screen.
    ///
    /// Missing means the default $2; present but unparsable means 0, matching
    /// how a cleared input field reads.
    pub fn addon(&self) -> Decimal {
        match self.addon.as_deref() {
            None => Decimal::from(DEFAULT_ADDON),
            Some(raw) => parse_amount_or(Some(raw), Decimal::ZERO),
        }
    }

    /// Build the pay-intent quote using `apr` for the coverage estimate.
    pub fn quote(&self, apr: Option<Decimal>) -> PayIntentQuote {
        let intent = self.resolve();
        let addon = self.addon();
        let apr = apr.unwrap_or(FALLBACK_APR);
        PayIntentQuote {
            estimated_coverage_pct: pay_intent_estimate(addon, apr, intent.base_amount_usd),
            total_usd: intent.base_amount_usd.saturating_add(addon),
            addon_usd: addon,
            merchant: intent.merchant,
            base_amount_usd: intent.base_amount_usd,
            currency: intent.currency,
            frequency: intent.frequency,
        }
    }
}

/// Parse a non-negative decimal amount, falling back to `default`.
pub fn parse_amount_or(raw: Option<&str>, default: Decimal) -> Decimal {
    raw.map(str::trim)
        .and_then(|value| Decimal::from_str(value).ok())
        .filter(|value| !value.is_sign_negative())
        .unwrap_or(default)
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}
