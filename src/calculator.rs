//! Pricing calculator.
//!
//! `quote` is the pure engine: numbers in, breakdown out. `Calculator` keeps
//! the raw text the merchant typed and recomputes the breakdown on every
//! change, so the breakdown always matches the inputs.

use serde::{Deserialize, Serialize};

use crate::config::CalculatorConfig;

/// Numeric inputs to the engine, already parsed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricingInputs {
    pub base_cost: f64,
    pub delivery_cost: f64,
    pub tax_rate_percent: f64,
    pub profit_margin_percent: f64,
    pub reinvestment_rate_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PriceBreakdown {
    pub final_price: f64,
    pub tax_amount: f64,
    /// Direct cost (base + delivery). Reported as-is, never floored.
    pub total_cost: f64,
    pub net_profit: f64,
    pub reinvestment_amount: f64,
    pub owner_take_home: f64,
}

fn floor_zero(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Derive the customer price and profit split. Total for every input.
pub fn quote(inputs: &PricingInputs) -> PriceBreakdown {
    let direct_cost = inputs.base_cost + inputs.delivery_cost;
    let profit_amount = direct_cost * (inputs.profit_margin_percent / 100.0);
    let price_before_tax = direct_cost + profit_amount;
    let tax_amount = price_before_tax * (inputs.tax_rate_percent / 100.0);
    let final_price = price_before_tax + tax_amount;
    // Goes through final_price; not interchangeable with profit_amount bit for bit.
    let net_profit = final_price - direct_cost - tax_amount;
    let reinvestment_amount = net_profit * (inputs.reinvestment_rate_percent / 100.0);
    let owner_take_home = net_profit - reinvestment_amount;

    PriceBreakdown {
        final_price: floor_zero(final_price),
        tax_amount: floor_zero(tax_amount),
        total_cost: direct_cost,
        net_profit: floor_zero(net_profit),
        reinvestment_amount: floor_zero(reinvestment_amount),
        owner_take_home: floor_zero(owner_take_home),
    }
}

/// Parse form text as a decimal, falling back to 0.
///
/// Reads the longest leading decimal (sign, digits, fraction, exponent), so
/// `"12abc"` is 12 and `"abc"` is 0. An exponent without digits is left off.
/// Overflow to infinity also gives 0.
pub fn parse_or_zero(text: &str) -> f64 {
    let text = text.trim();
    let bytes = text.as_bytes();
    let digits_from = |i: usize| bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Raw calculator form state, exactly as typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorInputs {
    pub product_name: String,
    pub base_cost: String,
    pub delivery_cost: String,
    pub tax_rate: String,
    pub profit_margin: String,
    pub reinvestment_rate: u8,
}

impl CalculatorInputs {
    pub fn from_config(config: &CalculatorConfig) -> Self {
        Self {
            product_name: String::new(),
            base_cost: String::new(),
            delivery_cost: String::new(),
            tax_rate: config.tax_rate.clone(),
            profit_margin: config.profit_margin.clone(),
            reinvestment_rate: config.reinvestment_rate.min(100),
        }
    }

    pub fn parse(&self) -> PricingInputs {
        PricingInputs {
            base_cost: parse_or_zero(&self.base_cost),
            delivery_cost: parse_or_zero(&self.delivery_cost),
            tax_rate_percent: parse_or_zero(&self.tax_rate),
            profit_margin_percent: parse_or_zero(&self.profit_margin),
            reinvestment_rate_percent: f64::from(self.reinvestment_rate.min(100)),
        }
    }
}

/// Partial form edit. Absent fields keep their current text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputUpdate {
    pub product_name: Option<String>,
    pub base_cost: Option<String>,
    pub delivery_cost: Option<String>,
    pub tax_rate: Option<String>,
    pub profit_margin: Option<String>,
    pub reinvestment_rate: Option<u32>,
}

/// Amounts formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayBreakdown {
    pub final_price: String,
    pub tax_amount: String,
    pub total_cost: String,
    pub net_profit: String,
    pub reinvestment_amount: String,
    pub owner_take_home: String,
}

pub fn format_amount(symbol: &str, amount: f64) -> String {
    format!("{} {:.2}", symbol, amount)
}

impl DisplayBreakdown {
    pub fn new(symbol: &str, b: &PriceBreakdown) -> Self {
        Self {
            final_price: format_amount(symbol, b.final_price),
            tax_amount: format_amount(symbol, b.tax_amount),
            total_cost: format_amount(symbol, b.total_cost),
            net_profit: format_amount(symbol, b.net_profit),
            reinvestment_amount: format_amount(symbol, b.reinvestment_amount),
            owner_take_home: format_amount(symbol, b.owner_take_home),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Calculator {
    inputs: CalculatorInputs,
    breakdown: PriceBreakdown,
}

impl Calculator {
    pub fn new(inputs: CalculatorInputs) -> Self {
        let breakdown = quote(&inputs.parse());
        Self { inputs, breakdown }
    }

    pub fn inputs(&self) -> &CalculatorInputs {
        &self.inputs
    }

    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    fn recompute(&mut self) {
        self.breakdown = quote(&self.inputs.parse());
        tracing::debug!(final_price = self.breakdown.final_price, "Recomputed quote");
    }

    pub fn set_product_name(&mut self, name: impl Into<String>) {
        self.inputs.product_name = name.into();
    }

    pub fn set_base_cost(&mut self, text: impl Into<String>) {
        self.inputs.base_cost = text.into();
        self.recompute();
    }

    pub fn set_delivery_cost(&mut self, text: impl Into<String>) {
        self.inputs.delivery_cost = text.into();
        self.recompute();
    }

    pub fn set_tax_rate(&mut self, text: impl Into<String>) {
        self.inputs.tax_rate = text.into();
        self.recompute();
    }

    pub fn set_profit_margin(&mut self, text: impl Into<String>) {
        self.inputs.profit_margin = text.into();
        self.recompute();
    }

    /// Slider value, clamped to 0..=100.
    pub fn set_reinvestment_rate(&mut self, percent: u32) {
        self.inputs.reinvestment_rate = percent.min(100) as u8;
        self.recompute();
    }

    /// Apply each present field through its setter.
    pub fn apply(&mut self, update: InputUpdate) {
        if let Some(name) = update.product_name {
            self.set_product_name(name);
        }
        if let Some(text) = update.base_cost {
            self.set_base_cost(text);
        }
        if let Some(text) = update.delivery_cost {
            self.set_delivery_cost(text);
        }
        if let Some(text) = update.tax_rate {
            self.set_tax_rate(text);
        }
        if let Some(text) = update.profit_margin {
            self.set_profit_margin(text);
        }
        if let Some(percent) = update.reinvestment_rate {
            self.set_reinvestment_rate(percent);
        }
    }
}
