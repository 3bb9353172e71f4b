use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::calculator::{
    Calculator, CalculatorInputs, DisplayBreakdown, InputUpdate, PriceBreakdown,
};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CalculatorView {
    pub inputs: CalculatorInputs,
    pub breakdown: PriceBreakdown,
    pub display: DisplayBreakdown,
}

impl CalculatorView {
    fn new(calc: &Calculator, currency_symbol: &str) -> Self {
        Self {
            inputs: calc.inputs().clone(),
            breakdown: *calc.breakdown(),
            display: DisplayBreakdown::new(currency_symbol, calc.breakdown()),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/calculator", get(show).patch(update))
        .route("/api/calculator/quote", post(quote))
}

async fn show(State(state): State<AppState>) -> Json<CalculatorView> {
    let calc = state.calculator.lock().await;
    Json(CalculatorView::new(
        &calc,
        &state.config.calculator.currency_symbol,
    ))
}

async fn update(
    State(state): State<AppState>,
    Json(update): Json<InputUpdate>,
) -> Json<CalculatorView> {
    let mut calc = state.calculator.lock().await;
    calc.apply(update);
    Json(CalculatorView::new(
        &calc,
        &state.config.calculator.currency_symbol,
    ))
}

/// One-off quote from the configured defaults plus the given fields. Leaves
/// the shared calculator untouched.
async fn quote(
    State(state): State<AppState>,
    Json(update): Json<InputUpdate>,
) -> Json<CalculatorView> {
    let config = &state.config.calculator;
    let mut calc = Calculator::new(CalculatorInputs::from_config(config));
    calc.apply(update);
    Json(CalculatorView::new(&calc, &config.currency_symbol))
}
