//! The Action value object: one trading decision

use rust_decimal::Decimal;

use crate::common::errors::{Result, TraderError};
use crate::common::types::ActionType;
use crate::journal::ActionRecord;

/// One trading decision
///
/// Actions are immutable: every cycle builds a new one from the current
/// reference instead of mutating a stored one. Sizing returns a new value
/// through [`Action::with_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    action_type: ActionType,
    symbol: String,
    market: String,
    previous_price: Decimal,
    action_price: Decimal,
    quantity: Option<Decimal>,
    last_update: i64,
}

impl Action {
    /// Create an unsized action
    ///
    /// Fails with `InvalidAmount` unless both prices are strictly positive.
    pub fn new(
        action_type: ActionType,
        market: impl Into<String>,
        symbol: impl Into<String>,
        previous_price: Decimal,
        action_price: Decimal,
        last_update: i64,
    ) -> Result<Self> {
        if action_price <= Decimal::ZERO {
            return Err(TraderError::InvalidAmount(format!(
                "action price must be positive, got {}",
                action_price
            )));
        }
        if previous_price <= Decimal::ZERO {
            return Err(TraderError::InvalidAmount(format!(
                "previous price must be positive, got {}",
                previous_price
            )));
        }

        Ok(Self {
            action_type,
            symbol: symbol.into(),
            market: market.into(),
            previous_price,
            action_price,
            quantity: None,
            last_update,
        })
    }

    /// Reference action established at bootstrap: both prices equal the supplied price
    pub fn seed(
        action_type: ActionType,
        market: impl Into<String>,
        symbol: impl Into<String>,
        price: Decimal,
        quantity: Option<Decimal>,
        last_update: i64,
    ) -> Result<Self> {
        let action = Self::new(action_type, market, symbol, price, price, last_update)?;
        match quantity {
            Some(q) => action.with_quantity(q),
            None => Ok(action),
        }
    }

    /// Build the next action relative to a reference
    pub fn follow(
        reference: &Action,
        action_type: ActionType,
        action_price: Decimal,
        last_update: i64,
    ) -> Result<Self> {
        Self::new(
            action_type,
            reference.market.clone(),
            reference.symbol.clone(),
            reference.action_price,
            action_price,
            last_update,
        )
    }

    /// Return a sized copy of this action
    pub fn with_quantity(self, quantity: Decimal) -> Result<Self> {
        if quantity <= Decimal::ZERO {
            return Err(TraderError::InvalidAmount(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        Ok(Self {
            quantity: Some(quantity),
            ..self
        })
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn previous_price(&self) -> Decimal {
        self.previous_price
    }

    pub fn action_price(&self) -> Decimal {
        self.action_price
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    /// A position is open while the last trade was a buy
    pub fn is_holding(&self) -> bool {
        self.action_type == ActionType::Buy
    }

    /// Quantity available to sell when this action is the reference
    pub fn held_quantity(&self) -> Decimal {
        if self.is_holding() {
            self.quantity.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }

    /// Price move from the previous price, in percent, 4 decimal places
    pub fn change_percent(&self) -> Decimal {
        ((self.action_price - self.previous_price) / self.previous_price * Decimal::ONE_HUNDRED)
            .round_dp(4)
    }

    /// Project onto the persisted record format
    pub fn to_record(&self) -> ActionRecord {
        ActionRecord {
            action_type: self.action_type,
            symbol: self.symbol.clone(),
            market: self.market.clone(),
            previous_price: self.previous_price,
            action_price: self.action_price,
            quantity: self.quantity,
            last_update: self.last_update,
        }
    }
}

impl TryFrom<ActionRecord> for Action {
    type Error = TraderError;

    fn try_from(record: ActionRecord) -> Result<Self> {
        if !record.action_type.is_trade() {
            return Err(TraderError::MalformedRecord(format!(
                "idle action persisted for {}/{} at {}",
                record.market, record.symbol, record.last_update
            )));
        }

        let action = Action::new(
            record.action_type,
            record.market,
            record.symbol,
            record.previous_price,
            record.action_price,
            record.last_update,
        )
        .map_err(|e| TraderError::MalformedRecord(e.to_string()))?;

        match record.quantity {
            Some(q) => action
                .with_quantity(q)
                .map_err(|e| TraderError::MalformedRecord(e.to_string())),
            None => Ok(action),
        }
    }
}
