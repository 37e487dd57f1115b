//! Startup: establish the reference action the loop trades against

use rust_decimal::Decimal;
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use tracing::info;

use super::action::Action;
use crate::common::errors::{Result, TraderError};
use crate::common::types::ActionType;
use crate::journal::{ActionLog, LogQuery};

/// Last known position supplied by an operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReference {
    pub action_type: ActionType,
    /// `None` when the operator gave no price
    pub price: Option<Decimal>,
    /// Amount held after a buy, if known
    pub quantity: Option<Decimal>,
}

/// Source of a seed reference when the journal holds nothing
pub trait ReferenceResolver: Send {
    fn resolve(&mut self, market: &str, symbol: &str) -> Result<SeedReference>;
}

/// Resolver answering with a pre-set seed (CLI flags, tests)
#[derive(Debug, Clone)]
pub struct FixedResolver {
    seed: SeedReference,
}

impl FixedResolver {
    pub fn new(action_type: ActionType, price: Option<Decimal>, quantity: Option<Decimal>) -> Self {
        Self {
            seed: SeedReference {
                action_type,
                price,
                quantity,
            },
        }
    }
}

impl ReferenceResolver for FixedResolver {
    fn resolve(&mut self, _market: &str, _symbol: &str) -> Result<SeedReference> {
        Ok(self.seed.clone())
    }
}

/// Interactive resolver asking the operator on a terminal
pub struct PromptResolver<R, W> {
    input: R,
    output: W,
}

impl PromptResolver<BufReader<Stdin>, Stdout> {
    /// Prompt on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a question and read one trimmed line; `None` on end of input
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_action_type(&mut self, market: &str, symbol: &str) -> Result<ActionType> {
        let question = format!(
            "We need to know your last transaction. Please check the market ({}) and set your last action for {} [buy/sell] (default: buy):",
            market, symbol
        );
        loop {
            let answer = self.ask(&question)?.ok_or_else(|| {
                TraderError::Bootstrap("no last action supplied".to_string())
            })?;
            match answer.to_lowercase().as_str() {
                "" | "buy" => return Ok(ActionType::Buy),
                "sell" => return Ok(ActionType::Sell),
                _ => writeln!(self.output, "Your response is invalid.")?,
            }
        }
    }

    fn ask_decimal(&mut self, question: &str) -> Result<Option<Decimal>> {
        loop {
            let answer = match self.ask(question)? {
                Some(answer) if !answer.is_empty() => answer,
                _ => return Ok(None),
            };
            match answer.parse::<Decimal>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "'{}' is not a number.", answer)?,
            }
        }
    }
}

impl<R: BufRead + Send, W: Write + Send> ReferenceResolver for PromptResolver<R, W> {
    fn resolve(&mut self, market: &str, symbol: &str) -> Result<SeedReference> {
        let action_type = self.ask_action_type(market, symbol)?;

        let price = self.ask_decimal(&format!("What was the last price for {}?", symbol))?;
        if price.is_none() {
            writeln!(
                self.output,
                "You need to tell me the last action price. Otherwise I can not move on."
            )?;
            return Ok(SeedReference {
                action_type,
                price: None,
                quantity: None,
            });
        }

        let quantity = if action_type == ActionType::Buy {
            self.ask_decimal(&format!(
                "How much {} do you hold? (leave empty if unknown)",
                symbol
            ))?
        } else {
            None
        };

        writeln!(self.output, "OK. I know what to do now.")?;
        Ok(SeedReference {
            action_type,
            price,
            quantity,
        })
    }
}

/// Load the latest reference for (market, symbol), seeding one if the journal is empty
///
/// A seed gets `previous_price == action_price == supplied price` and is
/// appended to the journal before it is returned.
pub async fn bootstrap(
    journal: &dyn ActionLog,
    resolver: &mut dyn ReferenceResolver,
    market: &str,
    symbol: &str,
    now: i64,
) -> Result<Action> {
    let latest = journal.query(&LogQuery::latest_for(market, symbol)).await?;

    if let Some(record) = latest.into_iter().next() {
        let reference = Action::try_from(record)?;
        info!(
            "Resuming from last {} of {} at {} ({})",
            reference.action_type(),
            symbol,
            reference.action_price(),
            reference.last_update()
        );
        return Ok(reference);
    }

    info!("No recorded action for {} on {}, asking for a seed", symbol, market);
    let seed = resolver.resolve(market, symbol)?;

    if !seed.action_type.is_trade() {
        return Err(TraderError::Bootstrap(
            "the last action must be buy or sell".to_string(),
        ));
    }
    let price = seed.price.ok_or_else(|| {
        TraderError::Bootstrap(format!("no last price supplied for {}", symbol))
    })?;

    let reference = Action::seed(seed.action_type, market, symbol, price, seed.quantity, now)
        .map_err(|e| TraderError::Bootstrap(e.to_string()))?;

    journal.append(&reference.to_record()).await?;
    info!(
        "Seeded reference {} of {} at {}",
        reference.action_type(),
        symbol,
        price
    );

    Ok(reference)
}
