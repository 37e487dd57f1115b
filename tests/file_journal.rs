//! Integration tests for bootstrapping from the JSON-lines journal

mod common;

use common::*;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use signal_trader::common::errors::TraderError;
use signal_trader::common::types::ActionType;
use signal_trader::config::LogPartition;
use signal_trader::journal::{ActionLog, FileJournal};
use signal_trader::strategy::{bootstrap, Action, FixedResolver};

const DAY: i64 = 86_400;

#[tokio::test]
async fn test_latest_reference_found_across_date_partitions() {
    let dir = TempDir::new().unwrap();
    let journal = FileJournal::new(dir.path(), LogPartition::Date);

    let first = Action::seed(ActionType::Buy, MARKET, SYMBOL, dec!(100), Some(dec!(0.5)), 1_700_000_000)
        .unwrap();
    let second = Action::follow(&first, ActionType::Sell, dec!(110), 1_700_000_000 + 3 * DAY)
        .unwrap()
        .with_quantity(dec!(0.5))
        .unwrap();
    let other_symbol =
        Action::seed(ActionType::Buy, MARKET, "ETHUSDT", dec!(2000), None, 1_700_000_000 + 5 * DAY)
            .unwrap();

    for action in [&first, &second, &other_symbol] {
        journal.append(&action.to_record()).await.unwrap();
    }

    let partitions = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(partitions, 3);

    let mut resolver = FixedResolver::new(ActionType::Buy, None, None);
    let reference = bootstrap(&journal, &mut resolver, MARKET, SYMBOL, 1_800_000_000)
        .await
        .unwrap();

    assert_eq!(reference, second);
}

#[tokio::test]
async fn test_seed_written_to_symbol_file() {
    let dir = TempDir::new().unwrap();
    let journal = FileJournal::new(dir.path(), LogPartition::Symbol);

    let mut resolver = FixedResolver::new(ActionType::Sell, Some(dec!(42.5)), None);
    let reference = bootstrap(&journal, &mut resolver, MARKET, SYMBOL, 1_700_000_000)
        .await
        .unwrap();

    let contents = std::fs::read_to_string(dir.path().join("BTCUSDT.jsonl")).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("\"type\":\"sell\""));
    assert!(contents.contains("\"previousPrice\""));
    assert_eq!(reference.previous_price(), reference.action_price());
}

#[tokio::test]
async fn test_corrupt_journal_line_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("BTCUSDT.jsonl"), "{\"type\":\"buy\"\n").unwrap();
    let journal = FileJournal::new(dir.path(), LogPartition::Symbol);

    let mut resolver = FixedResolver::new(ActionType::Buy, Some(dec!(1)), None);
    let err = bootstrap(&journal, &mut resolver, MARKET, SYMBOL, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, TraderError::MalformedRecord(_)));
    assert!(err.is_fatal());
}
