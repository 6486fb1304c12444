use std::io::Write;
use std::path::PathBuf;

use ratecard_cli::commands::{preview, price, tiers};
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp fixture");
    file.write_all(content.as_bytes()).expect("write fixture");
    file
}

fn context_fixture() -> NamedTempFile {
    write_fixture(
        r#"{
            "entries": [
                {
                    "id": "vm-standard",
                    "name": "Standard VM",
                    "category": "compute",
                    "unit": "instance",
                    "billing": "usage_metered"
                }
            ],
            "curves": {
                "vm-standard": {
                    "base_quantity": 100,
                    "base_unit_price": "10",
                    "per_double_discount": "0.1",
                    "floor_price": "2",
                    "bucket_count": 4,
                    "mode": "continuous",
                    "quantity_cap": 100000
                }
            },
            "default_term_schedule": {
                "factors": { "12": "1.0", "36": "0.8" }
            }
        }"#,
    )
}

fn quote_fixture() -> NamedTempFile {
    write_fixture(
        r#"{
            "id": "Q-1",
            "packages": [
                {
                    "id": "P-1",
                    "term_months": 12,
                    "items": [
                        {
                            "entry_id": "vm-standard",
                            "quantity": 400,
                            "environment": "production"
                        }
                    ]
                }
            ],
            "created_at": "2026-01-01T00:00:00Z"
        }"#,
    )
}

#[test]
fn price_renders_line_and_totals() {
    let context = context_fixture();
    let quote = quote_fixture();

    let result = price::run(context.path(), quote.path(), false);
    assert_eq!(result.exit_code, 0, "expected successful pricing run");
    assert!(result.output.contains("quote Q-1: 1 lines"));
    assert!(result.output.contains("vm-standard x400 @ 8.1000"));
    assert!(result.output.contains("total: monthly 3240.00 annual 38880.00"));
}

#[test]
fn price_emits_json_result_shape() {
    let context = context_fixture();
    let quote = quote_fixture();

    let result = price::run(context.path(), quote.path(), true);
    assert_eq!(result.exit_code, 0);

    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("json output");
    assert_eq!(payload["quote_id"], "Q-1");
    assert_eq!(payload["lines"][0]["unit_price"], "8.1000");
    assert_eq!(payload["totals"]["monthly_total"], "3240.00");
}

#[test]
fn price_fails_cleanly_on_unknown_entry() {
    let context = context_fixture();
    let quote = write_fixture(
        r#"{
            "id": "Q-2",
            "packages": [
                {
                    "id": "P-1",
                    "term_months": 12,
                    "items": [
                        { "entry_id": "ghost", "quantity": 1, "environment": "production" }
                    ]
                }
            ],
            "created_at": "2026-01-01T00:00:00Z"
        }"#,
    );

    let result = price::run(context.path(), quote.path(), false);
    assert_eq!(result.exit_code, 1, "expected pricing failure code");

    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("error envelope");
    assert_eq!(payload["command"], "price");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "pricing");
    assert!(payload["message"].as_str().unwrap_or("").contains("ghost"));
}

#[test]
fn price_fails_cleanly_on_missing_file() {
    let context = context_fixture();
    let missing = PathBuf::from("/nonexistent/quote.json");

    let result = price::run(context.path(), &missing, false);
    assert_eq!(result.exit_code, 1);

    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("error envelope");
    assert_eq!(payload["status"], "error");
}

#[test]
fn preview_prices_bare_items() {
    let context = context_fixture();
    let items = write_fixture(
        r#"[
            {
                "entry_id": "vm-standard",
                "quantity": 400,
                "term_months": 36,
                "environment": "production"
            }
        ]"#,
    );

    let result = preview::run(context.path(), items.path(), false, Decimal::new(60, 2));
    assert_eq!(result.exit_code, 0);
    assert!(result.output.contains("preview: 1 items"));
    // 8.10 curve price with the 36-month factor 0.80 applied.
    assert!(result.output.contains("@ 6.4800"));
}

#[test]
fn tiers_renders_curve_implied_tiers() {
    let context = context_fixture();

    let result = tiers::run(context.path(), "vm-standard");
    assert_eq!(result.exit_code, 0);
    assert!(result.output.starts_with("tiers for vm-standard:"));
    assert!(result.output.contains("- 100..199 @ 10.0000"));
    assert!(result.output.contains("unbounded"));
}

#[test]
fn tiers_fails_for_unknown_entry() {
    let context = context_fixture();

    let result = tiers::run(context.path(), "ghost");
    assert_eq!(result.exit_code, 1);

    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("error envelope");
    assert_eq!(payload["command"], "tiers");
    assert_eq!(payload["error_class"], "pricing");
}
