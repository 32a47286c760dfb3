//! typology-engine CLI
//!
//! Run AML typology detection from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a dataset from a JSON file
//! typology-engine analyze --input dataset.json
//!
//! # Output as JSON
//! typology-engine analyze --input dataset.json --format json
//!
//! # Generate a random dataset for testing
//! typology-engine generate --entities 20 --transactions 100
//! ```

use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use std::fs;
use std::process;
use typology_engine::core::entity::{Entity, EntityId, EntitySet, RiskLevel};
use typology_engine::core::relationship::{EntityRelationship, RelationshipSet};
use typology_engine::core::transaction::{Transaction, TransactionId, TransactionSet};
use typology_engine::detect::report::{AnalysisConfig, AnalysisEngine};
use typology_engine::simulation::generator::{generate_random_dataset, DatasetConfig};

fn print_usage() {
    eprintln!(
        r#"typology-engine — open AML typology-detection engine

USAGE:
    typology-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Run all detectors over a dataset
    generate    Generate a random dataset (for testing)
    help        Show this message

OPTIONS (analyze):
    --input <FILE>      Path to JSON dataset file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --entities <N>      Number of entities (default: 20)
    --transactions <N>  Number of transactions (default: 100)
    --relationships <N> Number of relationships (default: 40)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    typology-engine analyze --input dataset.json
    typology-engine analyze --input dataset.json --format json
    typology-engine generate --entities 50 --transactions 400 --output test.json"#
    );
}

/// JSON schema for input datasets.
#[derive(serde::Deserialize)]
struct DatasetFile {
    #[serde(default)]
    transactions: Vec<TransactionInput>,
    #[serde(default)]
    entities: Vec<EntityInput>,
    #[serde(default)]
    relationships: Vec<RelationshipInput>,
}

#[derive(serde::Deserialize)]
struct TransactionInput {
    id: String,
    source: String,
    destination: String,
    amount: String,
    timestamp: String,
    #[serde(default)]
    category: String,
}

#[derive(serde::Deserialize)]
struct EntityInput {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    jurisdiction: String,
    registered_at: String,
    #[serde(default)]
    risk_level: RiskLevel,
    #[serde(default)]
    risk_score: f64,
}

#[derive(serde::Deserialize)]
struct RelationshipInput {
    source: String,
    target: String,
    #[serde(default)]
    kind: String,
    #[serde(default = "default_strength")]
    strength: f64,
}

fn default_strength() -> f64 {
    1.0
}

/// Parse the dataset file, skipping records with unparsable amounts or
/// timestamps rather than aborting the batch.
fn load_dataset(path: &str) -> (TransactionSet, EntitySet, RelationshipSet) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: DatasetFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "transactions": [
    {{ "id": "TX-1", "source": "ACME", "destination": "GLOBEX",
      "amount": "9500", "timestamp": "2026-03-01T12:00:00Z" }}
  ],
  "entities": [
    {{ "id": "ACME", "name": "Acme Holdings", "jurisdiction": "KY",
      "registered_at": "2026-01-01T00:00:00Z", "risk_level": "high", "risk_score": 72.0 }}
  ],
  "relationships": [
    {{ "source": "ACME", "target": "GLOBEX", "kind": "ownership", "strength": 0.8 }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut transactions = TransactionSet::new();
    for tx in file.transactions {
        let amount: Decimal = match tx.amount.parse() {
            Ok(a) => a,
            Err(e) => {
                warn!("skipping transaction '{}': invalid amount '{}': {}", tx.id, tx.amount, e);
                continue;
            }
        };
        let timestamp: DateTime<Utc> = match tx.timestamp.parse() {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    "skipping transaction '{}': invalid timestamp '{}': {}",
                    tx.id, tx.timestamp, e
                );
                continue;
            }
        };
        transactions.add(
            Transaction::new(
                TransactionId::new(tx.id),
                EntityId::new(tx.source),
                EntityId::new(tx.destination),
                amount,
                timestamp,
            )
            .with_category(tx.category),
        );
    }

    let mut entities = EntitySet::new();
    for entity in file.entities {
        let registered_at: DateTime<Utc> = match entity.registered_at.parse() {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    "skipping entity '{}': invalid registration date '{}': {}",
                    entity.id, entity.registered_at, e
                );
                continue;
            }
        };
        entities.add(
            Entity::new(
                EntityId::new(entity.id),
                entity.name,
                entity.jurisdiction,
                registered_at,
            )
            .with_kind(entity.kind)
            .with_risk(entity.risk_level, entity.risk_score),
        );
    }

    let mut relationships = RelationshipSet::new();
    for rel in file.relationships {
        relationships.add(
            EntityRelationship::new(EntityId::new(rel.source), EntityId::new(rel.target), rel.kind)
                .with_strength(rel.strength),
        );
    }

    (transactions, entities, relationships)
}

fn cmd_analyze(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let (transactions, entities, relationships) = load_dataset(&path);
    let report = AnalysisEngine::analyze(
        &transactions,
        &entities,
        &relationships,
        &AnalysisConfig::default(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        println!("{}", report);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = DatasetConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--entities" => {
                i += 1;
                config.entity_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--entities requires a number");
                    process::exit(1);
                });
            }
            "--transactions" => {
                i += 1;
                config.transaction_count =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--transactions requires a number");
                        process::exit(1);
                    });
            }
            "--relationships" => {
                i += 1;
                config.relationship_count =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--relationships requires a number");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let dataset = generate_random_dataset(&config);

    #[derive(serde::Serialize)]
    struct OutputTransaction {
        id: String,
        source: String,
        destination: String,
        amount: String,
        timestamp: String,
        category: String,
    }

    #[derive(serde::Serialize)]
    struct OutputEntity {
        id: String,
        name: String,
        kind: String,
        jurisdiction: String,
        registered_at: String,
        risk_level: RiskLevel,
        risk_score: f64,
    }

    #[derive(serde::Serialize)]
    struct OutputRelationship {
        source: String,
        target: String,
        kind: String,
        strength: f64,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        transactions: Vec<OutputTransaction>,
        entities: Vec<OutputEntity>,
        relationships: Vec<OutputRelationship>,
    }

    let output = OutputFile {
        transactions: dataset
            .transactions
            .transactions()
            .iter()
            .map(|tx| OutputTransaction {
                id: tx.id().to_string(),
                source: tx.source().to_string(),
                destination: tx.destination().to_string(),
                amount: tx.amount().to_string(),
                timestamp: tx.timestamp().to_rfc3339(),
                category: tx.category().to_string(),
            })
            .collect(),
        entities: dataset
            .entities
            .entities()
            .iter()
            .map(|e| OutputEntity {
                id: e.id().to_string(),
                name: e.name().to_string(),
                kind: e.kind().to_string(),
                jurisdiction: e.jurisdiction().to_string(),
                registered_at: e.registered_at().to_rfc3339(),
                risk_level: e.risk_level(),
                risk_score: e.risk_score(),
            })
            .collect(),
        relationships: dataset
            .relationships
            .relationships()
            .iter()
            .map(|r| OutputRelationship {
                source: r.source().to_string(),
                target: r.target().to_string(),
                kind: r.kind().to_string(),
                strength: r.strength(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} transactions across {} entities → {}",
            dataset.transactions.len(),
            dataset.entities.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
