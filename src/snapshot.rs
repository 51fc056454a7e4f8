use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::board::BoardSnapshot;
use crate::types::{Card, Chip, Column};

pub fn load_snapshot(path: &Path) -> Result<BoardSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read board snapshot '{}'", path.display()))?;
    parse_snapshot(&contents)
        .with_context(|| format!("failed to parse board snapshot '{}'", path.display()))
}

pub fn parse_snapshot(contents: &str) -> Result<BoardSnapshot> {
    let columns: Vec<Column> =
        serde_json::from_str(contents).context("board snapshot is not a JSON list of columns")?;
    Ok(Arc::from(columns))
}

pub fn load_or_sample(path: Option<&Path>) -> Result<BoardSnapshot> {
    match path {
        Some(path) => load_snapshot(path),
        None => Ok(sample_board()),
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotIssue {
    DuplicateColumnId { column_id: String },
    DuplicateCardId { card_id: String },
    ProgressOutOfRange { card_id: String, progress: u8 },
    BlankCardTitle { card_id: String },
    BlankColumnTitle { column_id: String },
}

impl fmt::Display for SnapshotIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumnId { column_id } => {
                write!(f, "column id '{column_id}' is used more than once")
            }
            Self::DuplicateCardId { card_id } => {
                write!(f, "card id '{card_id}' is used more than once")
            }
            Self::ProgressOutOfRange { card_id, progress } => {
                write!(f, "card '{card_id}' has progress {progress}, expected 0..=100")
            }
            Self::BlankCardTitle { card_id } => write!(f, "card '{card_id}' has a blank title"),
            Self::BlankColumnTitle { column_id } => {
                write!(f, "column '{column_id}' has a blank title")
            }
        }
    }
}

/// Lists every structural problem in the board. An empty list means the
/// snapshot satisfies the id-uniqueness and value-range rules the board
/// operations rely on.
pub fn validate(columns: &[Column]) -> Vec<SnapshotIssue> {
    let mut issues = Vec::new();
    let mut column_ids = HashSet::new();
    let mut card_ids = HashSet::new();

    for column in columns {
        if !column_ids.insert(column.id.as_str()) {
            issues.push(SnapshotIssue::DuplicateColumnId {
                column_id: column.id.clone(),
            });
        }
        if column.title.trim().is_empty() {
            issues.push(SnapshotIssue::BlankColumnTitle {
                column_id: column.id.clone(),
            });
        }

        for card in &column.cards {
            if !card_ids.insert(card.id.as_str()) {
                issues.push(SnapshotIssue::DuplicateCardId {
                    card_id: card.id.clone(),
                });
            }
            if card.title.trim().is_empty() {
                issues.push(SnapshotIssue::BlankCardTitle {
                    card_id: card.id.clone(),
                });
            }
            if let Some(progress) = card.progress
                && progress > 100
            {
                issues.push(SnapshotIssue::ProgressOutOfRange {
                    card_id: card.id.clone(),
                    progress,
                });
            }
        }
    }

    issues
}

pub fn sample_board() -> BoardSnapshot {
    let mut backlog = vec![
        Card {
            description: Some("Arrays, hashing, two pointers".to_string()),
            chips: vec![
                Chip::new("Algoritmos", "bg-blue-100 text-blue-700"),
                Chip::new("LeetCode", "neutral"),
            ],
            metric: Some("0/40".to_string()),
            progress: Some(0),
            ..Card::new("card-arrays", "Revisar estruturas básicas")
        },
        Card {
            description: Some("Design a URL shortener end to end".to_string()),
            chips: vec![Chip::new("System design", "bg-purple-100 text-purple-700")],
            due_date: Some("2026-11-05".to_string()),
            ..Card::new("card-url-shortener", "Estudo de caso: encurtador")
        },
    ];
    backlog.push(Card {
        chips: vec![Chip::new("Comportamental", "warning")],
        items: Some(vec![
            "Conflito com colega".to_string(),
            "Projeto atrasado".to_string(),
            "Maior erro".to_string(),
        ]),
        ..Card::new("card-star", "Histórias STAR")
    });

    let in_progress = vec![
        Card {
            description: Some("Dijkstra, topological sort, union-find".to_string()),
            chips: vec![Chip::new("Algoritmos", "primary")],
            metric: Some("12/30".to_string()),
            progress: Some(40),
            owner: Some("Ana".to_string()),
            owner_label: Some("Mentora".to_string()),
            highlight: Some(true),
            ..Card::new("card-graphs", "Grafos")
        },
        Card {
            chips: vec![Chip::new("Mock", "bg-green-100 text-green-700")],
            meta: Some("Sexta, 14h".to_string()),
            owner: Some("Bruno".to_string()),
            ..Card::new("card-mock", "Entrevista simulada")
        },
    ];

    let done = vec![Card {
        chips: vec![Chip::new("Currículo", "success")],
        progress: Some(100),
        ..Card::new("card-resume", "Atualizar currículo")
    }];

    Arc::from(vec![
        Column {
            subtitle: Some("Backlog da semana".to_string()),
            accent_color: Some("primary".to_string()),
            ..Column::new("col-backlog", "Para estudar").with_cards(backlog)
        },
        Column {
            subtitle: Some("Foco atual".to_string()),
            highlight: Some(true),
            accent_color: Some("warning".to_string()),
            ..Column::new("col-doing", "Em andamento").with_cards(in_progress)
        },
        Column {
            accent_color: Some("success".to_string()),
            ..Column::new("col-done", "Concluído").with_cards(done)
        },
    ])
}
