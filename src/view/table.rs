use serde::Serialize;

use crate::models::{Entity, Record, RecordId};
use crate::validation::EntityDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
        }
    }

    pub fn with_title(text: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            text: text.into(),
            title: (!title.is_empty()).then_some(title),
        }
    }
}

/// Row actions always carry the store id, never a position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "id", rename_all = "snake_case")]
pub enum RowAction {
    Edit(RecordId),
    Delete(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: RecordId,
    pub cells: Vec<Cell>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableBody {
    Empty { colspan: usize, message: String },
    Rows { rows: Vec<TableRow> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub body: TableBody,
}

impl TableView {
    pub fn empty(descriptor: &EntityDescriptor) -> Self {
        Self {
            columns: descriptor.columns.iter().map(|c| c.to_string()).collect(),
            body: TableBody::Empty {
                colspan: descriptor.columns.len(),
                message: format!("No hay {} registrados", descriptor.plural),
            },
        }
    }

    pub fn rows(&self) -> &[TableRow] {
        match &self.body {
            TableBody::Rows { rows } => rows,
            TableBody::Empty { .. } => &[],
        }
    }

    pub fn row_ids(&self) -> Vec<RecordId> {
        self.rows().iter().map(|r| r.id).collect()
    }
}

pub fn render_table<T: Entity>(records: &[Record<T>]) -> TableView {
    let descriptor = T::descriptor();
    if records.is_empty() {
        return TableView::empty(descriptor);
    }

    let rows = records
        .iter()
        .map(|record| TableRow {
            id: record.id,
            cells: record.data.cells(),
            actions: vec![RowAction::Edit(record.id), RowAction::Delete(record.id)],
        })
        .collect();

    TableView {
        columns: descriptor.columns.iter().map(|c| c.to_string()).collect(),
        body: TableBody::Rows { rows },
    }
}
