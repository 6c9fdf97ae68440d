use serde::Serialize;

use crate::models::RecordId;
use crate::validation::{EntityDescriptor, FormValues};

pub const SAVING_CAPTION: &str = "Guardando...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub enabled: bool,
    pub caption: String,
}

impl SubmitControl {
    pub fn idle(caption: impl Into<String>) -> Self {
        Self {
            enabled: true,
            caption: caption.into(),
        }
    }

    pub fn saving() -> Self {
        Self {
            enabled: false,
            caption: SAVING_CAPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub title: String,
    pub mode: FormMode,
    pub values: FormValues,
    pub submit: SubmitControl,
}

impl FormView {
    pub fn create_mode(descriptor: &EntityDescriptor) -> Self {
        Self {
            title: format!("Registrar Nuevo {}", descriptor.singular),
            mode: FormMode::Create,
            values: blank_values(descriptor),
            submit: SubmitControl::idle(create_caption(descriptor)),
        }
    }

    pub fn edit_mode(descriptor: &EntityDescriptor, id: RecordId, values: FormValues) -> Self {
        Self {
            title: format!("Editar {}", descriptor.singular),
            mode: FormMode::Edit(id),
            values,
            submit: SubmitControl::idle(update_caption(descriptor)),
        }
    }

    /// Caption the submit control shows when no save is running.
    pub fn idle_caption(&self, descriptor: &EntityDescriptor) -> String {
        match self.mode {
            FormMode::Create => create_caption(descriptor),
            FormMode::Edit(_) => update_caption(descriptor),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }
}

fn create_caption(descriptor: &EntityDescriptor) -> String {
    format!("Registrar {}", descriptor.singular)
}

fn update_caption(descriptor: &EntityDescriptor) -> String {
    format!("Actualizar {}", descriptor.singular)
}

fn blank_values(descriptor: &EntityDescriptor) -> FormValues {
    descriptor
        .fields
        .iter()
        .map(|f| (f.name.to_string(), String::new()))
        .collect()
}
