use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Entity;
use crate::validation::{EntityDescriptor, FieldKind, FieldSpec, Rule};
use crate::view::table::Cell;

const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// `AB-12`: two capitals, dash, two digits. Shared by course and student codes.
pub(crate) static LETTERS_DASH_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}-[0-9]{2}$").expect("code pattern"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub codigo: String,
    pub nombre: String,
    pub profesor: String,
    pub horario: String,
    pub creditos: i32,
    #[serde(default)]
    pub descripcion: Option<String>,
}

pub static COURSES: EntityDescriptor = EntityDescriptor {
    table: "cursos",
    singular: "Curso",
    plural: "cursos",
    fields: &[
        FieldSpec {
            name: "codigo",
            label: "código",
            kind: FieldKind::Text,
            required: true,
            rules: &[Rule::Pattern {
                regex: &LETTERS_DASH_DIGITS,
                message: "El código debe tener el formato II-51, II-52, etc.",
            }],
        },
        FieldSpec { name: "nombre", label: "nombre", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec { name: "profesor", label: "profesor", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec { name: "horario", label: "horario", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec {
            name: "creditos",
            label: "créditos",
            kind: FieldKind::Integer,
            required: true,
            rules: &[Rule::IntRange {
                min: 1,
                max: 10,
                message: "Los créditos deben estar entre 1 y 10",
            }],
        },
        FieldSpec { name: "descripcion", label: "descripción", kind: FieldKind::Text, required: false, rules: &[] },
    ],
    order_by: "codigo",
    search_columns: &["nombre", "codigo", "profesor"],
    unique_fields: &["codigo"],
    columns: &["Código", "Nombre", "Profesor", "Horario", "Créditos", "Descripción", "Acciones"],
};

impl Course {
    /// Description as shown in the table: cut to 50 characters with an
    /// ellipsis, or a placeholder when there is none.
    pub fn description_preview(&self) -> String {
        match self.descripcion.as_deref() {
            None | Some("") => "Sin descripción".to_string(),
            Some(text) if text.chars().count() > DESCRIPTION_PREVIEW_CHARS => {
                let cut: String = text.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
                format!("{}...", cut)
            }
            Some(text) => text.to_string(),
        }
    }
}

impl Entity for Course {
    fn descriptor() -> &'static EntityDescriptor {
        &COURSES
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.codigo),
            Cell::text(&self.nombre),
            Cell::text(&self.profesor),
            Cell::text(&self.horario),
            Cell::text(self.creditos.to_string()),
            Cell::with_title(
                self.description_preview(),
                self.descripcion.clone().unwrap_or_default(),
            ),
        ]
    }
}
