use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Entity;
use crate::validation::{EntityDescriptor, FieldKind, FieldSpec, Rule};
use crate::view::table::Cell;

use super::course::LETTERS_DASH_DIGITS;
use super::professor::{EMAIL_RULE, PHONE_RULE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub codigo: String,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub curso: String,
    pub fecha_nacimiento: NaiveDate,
}

pub static STUDENTS: EntityDescriptor = EntityDescriptor {
    table: "estudiantes",
    singular: "Estudiante",
    plural: "estudiantes",
    fields: &[
        FieldSpec {
            name: "codigo",
            label: "código",
            kind: FieldKind::Text,
            required: true,
            rules: &[Rule::Pattern {
                regex: &LETTERS_DASH_DIGITS,
                message: "El código debe tener el formato AB-12 (dos letras, guión, dos números)",
            }],
        },
        FieldSpec { name: "nombre", label: "nombre", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec { name: "email", label: "email", kind: FieldKind::Text, required: true, rules: &[EMAIL_RULE] },
        FieldSpec { name: "telefono", label: "teléfono", kind: FieldKind::Text, required: true, rules: &[PHONE_RULE] },
        FieldSpec { name: "curso", label: "curso", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec {
            name: "fecha_nacimiento",
            label: "fecha de nacimiento",
            kind: FieldKind::Date,
            required: true,
            rules: &[Rule::AgeRange {
                min: 16,
                max: 60,
                message: "El estudiante debe tener entre 16 y 60 años",
            }],
        },
    ],
    order_by: "nombre",
    search_columns: &["nombre", "codigo", "curso"],
    unique_fields: &["codigo", "email"],
    columns: &["Código", "Nombre", "Email", "Curso", "Teléfono", "Fecha Nac.", "Acciones"],
};

impl Entity for Student {
    fn descriptor() -> &'static EntityDescriptor {
        &STUDENTS
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.codigo),
            Cell::text(&self.nombre),
            Cell::text(&self.email),
            Cell::text(&self.curso),
            Cell::text(&self.telefono),
            Cell::text(self.fecha_nacimiento.format("%-d/%-m/%Y").to_string()),
        ]
    }
}
