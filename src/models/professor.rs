use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Entity;
use crate::validation::{EntityDescriptor, FieldKind, FieldSpec, Rule};
use crate::view::table::Cell;

pub(crate) const EMAIL_RULE: Rule = Rule::Contains {
    needle: '@',
    message: "Por favor ingrese un email válido",
};

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9}$").expect("phone pattern"));
static PROFESSOR_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PROF\d{1,4}$").expect("professor code pattern"));

pub(crate) const PHONE_RULE: Rule = Rule::Pattern {
    regex: &PHONE,
    message: "El teléfono debe tener 9 dígitos",
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub codigo: String,
    pub nombre: String,
    pub email: String,
    pub especialidad: String,
    pub departamento: String,
    pub telefono: String,
    pub experiencia: i32,
}

pub static PROFESSORS: EntityDescriptor = EntityDescriptor {
    table: "profesores",
    singular: "Profesor",
    plural: "profesores",
    fields: &[
        FieldSpec {
            name: "codigo",
            label: "código",
            kind: FieldKind::Text,
            required: true,
            rules: &[Rule::Pattern {
                regex: &PROFESSOR_CODE,
                message: "El código debe tener el formato PROF1, PROF2, etc.",
            }],
        },
        FieldSpec { name: "nombre", label: "nombre", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec { name: "email", label: "email", kind: FieldKind::Text, required: true, rules: &[EMAIL_RULE] },
        FieldSpec { name: "especialidad", label: "especialidad", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec { name: "departamento", label: "departamento", kind: FieldKind::Text, required: true, rules: &[] },
        FieldSpec { name: "telefono", label: "teléfono", kind: FieldKind::Text, required: true, rules: &[PHONE_RULE] },
        FieldSpec {
            name: "experiencia",
            label: "experiencia",
            kind: FieldKind::Integer,
            required: true,
            rules: &[Rule::IntRange {
                min: 0,
                max: 50,
                message: "La experiencia debe estar entre 0 y 50 años",
            }],
        },
    ],
    order_by: "nombre",
    search_columns: &["nombre", "codigo", "especialidad"],
    unique_fields: &["codigo", "email"],
    columns: &[
        "Código",
        "Nombre",
        "Email",
        "Especialidad",
        "Departamento",
        "Teléfono",
        "Experiencia",
        "Acciones",
    ],
};

impl Entity for Professor {
    fn descriptor() -> &'static EntityDescriptor {
        &PROFESSORS
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.codigo),
            Cell::text(&self.nombre),
            Cell::text(&self.email),
            Cell::text(&self.especialidad),
            Cell::text(&self.departamento),
            Cell::text(&self.telefono),
            Cell::text(format!("{} años", self.experiencia)),
        ]
    }
}
