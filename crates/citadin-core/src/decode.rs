//! Code-to-label tables for INSEE employment dimensions.

use serde_json::Value;

use crate::frame::Frame;

/// Upstream code → human label.
pub type LabelTable = &'static [(&'static str, &'static str)];

pub const SEX_LABELS: LabelTable = &[("_T", "Total"), ("F", "Femme"), ("M", "Homme")];

pub const EMPFORM_LABELS: LabelTable =
    &[("_T", "Total"), ("1", "Non Salariés"), ("2", "Salariés")];

pub const EMP_ACTIVITY_LABELS: LabelTable = &[
    ("_T", "Total"),
    ("AZ", "Agriculture, sylviculture et pêche"),
    (
        "BE",
        "Industrie manufacturière, industries extractives et autres",
    ),
    ("FZ", "Construction"),
    ("GU", "Services principalement marchands"),
    (
        "OQ",
        "Administration publique, enseignement, santé humaine et action sociale",
    ),
];

pub const PCS_LABELS: LabelTable = &[
    ("_T", "Total"),
    ("1", "Agriculteurs"),
    ("2", "Artisans, commerçants et chefs d'entreprise"),
    ("3", "Cadres et professions intellectuelles supérieures"),
    ("4", "Professions intermédiaires"),
    ("5", "Employés"),
    ("6", "Ouvriers"),
];

/// Columns decoded by [`decode_employment`], with their tables.
pub const EMPLOYMENT_TABLES: [(&str, LabelTable); 4] = [
    ("SEX", SEX_LABELS),
    ("EMPFORM", EMPFORM_LABELS),
    ("EMP_ACTIVITY", EMP_ACTIVITY_LABELS),
    ("PCS", PCS_LABELS),
];

pub fn label_for(table: LabelTable, code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, label)| *label)
}

/// Translate coded employment columns in place.
///
/// Only string cells are looked up; unknown codes and non-string cells are
/// kept as they are, so no row is ever dropped.
pub fn decode_employment(frame: &mut Frame) {
    for (column, table) in EMPLOYMENT_TABLES {
        frame.map_column(column, |cell| {
            cell.as_str()
                .and_then(|code| label_for(table, code))
                .map(|label| Value::String(label.to_owned()))
        });
    }
}
