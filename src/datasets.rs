//! Compiled-in dataset constants: source URLs, archive-internal file names,
//! and the typed column layout of the patient records extract.

use crate::model::{ColumnType, TableSchema};

pub const DIABETES_DATASET: &str = "diabetes";
pub const DIABETES_URL: &str =
    "https://archive.ics.uci.edu/static/public/296/diabetes+130-us+hospitals+for+years+1999-2008.zip";
pub const DIABETIC_DATA_FILE: &str = "diabetic_data.csv";
pub const IDS_MAPPING_FILE: &str = "IDS_mapping.csv";

pub const ICD9_DATASET: &str = "icd_9";
pub const ICD9_URL: &str =
    "https://www.cms.gov/medicare/coding/icd9providerdiagnosticcodes/downloads/icd-9-cm-v32-master-descriptions.zip";
pub const ICD9_DESC_FILE: &str = "CMS32_DESC_LONG_DX.txt";

/// Header tokens that open a new block in the flat mapping file.
pub const MAPPING_HEADERS: &[&str] = &[
    "admission_type_id",
    "discharge_disposition_id",
    "admission_source_id",
];

/// The code field of an ICD-9 description line occupies this many leading
/// characters; the offset is positional and independent of content.
pub const ICD9_CODE_WIDTH: usize = 6;

use crate::model::ColumnType::{Integer, Text};

const PATIENT_RECORD_COLUMNS: &[(&str, ColumnType)] = &[
    // identifiers
    ("encounter_id", Integer),
    ("patient_nbr", Integer),
    // demographics
    ("race", Text),
    ("gender", Text),
    ("age", Text),
    ("weight", Text),
    // admission and discharge metadata
    ("admission_type_id", Integer),
    ("discharge_disposition_id", Integer),
    ("admission_source_id", Integer),
    ("time_in_hospital", Integer),
    // payer / speciality
    ("payer_code", Text),
    ("medical_specialty", Text),
    // counts and utilisation
    ("num_lab_procedures", Integer),
    ("num_procedures", Integer),
    ("num_medications", Integer),
    ("number_outpatient", Integer),
    ("number_emergency", Integer),
    ("number_inpatient", Integer),
    // diagnoses
    ("diag_1", Text),
    ("diag_2", Text),
    ("diag_3", Text),
    ("number_diagnoses", Integer),
    // lab results
    ("max_glu_serum", Text),
    ("A1Cresult", Text),
    // medications, single agents
    ("metformin", Text),
    ("repaglinide", Text),
    ("nateglinide", Text),
    ("chlorpropamide", Text),
    ("glimepiride", Text),
    ("acetohexamide", Text),
    ("glipizide", Text),
    ("glyburide", Text),
    ("tolbutamide", Text),
    ("pioglitazone", Text),
    ("rosiglitazone", Text),
    ("acarbose", Text),
    ("miglitol", Text),
    ("troglitazone", Text),
    ("tolazamide", Text),
    ("examide", Text),
    ("citoglipton", Text),
    ("insulin", Text),
    // combination therapies
    ("glyburide-metformin", Text),
    ("glipizide-metformin", Text),
    ("glimepiride-pioglitazone", Text),
    ("metformin-rosiglitazone", Text),
    ("metformin-pioglitazone", Text),
    // other flags
    ("change", Text),
    ("diabetesMed", Text),
    // target
    ("readmitted", Text),
];

pub fn patient_records_schema() -> TableSchema {
    TableSchema {
        table: "diabetes.patient_records",
        columns: PATIENT_RECORD_COLUMNS,
        null_sentinel: "?",
    }
}
