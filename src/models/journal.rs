use serde::{Deserialize, Serialize};

/// Publication window used to turn citations-per-paper into a yearly rate.
pub const YEARS_ACTIVE: u32 = 5;

/// Journal statistics as supplied by the bulk population source.
///
/// Carries no impact factor; it is derived from the counts when the record
/// is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewJournal {
    pub issn_l: String,
    pub display_name: Option<String>,
    pub issn_print: Option<String>,
    pub issn_online: Option<String>,
    pub works_count: i64,
    pub cited_by_count: i64,
    pub h_index: i64,
}

/// A stored journal metric record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journal {
    pub issn_l: String,
    pub display_name: Option<String>,
    pub issn_print: Option<String>,
    pub issn_online: Option<String>,
    pub impact_factor: f64,
    pub works_count: i64,
    pub cited_by_count: i64,
    pub h_index: i64,
}

impl Journal {
    pub fn from_new(journal: &NewJournal) -> Self {
        Self {
            issn_l: journal.issn_l.clone(),
            display_name: journal.display_name.clone(),
            issn_print: journal.issn_print.clone(),
            issn_online: journal.issn_online.clone(),
            impact_factor: calculate_impact_factor(
                journal.cited_by_count,
                journal.works_count,
                YEARS_ACTIVE,
            ),
            works_count: journal.works_count,
            cited_by_count: journal.cited_by_count,
            h_index: journal.h_index,
        }
    }

    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.issn_l)
    }
}

/// Average citations per paper per active year, rounded to three decimals.
///
/// Zero (or negative) works or years yield 0.0.
pub fn calculate_impact_factor(cited_by_count: i64, works_count: i64, years_active: u32) -> f64 {
    if works_count <= 0 || years_active == 0 {
        return 0.0;
    }
    let per_paper = cited_by_count as f64 / works_count as f64;
    let per_year = per_paper / years_active as f64;
    (per_year * 1000.0).round() / 1000.0
}
