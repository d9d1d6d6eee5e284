//! HTML pages for the form surface. Templates are `.html`, so minijinja
//! escapes every interpolated value unless a template marks it `|safe`.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::models::{AnalyzeForm, InteractionOutcome};

/// Values echoed back into the form inputs.
#[derive(Debug, Default, Serialize)]
pub struct FormValues {
    pub protein: String,
    pub pdb_id: String,
    pub drug: String,
    pub interaction_type: String,
}

impl From<&AnalyzeForm> for FormValues {
    fn from(form: &AnalyzeForm) -> Self {
        Self {
            protein: form.protein.clone(),
            pdb_id: form.pdb_id.clone().unwrap_or_default(),
            drug: form.drug.clone(),
            interaction_type: form.interaction_type.clone(),
        }
    }
}

pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", include_str!("../templates/layout.html"))?;
        env.add_template("form.html", include_str!("../templates/form.html"))?;
        env.add_template("report.html", include_str!("../templates/report.html"))?;
        Ok(Self { env })
    }

    pub fn form(&self, has_configured_key: bool) -> Result<String, minijinja::Error> {
        self.env.get_template("form.html")?.render(context! {
            form => FormValues::default(),
            has_configured_key => has_configured_key,
        })
    }

    pub fn report(
        &self,
        form: &FormValues,
        outcome: &InteractionOutcome,
        has_configured_key: bool,
    ) -> Result<String, minijinja::Error> {
        let record_json = outcome
            .database_record
            .as_ref()
            .and_then(|record| serde_json::to_string_pretty(record).ok());

        self.env.get_template("report.html")?.render(context! {
            form => form,
            outcome => outcome,
            record_json => record_json,
            has_configured_key => has_configured_key,
        })
    }
}
