use super::variant::ExperimentVariant;
use crate::error::ObservationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// One submitted observation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub group: String,
    pub measurement: f64,
    #[serde(default)]
    pub note: String,
}

impl Observation {
    pub fn new(
        date: NaiveDate,
        group: impl Into<String>,
        measurement: f64,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            group: group.into(),
            measurement,
            note: note.into(),
        }
    }

    fn validate(&self, variant: ExperimentVariant) -> Result<(), ObservationError> {
        if !variant.has_group(&self.group) {
            return Err(ObservationError::UnknownGroup {
                variant: variant.to_string(),
                group: self.group.clone(),
            });
        }
        if !self.measurement.is_finite() || self.measurement < 0.0 {
            return Err(ObservationError::InvalidMeasurement(self.measurement));
        }
        Ok(())
    }
}

/// Append-only CSV files, one per experiment variant.
#[derive(Debug, Clone)]
pub struct ObservationStore {
    dir: PathBuf,
}

impl ObservationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, variant: ExperimentVariant) -> PathBuf {
        self.dir.join(variant.file_name())
    }

    /// Validate and append one row, writing the header first for a new file.
    pub fn append(
        &self,
        variant: ExperimentVariant,
        observation: &Observation,
    ) -> Result<(), ObservationError> {
        observation.validate(variant)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(variant);
        let is_new = fs::metadata(&path).map_or(true, |meta| meta.len() == 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(variant.header())?;
        }
        writer.serialize(observation)?;
        writer.flush()?;

        tracing::info!(
            variant = %variant,
            group = observation.group.as_str(),
            measurement = observation.measurement,
            "Observation recorded"
        );
        Ok(())
    }

    /// Read every row in file order. A missing file is an empty log.
    ///
    /// Any malformed content fails the whole load; there is no partial result.
    pub fn load(&self, variant: ExperimentVariant) -> Result<Vec<Observation>, ObservationError> {
        let path = self.path_for(variant);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(|e| analysis_failed(&path, &e))?;

        let headers = reader.headers().map_err(|e| analysis_failed(&path, &e))?;
        let expected = variant.header();
        if headers.iter().ne(expected.iter().copied()) {
            return Err(ObservationError::AnalysisFailed(format!(
                "{}: unexpected header {:?}",
                path.display(),
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let mut observations = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|e| analysis_failed(&path, &e))?;
            let observation: Observation = row
                .deserialize(None)
                .map_err(|e| analysis_failed(&path, &format!("row {}: {e}", index + 2)))?;
            observation
                .validate(variant)
                .map_err(|e| analysis_failed(&path, &format!("row {}: {e}", index + 2)))?;
            observations.push(observation);
        }
        Ok(observations)
    }

    /// All rows sorted by date, then group.
    pub fn records(
        &self,
        variant: ExperimentVariant,
    ) -> Result<Vec<Observation>, ObservationError> {
        let mut observations = self.load(variant)?;
        observations.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.group.cmp(&b.group)));
        Ok(observations)
    }
}

fn analysis_failed(path: &Path, cause: &dyn std::fmt::Display) -> ObservationError {
    ObservationError::AnalysisFailed(format!("{}: {cause}", path.display()))
}
