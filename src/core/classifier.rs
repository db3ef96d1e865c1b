use crate::domain::model::{Classification, WeightStandard, WeightStatus};

/// Accepted deviation from the expected weight, as a fraction of it.
pub const TOLERANCE_RATIO: f64 = 0.10;

/// Weight standards kept in ascending age order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightStandards {
    standards: Vec<WeightStandard>,
}

impl WeightStandards {
    /// Sorts by age; the sort is stable so equal ages keep their input order.
    pub fn new(mut standards: Vec<WeightStandard>) -> Self {
        standards.sort_by_key(|standard| standard.age_in_days);
        Self { standards }
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn as_slice(&self) -> &[WeightStandard] {
        &self.standards
    }

    /// The standard closest in age. Among equally close standards the
    /// younger one wins.
    pub fn nearest(&self, age_in_days: i64) -> Option<&WeightStandard> {
        let mut best: Option<&WeightStandard> = None;
        for standard in &self.standards {
            let distance = standard.age_in_days.abs_diff(age_in_days);
            match best {
                Some(current) if current.age_in_days.abs_diff(age_in_days) <= distance => {}
                _ => best = Some(standard),
            }
        }
        best
    }

    pub fn classify(&self, weight_kg: f64, age_in_days: i64) -> Classification {
        match self.nearest(age_in_days) {
            Some(standard) => classify_against(weight_kg, standard.expected_weight_kg),
            None => Classification::unknown(),
        }
    }
}

/// Compare a weight with an expected weight using the fixed tolerance band.
/// Both band edges count as normal.
pub fn classify_against(weight_kg: f64, expected_weight_kg: f64) -> Classification {
    let tolerance = expected_weight_kg * TOLERANCE_RATIO;

    let status = if weight_kg < expected_weight_kg - tolerance {
        WeightStatus::Underweight
    } else if weight_kg > expected_weight_kg + tolerance {
        WeightStatus::Overweight
    } else {
        WeightStatus::Normal
    };

    Classification {
        status,
        expected_weight_kg: Some(expected_weight_kg),
    }
}
