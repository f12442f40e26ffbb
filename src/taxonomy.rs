//! Disease taxonomy: the immutable disease → symptom reference data that
//! drives the questionnaire, plus the follow-up plan catalog used to seed
//! symptom tracking.
//!
//! The `Normal` sentinel always exists, always has an empty symptom set,
//! and always sits first in iteration order.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the no-disease sentinel.
pub const NORMAL: &str = "Normal";

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Disease name must not be empty")]
    EmptyName,
    #[error("Disease listed twice: {0}")]
    DuplicateDisease(String),
    #[error("\"Normal\" must have an empty symptom set")]
    NormalHasSymptoms,
    #[error("Invalid taxonomy file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Cannot read taxonomy file: {0}")]
    Io(#[from] std::io::Error),
}

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    pub name: String,
    pub symptoms: Vec<String>,
}

impl DiseaseProfile {
    pub fn new(name: &str, symptoms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn has_symptom(&self, symptom: &str) -> bool {
        self.symptoms.iter().any(|s| s == symptom)
    }
}

/// Follow-up advice and expected recovery window for a disease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPlan {
    pub steps: Vec<String>,
    pub recovery_days: u32,
}

/// One disease entry in a taxonomy JSON file.
#[derive(Debug, Deserialize)]
struct TaxonomyFileEntry {
    name: String,
    #[serde(default)]
    symptoms: Vec<String>,
    #[serde(default)]
    follow_up_steps: Vec<String>,
    #[serde(default)]
    recovery_days: u32,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    diseases: Vec<TaxonomyFileEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiseaseEntryView<'a> {
    pub name: &'a str,
    pub symptoms: &'a [String],
    pub follow_up: FollowUpPlan,
}

/// Validated, immutable taxonomy. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DiseaseTaxonomy {
    diseases: Vec<DiseaseProfile>,
    plans: HashMap<String, FollowUpPlan>,
}

impl DiseaseTaxonomy {
    /// Validates and normalises the disease list.
    ///
    /// Names and symptoms are trimmed, duplicate symptoms inside a disease are
    /// dropped (first occurrence wins), and `Normal` is inserted if absent and
    /// moved to the front.
    pub fn new(
        diseases: Vec<DiseaseProfile>,
        plans: HashMap<String, FollowUpPlan>,
    ) -> Result<Self, TaxonomyError> {
        let mut seen_names = HashSet::new();
        let mut normal: Option<DiseaseProfile> = None;
        let mut rest = Vec::with_capacity(diseases.len());

        for profile in diseases {
            let name = profile.name.trim().to_string();
            if name.is_empty() {
                return Err(TaxonomyError::EmptyName);
            }
            if !seen_names.insert(name.clone()) {
                return Err(TaxonomyError::DuplicateDisease(name));
            }

            let mut seen_symptoms = HashSet::new();
            let symptoms: Vec<String> = profile
                .symptoms
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .filter(|s| seen_symptoms.insert(s.to_string()))
                .map(str::to_string)
                .collect();

            if name == NORMAL {
                if !symptoms.is_empty() {
                    return Err(TaxonomyError::NormalHasSymptoms);
                }
                normal = Some(DiseaseProfile { name, symptoms });
            } else {
                rest.push(DiseaseProfile { name, symptoms });
            }
        }

        let mut ordered = Vec::with_capacity(rest.len() + 1);
        ordered.push(normal.unwrap_or_else(|| DiseaseProfile::new(NORMAL, &[])));
        ordered.extend(rest);

        Ok(Self {
            diseases: ordered,
            plans,
        })
    }

    /// Parses a taxonomy JSON document:
    /// `{"diseases": [{"name", "symptoms", "follow_up_steps", "recovery_days"}]}`.
    pub fn from_json_str(raw: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = serde_json::from_str(raw)?;
        let mut plans = HashMap::new();
        let mut diseases = Vec::with_capacity(file.diseases.len());
        for entry in file.diseases {
            plans.insert(
                entry.name.trim().to_string(),
                FollowUpPlan {
                    steps: entry.follow_up_steps,
                    recovery_days: entry.recovery_days,
                },
            );
            diseases.push(DiseaseProfile {
                name: entry.name,
                symptoms: entry.symptoms,
            });
        }
        Self::new(diseases, plans)
    }

    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// All diseases, `Normal` first, then declaration order.
    pub fn diseases(&self) -> &[DiseaseProfile] {
        &self.diseases
    }

    pub fn disease(&self, name: &str) -> Option<&DiseaseProfile> {
        self.diseases.iter().find(|d| d.name == name)
    }

    pub fn disease_names(&self) -> Vec<String> {
        self.diseases.iter().map(|d| d.name.clone()).collect()
    }

    /// True when `symptom` is listed under `disease`.
    pub fn contains(&self, disease: &str, symptom: &str) -> bool {
        self.disease(disease).is_some_and(|d| d.has_symptom(symptom))
    }

    /// Number of distinct symptoms across every disease.
    pub fn distinct_symptom_count(&self) -> usize {
        self.diseases
            .iter()
            .flat_map(|d| d.symptoms.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Follow-up plan for a disease. Unknown diseases get an empty plan.
    pub fn follow_up(&self, disease: &str) -> FollowUpPlan {
        self.plans.get(disease).cloned().unwrap_or_default()
    }

    pub fn entries(&self) -> Vec<DiseaseEntryView<'_>> {
        self.diseases
            .iter()
            .map(|d| DiseaseEntryView {
                name: &d.name,
                symptoms: &d.symptoms,
                follow_up: self.follow_up(&d.name),
            })
            .collect()
    }

    /// The portal's reference taxonomy: six conditions plus `Normal`.
    pub fn builtin() -> Self {
        let diseases = vec![
            DiseaseProfile::new(NORMAL, &[]),
            DiseaseProfile::new(
                "Diabetes",
                &[
                    "fatigue",
                    "frequent urination",
                    "excessive thirst",
                    "blurred vision",
                    "unexplained weight loss",
                    "slow-healing sores",
                ],
            ),
            DiseaseProfile::new(
                "Hypertension",
                &[
                    "headache",
                    "dizziness",
                    "blurred vision",
                    "shortness of breath",
                    "chest pain",
                    "nosebleeds",
                ],
            ),
            DiseaseProfile::new(
                "Heart Disease",
                &[
                    "chest pain",
                    "shortness of breath",
                    "fatigue",
                    "irregular heartbeat",
                    "swelling in legs",
                    "dizziness",
                ],
            ),
            DiseaseProfile::new(
                "Eye Disease",
                &[
                    "blurred vision",
                    "eye pain",
                    "sensitivity to light",
                    "double vision",
                    "loss of peripheral vision",
                    "seeing halos around lights",
                ],
            ),
            DiseaseProfile::new(
                "Brain Tumor",
                &[
                    "headache",
                    "nausea",
                    "fatigue",
                    "vision problems",
                    "memory problems",
                    "seizures",
                ],
            ),
            DiseaseProfile::new(
                "Pneumonia",
                &[
                    "cough",
                    "fever",
                    "shortness of breath",
                    "fatigue",
                    "chest pain",
                    "nausea",
                ],
            ),
        ];

        let plan = |steps: &[&str], recovery_days: u32| FollowUpPlan {
            steps: steps.iter().map(|s| s.to_string()).collect(),
            recovery_days,
        };

        let plans = HashMap::from([
            (
                "Diabetes".to_string(),
                plan(
                    &[
                        "Consult a doctor for a blood sugar test.",
                        "Monitor your diet and reduce sugar intake.",
                        "Exercise regularly and maintain a healthy weight.",
                    ],
                    30,
                ),
            ),
            (
                "Hypertension".to_string(),
                plan(
                    &[
                        "Check your blood pressure regularly.",
                        "Reduce salt intake and avoid processed foods.",
                        "Consult a doctor for medication if needed.",
                    ],
                    60,
                ),
            ),
            (
                "Heart Disease".to_string(),
                plan(
                    &[
                        "Seek immediate medical attention if you have chest pain.",
                        "Adopt a heart-healthy diet (low fat, low cholesterol).",
                        "Exercise regularly and avoid smoking.",
                    ],
                    90,
                ),
            ),
            (
                "Eye Disease".to_string(),
                plan(
                    &[
                        "Visit an ophthalmologist for a comprehensive eye exam.",
                        "Avoid straining your eyes and use protective eyewear.",
                        "Follow prescribed treatments for any diagnosed condition.",
                    ],
                    45,
                ),
            ),
            (
                "Brain Tumor".to_string(),
                plan(
                    &[
                        "Consult a neurologist immediately for further evaluation.",
                        "Undergo imaging tests like MRI or CT scan.",
                        "Follow the treatment plan recommended by your doctor.",
                    ],
                    180,
                ),
            ),
            (
                "Pneumonia".to_string(),
                plan(
                    &[
                        "Seek medical attention for antibiotics or antiviral treatment.",
                        "Rest and stay hydrated.",
                        "Monitor your temperature and seek emergency care if symptoms worsen.",
                    ],
                    21,
                ),
            ),
            (
                NORMAL.to_string(),
                plan(
                    &[
                        "No specific disease detected. Maintain a healthy lifestyle.",
                        "If symptoms persist, consult a doctor for further evaluation.",
                    ],
                    0,
                ),
            ),
        ]);

        // Already normalised: Normal first, unique names, no repeated symptoms.
        Self { diseases, plans }
    }
}

impl Default for DiseaseTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_seven_entries_normal_first() {
        let tax = DiseaseTaxonomy::builtin();
        assert_eq!(tax.diseases().len(), 7);
        assert_eq!(tax.diseases()[0].name, NORMAL);
        assert!(tax.diseases()[0].symptoms.is_empty());
        assert_eq!(tax.diseases()[1].name, "Diabetes");
    }

    #[test]
    fn normal_inserted_when_missing() {
        let tax = DiseaseTaxonomy::new(
            vec![DiseaseProfile::new("Flu", &["fever"])],
            HashMap::new(),
        )
        .unwrap();
        assert_eq!(tax.disease_names(), vec!["Normal".to_string(), "Flu".to_string()]);
    }

    #[test]
    fn normal_with_symptoms_rejected() {
        let result = DiseaseTaxonomy::new(
            vec![DiseaseProfile::new(NORMAL, &["cough"])],
            HashMap::new(),
        );
        assert!(matches!(result, Err(TaxonomyError::NormalHasSymptoms)));
    }

    #[test]
    fn duplicate_disease_rejected() {
        let result = DiseaseTaxonomy::new(
            vec![
                DiseaseProfile::new("Flu", &["fever"]),
                DiseaseProfile::new(" Flu ", &["cough"]),
            ],
            HashMap::new(),
        );
        assert!(matches!(result, Err(TaxonomyError::DuplicateDisease(name)) if name == "Flu"));
    }

    #[test]
    fn empty_name_rejected() {
        let result = DiseaseTaxonomy::new(vec![DiseaseProfile::new("  ", &[])], HashMap::new());
        assert!(matches!(result, Err(TaxonomyError::EmptyName)));
    }

    #[test]
    fn duplicate_symptoms_collapsed() {
        let tax = DiseaseTaxonomy::new(
            vec![DiseaseProfile::new("Flu", &["fever", " fever", "cough", ""])],
            HashMap::new(),
        )
        .unwrap();
        assert_eq!(tax.disease("Flu").unwrap().symptoms, vec!["fever", "cough"]);
    }

    #[test]
    fn builtin_survives_validation() {
        let tax = DiseaseTaxonomy::builtin();
        let plans = tax.diseases().iter().map(|d| (d.name.clone(), tax.follow_up(&d.name))).collect();
        let revalidated = DiseaseTaxonomy::new(tax.diseases().to_vec(), plans).unwrap();
        assert_eq!(revalidated.diseases(), tax.diseases());
    }

    #[test]
    fn contains_checks_disease_membership() {
        let tax = DiseaseTaxonomy::builtin();
        assert!(tax.contains("Pneumonia", "cough"));
        assert!(!tax.contains("Diabetes", "cough"));
        assert!(!tax.contains("Unknown", "cough"));
    }

    #[test]
    fn follow_up_plans_match_catalog() {
        let tax = DiseaseTaxonomy::builtin();
        assert_eq!(tax.follow_up("Diabetes").recovery_days, 30);
        assert_eq!(tax.follow_up("Brain Tumor").recovery_days, 180);
        assert_eq!(tax.follow_up("Pneumonia").steps.len(), 3);
        assert_eq!(tax.follow_up(NORMAL).recovery_days, 0);
        assert_eq!(tax.follow_up("Unknown"), FollowUpPlan::default());
    }

    #[test]
    fn distinct_symptoms_counted_once() {
        let tax = DiseaseTaxonomy::builtin();
        // 36 listed symptoms, 12 of them repeats
        assert_eq!(tax.distinct_symptom_count(), 24);
    }

    #[test]
    fn json_taxonomy_parses_with_plans() {
        let raw = r#"{
            "diseases": [
                {"name": "Flu", "symptoms": ["fever", "cough"], "follow_up_steps": ["Rest"], "recovery_days": 7},
                {"name": "Migraine", "symptoms": ["headache"]}
            ]
        }"#;
        let tax = DiseaseTaxonomy::from_json_str(raw).unwrap();
        assert_eq!(tax.disease_names(), vec!["Normal", "Flu", "Migraine"]);
        assert_eq!(tax.follow_up("Flu").recovery_days, 7);
        assert_eq!(tax.follow_up("Migraine").recovery_days, 0);
    }

    #[test]
    fn json_taxonomy_rejects_malformed() {
        let result = DiseaseTaxonomy::from_json_str("{\"diseases\": 3}");
        assert!(matches!(result, Err(TaxonomyError::Parse(_))));
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("taxonomy.json");
        std::fs::write(&path, r#"{"diseases":[{"name":"Flu","symptoms":["fever"]}]}"#).unwrap();
        let tax = DiseaseTaxonomy::load(&path).unwrap();
        assert!(tax.contains("Flu", "fever"));
    }
}
