// Core models based on the pack pipeline wire shapes

use serde::{Deserialize, Serialize};

/// Subject type detected from the user's photo (external detector).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    SingleMale,
    SingleFemale,
    Couple,
    #[default]
    Unknown,
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectType::SingleMale => write!(f, "single_male"),
            SubjectType::SingleFemale => write!(f, "single_female"),
            SubjectType::Couple => write!(f, "couple"),
            SubjectType::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_male" => Ok(SubjectType::SingleMale),
            "single_female" => Ok(SubjectType::SingleFemale),
            "couple" => Ok(SubjectType::Couple),
            "unknown" => Ok(SubjectType::Unknown),
            other => Err(format!("unknown subject type: {other}")),
        }
    }
}

impl SubjectType {
    /// Derive the subject type from a detection pair (subject mode + gender).
    pub fn from_mode_and_gender(subject_mode: &str, subject_gender: Option<&str>) -> Self {
        let mode = subject_mode.trim().to_lowercase();
        let gender = subject_gender.unwrap_or("").trim().to_lowercase();
        if mode == "multi" {
            return SubjectType::Couple;
        }
        if mode == "single" {
            if gender == "female" || gender == "woman" {
                return SubjectType::SingleFemale;
            }
            if gender == "male" || gender == "man" {
                return SubjectType::SingleMale;
            }
        }
        SubjectType::Unknown
    }
}

/// Creative brief produced by the concept agent. Written once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptBrief {
    #[serde(default)]
    pub subject_type: SubjectType,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default = "default_timeline")]
    pub timeline: String,
    #[serde(default)]
    pub situation_types: Vec<String>,
    #[serde(default)]
    pub shareability_hook: String,
    #[serde(default)]
    pub title_hint: String,
    /// 2-4 items: how the theme is visually recognizable (clothing, light, simple cues).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_anchors: Option<Vec<String>>,
}

fn default_timeline() -> String {
    "one_day".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectMode {
    #[default]
    Single,
    Multi,
}

/// The 9-moment storyline plus pack metadata. Created once per run and
/// read-only for every downstream agent and rework iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossPlan {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pack_template_id: String,
    #[serde(default)]
    pub subject_mode: SubjectMode,
    #[serde(default)]
    pub name_ru: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub carousel_description_ru: String,
    #[serde(default)]
    pub carousel_description_en: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub sort_order: Option<f64>,
    #[serde(default)]
    pub segment_id: String,
    #[serde(default)]
    pub story_arc: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_structure: Option<Vec<String>>,
    #[serde(default)]
    pub moments: Vec<String>,
}

impl BossPlan {
    /// Rebuild a degraded plan from a stored spec row, for rework flows where
    /// only the assembled spec survived persistence.
    pub fn minimal_from_spec(spec: &PackSpecRow) -> Self {
        let moments = if spec.labels.len() >= 9 {
            spec.labels[..9].to_vec()
        } else {
            vec!["moment".to_string(); 9]
        };
        BossPlan {
            id: spec.id.clone(),
            pack_template_id: spec.pack_template_id.clone(),
            subject_mode: spec.subject_mode,
            name_ru: spec.name_ru.clone(),
            name_en: spec.name_en.clone(),
            carousel_description_ru: spec.carousel_description_ru.clone(),
            carousel_description_en: spec.carousel_description_en.clone(),
            mood: if spec.mood.is_empty() {
                "everyday".to_string()
            } else {
                spec.mood.clone()
            },
            sort_order: Some(f64::from(spec.sort_order)),
            segment_id: if spec.segment_id.is_empty() {
                "home".to_string()
            } else {
                spec.segment_id.clone()
            },
            story_arc: String::new(),
            tone: String::new(),
            day_structure: None,
            moments,
        }
    }
}

/// Captions in both locales, in moment order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionsOutput {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub labels_en: Vec<String>,
}

/// Scene descriptions. The EN array feeds image generation; the RU array is
/// reserved for UI previews and is not requested from the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenesOutput {
    #[serde(default)]
    pub scene_descriptions: Vec<String>,
    #[serde(default)]
    pub scene_descriptions_ru: Vec<String>,
}

/// Verdict from the critic agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticOutput {
    // A verdict missing `pass` reads as a rejection
    #[serde(default)]
    pub pass: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Rejection context carried into the next rework call. Scoped to one iteration.
#[derive(Debug, Clone, Default)]
pub struct CriticFeedbackContext {
    pub suggestions: Vec<String>,
    pub reasons: Option<Vec<String>>,
    pub previous_spec: Option<PackSpecRow>,
}

impl CriticFeedbackContext {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
            && self.reasons.as_ref().map_or(true, |r| r.is_empty())
            && self.previous_spec.is_none()
    }
}

/// Assembled pack spec row. Rebuilt, not mutated, on every iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSpecRow {
    pub id: String,
    pub pack_template_id: String,
    pub name_ru: String,
    pub name_en: String,
    pub carousel_description_ru: String,
    pub carousel_description_en: String,
    pub labels: Vec<String>,
    pub labels_en: Vec<String>,
    pub scene_descriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_descriptions_ru: Option<Vec<String>>,
    pub sort_order: i32,
    pub is_active: bool,
    pub mood: String,
    pub sticker_count: u32,
    pub subject_mode: SubjectMode,
    pub cluster: bool,
    pub segment_id: String,
}

/// Pipeline outcome handed back to the caller. Mirrors the wire shape the
/// bot UI consumes: `ok` plus whichever of the optional fields apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackGenerationResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<PackSpecRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<BossPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_reasons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_suggestions: Option<Vec<String>>,
}

impl PackGenerationResult {
    pub fn success(spec: PackSpecRow, plan: BossPlan) -> Self {
        let pack_id = spec.id.clone();
        PackGenerationResult {
            ok: true,
            spec: Some(spec),
            plan: Some(plan),
            pack_id: Some(pack_id),
            error: None,
            critic_reasons: None,
            critic_suggestions: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        PackGenerationResult {
            ok: false,
            spec: None,
            plan: None,
            pack_id: None,
            error: Some(error.into()),
            critic_reasons: None,
            critic_suggestions: None,
        }
    }

    /// Terminal rejection: the last spec is kept for caller inspection.
    pub fn rejected(
        spec: PackSpecRow,
        plan: BossPlan,
        reasons: Vec<String>,
        suggestions: Vec<String>,
    ) -> Self {
        PackGenerationResult {
            ok: false,
            spec: Some(spec),
            plan: Some(plan),
            pack_id: None,
            error: Some("Pack rejected by Critic".to_string()),
            critic_reasons: Some(reasons),
            critic_suggestions: Some(suggestions),
        }
    }
}

/// Progress stage keys reported to the optional `on_progress` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Concept,
    Boss,
    Captions,
    Scenes,
    Critic,
    CaptionsRework,
    ScenesRework,
    Critic2,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            PipelineStage::Concept => "concept",
            PipelineStage::Boss => "boss",
            PipelineStage::Captions => "captions",
            PipelineStage::Scenes => "scenes",
            PipelineStage::Critic => "critic",
            PipelineStage::CaptionsRework => "captions_rework",
            PipelineStage::ScenesRework => "scenes_rework",
            PipelineStage::Critic2 => "critic_2",
        };
        write!(f, "{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_type_from_mode_and_gender() {
        assert_eq!(
            SubjectType::from_mode_and_gender("multi", None),
            SubjectType::Couple
        );
        assert_eq!(
            SubjectType::from_mode_and_gender("single", Some("female")),
            SubjectType::SingleFemale
        );
        assert_eq!(
            SubjectType::from_mode_and_gender("single", Some("woman")),
            SubjectType::SingleFemale
        );
        assert_eq!(
            SubjectType::from_mode_and_gender("Single", Some("MALE")),
            SubjectType::SingleMale
        );
        assert_eq!(
            SubjectType::from_mode_and_gender("single", None),
            SubjectType::Unknown
        );
        assert_eq!(
            SubjectType::from_mode_and_gender("", Some("male")),
            SubjectType::Unknown
        );
    }

    #[test]
    fn test_subject_type_round_trip() {
        for s in ["single_male", "single_female", "couple", "unknown"] {
            let parsed: SubjectType = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("both".parse::<SubjectType>().is_err());
    }

    #[test]
    fn test_boss_plan_tolerates_missing_fields() {
        let plan: BossPlan =
            serde_json::from_str(r#"{"id":"beach_day","moments":["wake up","coffee"]}"#).unwrap();
        assert_eq!(plan.id, "beach_day");
        assert_eq!(plan.subject_mode, SubjectMode::Single);
        assert!(plan.mood.is_empty());
        assert!(plan.sort_order.is_none());
        assert_eq!(plan.moments.len(), 2);
    }

    #[test]
    fn test_minimal_plan_from_spec() {
        let spec = PackSpecRow {
            id: "beach_day".to_string(),
            pack_template_id: "single_v1".to_string(),
            name_ru: "День на пляже".to_string(),
            name_en: "Beach Day".to_string(),
            carousel_description_ru: String::new(),
            carousel_description_en: String::new(),
            labels: vec!["a".to_string(); 9],
            labels_en: vec!["b".to_string(); 9],
            scene_descriptions: vec!["{subject} chest-up".to_string(); 9],
            scene_descriptions_ru: None,
            sort_order: 200,
            is_active: true,
            mood: String::new(),
            sticker_count: 9,
            subject_mode: SubjectMode::Single,
            cluster: false,
            segment_id: String::new(),
        };
        let plan = BossPlan::minimal_from_spec(&spec);
        assert_eq!(plan.id, "beach_day");
        assert_eq!(plan.mood, "everyday");
        assert_eq!(plan.segment_id, "home");
        assert_eq!(plan.moments.len(), 9);
        assert_eq!(plan.moments[0], "a");

        // Fewer than 9 labels falls back to placeholder moments
        let mut short = spec.clone();
        short.labels.truncate(3);
        let plan = BossPlan::minimal_from_spec(&short);
        assert_eq!(plan.moments, vec!["moment".to_string(); 9]);
    }

    #[test]
    fn test_pipeline_stage_ids() {
        assert_eq!(PipelineStage::Critic2.to_string(), "critic_2");
        assert_eq!(PipelineStage::CaptionsRework.to_string(), "captions_rework");
        assert_eq!(
            serde_json::to_string(&PipelineStage::ScenesRework).unwrap(),
            "\"scenes_rework\""
        );
    }

    #[test]
    fn test_result_serialization_skips_absent_fields() {
        let json = serde_json::to_value(PackGenerationResult::failure("boom")).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("spec").is_none());
        assert!(json.get("pack_id").is_none());
    }
}
