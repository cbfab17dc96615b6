// Spec assembly: plan + captions + scenes -> pack spec row

use crate::models::{BossPlan, CaptionsOutput, PackSpecRow, ScenesOutput};

const STICKER_COUNT: u32 = 9;
const DEFAULT_SORT_ORDER: i32 = 200;

/// Combine the plan with the latest captions and scenes into a spec row.
///
/// Pure: same inputs produce the same row. Array fields are truncated to 9
/// entries but never padded; a short upstream result stays short and is left
/// for the critic to flag. No content validation happens here.
pub fn assemble_spec(plan: &BossPlan, captions: &CaptionsOutput, scenes: &ScenesOutput) -> PackSpecRow {
    let scene_descriptions_ru = if scenes.scene_descriptions_ru.is_empty() {
        None
    } else {
        Some(truncate(&scenes.scene_descriptions_ru))
    };

    PackSpecRow {
        id: plan.id.clone(),
        pack_template_id: plan.pack_template_id.clone(),
        name_ru: plan.name_ru.clone(),
        name_en: plan.name_en.clone(),
        carousel_description_ru: plan.carousel_description_ru.clone(),
        carousel_description_en: plan.carousel_description_en.clone(),
        labels: truncate(&captions.labels),
        labels_en: truncate(&captions.labels_en),
        scene_descriptions: truncate(&scenes.scene_descriptions),
        scene_descriptions_ru,
        sort_order: normalize_sort_order(plan.sort_order),
        is_active: true,
        mood: non_empty_or(&plan.mood, "everyday"),
        sticker_count: STICKER_COUNT,
        subject_mode: plan.subject_mode,
        cluster: false,
        segment_id: non_empty_or(&plan.segment_id, "home"),
    }
}

fn truncate(items: &[String]) -> Vec<String> {
    items.iter().take(STICKER_COUNT as usize).cloned().collect()
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

// Absent, non-finite, or zero all coerce to the default slot.
fn normalize_sort_order(value: Option<f64>) -> i32 {
    match value {
        Some(n) if n.is_finite() && n != 0.0 => n as i32,
        _ => DEFAULT_SORT_ORDER,
    }
}
