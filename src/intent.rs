//! Maps a user's free-text intent to a generation prompt
//!
//! Rules are keyword lists matched case-insensitively as substrings. The rule
//! whose keyword appears earliest in the text wins; equal positions go to the
//! rule listed first. Text matching no rule is echoed into a fallback prompt.

use crate::channels::MediaKind;

/// What the user asked to be done with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Translate,
    Summarize,
    Analyze,
    Read,
    Transcribe,
    Tabular,
    /// No keyword matched; the literal request is passed through
    Custom,
}

struct Rule {
    intent: Intent,
    keywords: &'static [&'static str],
    audio_only: bool,
}

const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Translate,
        keywords: &["แปล", "translate"],
        audio_only: false,
    },
    Rule {
        intent: Intent::Summarize,
        keywords: &["สรุป", "summar"],
        audio_only: false,
    },
    Rule {
        intent: Intent::Analyze,
        keywords: &["วิเคราะห์", "analy"],
        audio_only: false,
    },
    Rule {
        intent: Intent::Read,
        keywords: &["อ่าน", "ข้อความ", "read", "text", "ocr"],
        audio_only: false,
    },
    Rule {
        intent: Intent::Transcribe,
        keywords: &["เสียง", "transcri", "audio", "speech"],
        audio_only: true,
    },
    Rule {
        intent: Intent::Tabular,
        keywords: &["ตาราง", "ข้อมูล", "table", "data"],
        audio_only: false,
    },
];

/// Pick the intent for `text` given the kind of file waiting
#[must_use]
pub fn classify(text: &str, kind: MediaKind) -> Intent {
    let lower = text.to_lowercase();

    RULES
        .iter()
        .enumerate()
        .filter(|(_, rule)| !rule.audio_only || kind == MediaKind::Audio)
        .filter_map(|(order, rule)| {
            rule.keywords
                .iter()
                .filter_map(|kw| lower.find(kw))
                .min()
                .map(|pos| (pos, order, rule.intent))
        })
        .min_by_key(|&(pos, order, _)| (pos, order))
        .map_or(Intent::Custom, |(_, _, intent)| intent)
}

/// Generation prompt for an intent
#[must_use]
pub fn prompt_for(intent: Intent, kind: MediaKind, text: &str) -> String {
    match intent {
        Intent::Translate => {
            "แปลข้อความทั้งหมดในไฟล์นี้เป็นภาษาไทย หากมีข้อความหลายภาษาให้แปลทั้งหมด".to_string()
        }
        Intent::Summarize => "สรุปเนื้อหาสำคัญของไฟล์นี้ให้กระชับและเข้าใจง่าย".to_string(),
        Intent::Analyze => "วิเคราะห์และอธิบายเนื้อหาของไฟล์นี้อย่างละเอียด".to_string(),
        Intent::Read if kind == MediaKind::Image => {
            "อ่านข้อความทั้งหมดที่มีในรูปภาพนี้ และจัดรูปแบบให้อ่านง่าย".to_string()
        }
        Intent::Read => "อ่านและแสดงเนื้อหาทั้งหมดในไฟล์นี้".to_string(),
        Intent::Transcribe => "แปลงเสียงเป็นข้อความและสรุปเนื้อหาที่พูด".to_string(),
        Intent::Tabular => "วิเคราะห์ตารางหรือข้อมูลในไฟล์นี้ และสรุปผลการวิเคราะห์".to_string(),
        Intent::Custom => format!(
            "ต่อไปนี้คือความต้องการของผู้ใช้: \"{text}\"\n\n\
             กรุณาประมวลผลไฟล์นี้ตามความต้องการที่ระบุ หากไม่สามารถทำได้ให้อธิบายเหตุผลและแนะนำทางเลือกอื่น"
        ),
    }
}

/// Classify `text` and build the matching prompt
#[must_use]
pub fn build_prompt(text: &str, kind: MediaKind) -> String {
    prompt_for(classify(text, kind), kind, text)
}
