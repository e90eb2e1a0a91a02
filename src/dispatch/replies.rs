//! Canned user-facing texts

use chrono::{DateTime, FixedOffset, Utc};

use crate::channels::MediaKind;

pub const NO_PENDING_FILE: &str = "🤔 ไม่พบไฟล์ที่รอการประมวลผล กรุณาส่งไฟล์ใหม่อีกครั้งครับ";

pub const FILE_EXPIRED: &str = "⏰ ไฟล์หมดอายุแล้ว กรุณาส่งไฟล์ใหม่อีกครั้งครับ";

pub const PROCESSING: &str = "⚙️ กำลังประมวลผลไฟล์ตามความต้องการของคุณ รอสักครู่นะครับ...";

pub const PROCESSING_FAILED: &str = "❌ ขออภัยครับ ไม่สามารถประมวลผลไฟล์ได้\n\n\
🔍 สาเหตุที่เป็นไปได้:\n• ไฟล์เสียหาย\n• รูปแบบไฟล์ไม่รองรับ\n• ไฟล์ขนาดใหญ่เกินไป\n\n\
💡 ลองส่งไฟล์ใหม่อีกครั้งครับ";

/// Sent when the file type is refused or the file is too big
pub const UNSUPPORTED_FILE: &str = "🚫 ขออภัยครับ ไฟล์นี้มีรูปแบบหรือขนาดที่ยังไม่รองรับ\n\n\
💡 รองรับรูปภาพ (JPG, PNG, GIF), PDF, เสียง (MP3, WAV, M4A) และวิดีโอ (MP4, MOV) \
ขนาดไม่เกินที่กำหนดครับ";

pub const UNSUPPORTED_MESSAGE: &str =
    "ขออภัย ยังไม่รองรับข้อความประเภทนี้ กรุณาส่งข้อความหรือไฟล์ (รูป, เสียง, วิดีโอ, PDF)";

pub const GENERIC_ERROR: &str = "เกิดข้อผิดพลาดในการประมวลผล กรุณาลองใหม่อีกครั้ง";

pub const CHAT_FAILED: &str = "ขออภัยครับ มีปัญหาในการประมวลผล กรุณาลองใหม่อีกครั้ง 🙏";

pub const FILE_RECEIVE_FAILED: &str =
    "ขออภัยครับ ไม่สามารถรับไฟล์ได้ในขณะนี้ กรุณาลองใหม่อีกครั้ง 🙏";

/// Offset used for timestamps shown to users (Asia/Bangkok)
const DISPLAY_OFFSET_SECS: i32 = 7 * 3600;

/// Menu asking what to do with a received file
#[must_use]
pub fn file_menu(kind: MediaKind) -> String {
    format!(
        "📎 ได้รับไฟล์ {} แล้วครับ!\n\n\
         🤔 คุณต้องการให้ผมทำอะไรกับไฟล์นี้ครับ?\n\n\
         📋 ตัวอย่างที่ทำได้:\n\
         • วิเคราะห์เนื้อหา\n\
         • สรุปสาระสำคัญ\n\
         • แปลข้อความ\n\
         • อธิบายรายละเอียด\n\
         • ตอบคำถามเกี่ยวกับไฟล์\n\n\
         💬 บอกความต้องการมาได้เลยครับ หรือพิมพ์ \"วิเคราะห์\" เพื่อวิเคราะห์ทั่วไป",
        kind.label()
    )
}

/// Help text, greeting the user by name when known
#[must_use]
pub fn help(display_name: Option<&str>) -> String {
    let greeting = display_name
        .filter(|name| !name.trim().is_empty())
        .map_or_else(|| "🤖 สวัสดีครับ!".to_string(), |name| format!("🤖 สวัสดีครับ คุณ{name}!"));

    format!(
        "{greeting} ผมสามารถช่วยคุณได้ดังนี้:\n\n\
         📎 วิเคราะห์ไฟล์: ส่งรูปภาพ, PDF, เสียง, วิดีโอ มาพร้อมบอกว่าต้องการให้ทำอะไร\n\n\
         💬 สนทนาทั่วไป: ถามคำถามอะไรก็ได้\n\n\
         🔍 คำสั่งพิเศษ: help, status\n\n\
         ✨ ตัวอย่าง:\n\
         \"วิเคราะห์รูปนี้หน่อย\"\n\
         \"แปลข้อความในรูป\"\n\
         \"สรุปเนื้อหา PDF\"\n\
         \"แปลงเสียงเป็นข้อความ\""
    )
}

/// Status text with uptime and the current local time
#[must_use]
pub fn status(uptime_minutes: i64, now: DateTime<Utc>) -> String {
    let local = FixedOffset::east_opt(DISPLAY_OFFSET_SECS)
        .map_or_else(|| now.fixed_offset(), |tz| now.with_timezone(&tz));

    format!(
        "✅ สถานะระบบ\n\
         🚀 เซิร์ฟเวอร์: ทำงานปกติ\n\
         🤖 AI: พร้อมใช้งาน\n\
         ⏱️ เวลาทำงาน: {uptime_minutes} นาที\n\
         📊 อัพเดต: {}\n\n\
         💡 ส่งไฟล์หรือข้อความมาได้เลยครับ!",
        local.format("%d/%m/%Y %H:%M:%S")
    )
}

/// Persona prompt wrapped around a general chat message
#[must_use]
pub fn chat_prompt(text: &str) -> String {
    format!(
        "คุณเป็น AI ผู้ช่วยที่เป็นมิตรและใจดี ตอบเป็นภาษาไทยแบบสนทนาธรรมชาติ ไม่เป็นทางการมากเกินไป:\n\n\
         คำถาม: {text}"
    )
}

/// Result message pushed after a file was processed
#[must_use]
pub fn file_result(ai_text: &str) -> String {
    format!("✨ {ai_text}\n\n🔄 หากต้องการวิเคราะห์แบบอื่น สามารถบอกความต้องการใหม่ได้เลยครับ")
}
