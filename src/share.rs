use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use time_humanize::{Accuracy, HumanTime, Tense};
use webbrowser::Browser;

use crate::engine::StatsSnapshot;

const SHARE_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Everything a share link resolves to: the session identity plus a frozen
/// stats snapshot. Stored as JSON by the highlight database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
    pub id: String,
    pub session_id: String,
    pub mode: String,
    pub file_name: Option<String>,
    pub created_at_ms: i64,
    pub stats: StatsSnapshot,
}

/// "SH" + creation time in base-36 + five random lowercase alphanumerics.
pub fn mint_share_id<R: Rng>(rng: &mut R, now_ms: i64) -> String {
    let tail: String = (0..5)
        .map(|_| SHARE_ID_CHARS[rng.gen_range(0..SHARE_ID_CHARS.len())] as char)
        .collect();
    format!("SH{}{}", to_base36(now_ms), tail)
}

fn to_base36(mut n: i64) -> String {
    if n <= 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap()
}

pub fn share_url(share_id: &str) -> String {
    format!("https://fighthype.ai/#share={share_id}")
}

/// Twitter intent URL carrying the highlight pitch and the share link.
pub fn tweet_url(payload: &SharePayload) -> String {
    let text = format!(
        "Just scored {}% power on @FightHypeAI! {} strikes with {}x combo. \
         Check out my highlight: {} #FIGHTHYPEChallenge #BoxingTech",
        payload.stats.current_power,
        payload.stats.punch_count,
        payload.stats.combo_count,
        share_url(&payload.id),
    );
    format!(
        "https://twitter.com/intent/tweet?text={}",
        encode_component(&text)
    )
}

/// Percent-encode a URL query component (unreserved characters pass through).
fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Open the tweet composer in the system browser, if one is available.
pub fn open_tweet(payload: &SharePayload) -> bool {
    if Browser::is_available() {
        webbrowser::open(&tweet_url(payload)).is_ok()
    } else {
        false
    }
}

/// Humanized age for community rows, e.g. "5 minutes ago".
pub fn time_ago(created_at: DateTime<Local>) -> String {
    let elapsed = Local::now()
        .signed_duration_since(created_at)
        .to_std()
        .unwrap_or_default();
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}
