//! Quick-pick style descriptions offered next to the prompt field.

pub const STYLE_PRESETS: [&str; 4] = [
    "日系極簡風格",
    "復古丹寧外套",
    "正式晚宴禮服",
    "Cyberpunk 街頭風",
];

/// Looks up a preset by zero-based index.
pub fn style_preset(index: usize) -> Option<&'static str> {
    STYLE_PRESETS.get(index).copied()
}
