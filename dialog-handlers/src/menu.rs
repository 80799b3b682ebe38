//! Menu labels, reply texts and command parsing.

use crate::usage::UsageRecord;

pub const LABEL_GENERATE_IMAGE: &str = "Генерировать изображение";
pub const LABEL_WIKI: &str = "Получить информацию из Wikipedia";
pub const LABEL_STATS: &str = "Статистика";

/// Reply keyboard, one button per row.
pub const MENU_BUTTONS: [&str; 3] = [LABEL_GENERATE_IMAGE, LABEL_WIKI, LABEL_STATS];

pub const MSG_WELCOME: &str =
    "Привет! Я бот для генерации изображений и поиска информации в Wikipedia.\nВыберите действие:";
pub const MSG_ASK_IMAGE_PROMPT: &str =
    "Введите текстовый запрос (начните с '!' для генерации изображения):";
pub const MSG_ASK_WIKI_QUERY: &str = "Введите слово или фразу, чтобы получить информацию:";
pub const MSG_CHOOSE_ACTION: &str = "Пожалуйста, выберите одно из действий на клавиатуре.";
pub const MSG_GENERATING: &str = "Генерирую картинку..";
pub const MSG_EMPTY_PROMPT: &str = "Запрос пуст, попробуйте ещё раз.";
pub const MSG_GENERATION_FAILED: &str = "Не удалось сгенерировать изображение, попробуйте позже.";
pub const MSG_GENERATION_TIMEOUT: &str =
    "Генерация заняла слишком много времени, попробуйте позже.";

/// Leading character of an image prompt.
pub const PROMPT_SENTINEL: char = '!';

/// Action selected from the idle menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// `/start` or `/help`.
    Start,
    GenerateImage,
    WikiLookup,
    Stats,
}

impl MenuCommand {
    /// Parses a message text; `None` for anything that is not a menu action.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(command) = text.strip_prefix('/') {
            // "/start@my_bot payload" → "start"
            let name = command
                .split_whitespace()
                .next()
                .and_then(|word| word.split('@').next())
                .unwrap_or_default();
            return match name {
                "start" | "help" => Some(Self::Start),
                _ => None,
            };
        }
        match text {
            LABEL_GENERATE_IMAGE => Some(Self::GenerateImage),
            LABEL_WIKI => Some(Self::WikiLookup),
            LABEL_STATS => Some(Self::Stats),
            _ => None,
        }
    }
}

/// Removes the sentinel (when present) and surrounding whitespace.
pub fn strip_sentinel(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix(PROMPT_SENTINEL).unwrap_or(text).trim()
}

pub fn format_stats(record: &UsageRecord) -> String {
    format!(
        "Статистика:\nИзображения запрошены: {}\nWikipedia запросы: {}",
        record.image_requests, record.wiki_requests
    )
}
