use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub(crate) fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    pub(crate) fn other(self) -> Self {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }

    pub(crate) fn texts(self) -> &'static Texts {
        match self {
            Self::En => &EN,
            Self::Zh => &ZH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Every user-facing string, one table per language.
#[derive(Debug)]
pub(crate) struct Texts {
    pub(crate) app_title: &'static str,
    pub(crate) subtitle: &'static str,
    pub(crate) site_label: &'static str,
    /// Label of the switch, written in the language it switches to.
    pub(crate) language_toggle: &'static str,
    pub(crate) counter_prefix: &'static str,
    pub(crate) counter_suffix: &'static str,
    pub(crate) select_all: &'static str,
    pub(crate) clear: &'static str,
    pub(crate) copy_image: &'static str,
    pub(crate) download_image: &'static str,
    pub(crate) copying: &'static str,
    pub(crate) copied: &'static str,
    pub(crate) copy_failed: &'static str,
    pub(crate) downloading: &'static str,
    pub(crate) downloaded: &'static str,
    pub(crate) download_failed: &'static str,
    pub(crate) unknown_error: &'static str,
    pub(crate) report: &'static str,
    pub(crate) prompt_copied: &'static str,
    pub(crate) prompt_opened: &'static str,
    pub(crate) style_normal: &'static str,
    pub(crate) style_persona: &'static str,
    pub(crate) watched: &'static str,
    pub(crate) not_watched: &'static str,
    pub(crate) none: &'static str,
    pub(crate) title_separator: &'static str,
    pub(crate) label_separator: &'static str,
    pub(crate) year_suffix: &'static str,
    pub(crate) prompt_normal: &'static str,
    pub(crate) prompt_persona: &'static str,
    pub(crate) nothing_watched: &'static str,
    pub(crate) save_failed: &'static str,
    pub(crate) clipboard_hold: &'static str,
    pub(crate) controls: &'static str,
    pub(crate) status: &'static str,
    pub(crate) key_toggle: &'static str,
    pub(crate) key_quit: &'static str,
    pub(crate) key_style: &'static str,
    pub(crate) key_copy: &'static str,
    pub(crate) key_scroll: &'static str,
    pub(crate) key_close: &'static str,
}

impl Texts {
    pub(crate) fn counter(&self, watched: usize, total: usize) -> String {
        format!(
            "{} {watched}/{total} {}",
            self.counter_prefix, self.counter_suffix
        )
    }

    pub(crate) fn year_header(&self, year: u16) -> String {
        format!("{year}{}", self.year_suffix)
    }
}

static EN: Texts = Texts {
    app_title: "Anime Generations",
    subtitle: "Click to select anime you've watched",
    site_label: "anime-sedai",
    language_toggle: "中文",
    counter_prefix: "I've watched",
    counter_suffix: "anime",
    select_all: "Select All",
    clear: "Clear",
    copy_image: "Copy Image",
    download_image: "Download Image",
    copying: "Copying...",
    copied: "Copied successfully",
    copy_failed: "Copy failed",
    downloading: "Downloading...",
    downloaded: "Downloaded successfully",
    download_failed: "Download failed",
    unknown_error: "Unknown error",
    report: "Report",
    prompt_copied: "Prompt copied",
    prompt_opened: "Opened in ChatWise",
    style_normal: "Normal",
    style_persona: "Persona",
    watched: "Watched",
    not_watched: "Not watched",
    none: "none",
    title_separator: ", ",
    label_separator: ": ",
    year_suffix: "",
    prompt_normal: "Below are the most popular anime of each year, split into the ones I have \
watched and the ones I have not. Based on this watch history, describe my taste in anime, \
guess which era I started watching in, and recommend a few titles I would probably enjoy.",
    prompt_persona: "You are a sharp-tongued veteran otaku who has seen everything and is \
impressed by nothing. Below are the most popular anime of each year, split into the ones I \
have watched and the ones I have not. Roast my watch history in character: point out what my \
picks say about me, mock the obvious gaps, and finish with a few grudging recommendations.",
    nothing_watched: "Nothing selected yet.",
    save_failed: "Could not save state",
    clipboard_hold: "Keeping the image on the clipboard until something else is copied...",
    controls: "Controls",
    status: "Status",
    key_toggle: "toggle",
    key_quit: "quit",
    key_style: "style",
    key_copy: "copy",
    key_scroll: "scroll",
    key_close: "close",
};

static ZH: Texts = Texts {
    app_title: "动画世代",
    subtitle: "点击选择你看过的动画",
    site_label: "anime-sedai",
    language_toggle: "English",
    counter_prefix: "我看过",
    counter_suffix: "部动画",
    select_all: "全选",
    clear: "清除",
    copy_image: "复制图片",
    download_image: "下载图片",
    copying: "复制中",
    copied: "复制成功",
    copy_failed: "复制失败",
    downloading: "下载中",
    downloaded: "下载成功",
    download_failed: "下载失败",
    unknown_error: "未知错误",
    report: "报告",
    prompt_copied: "提示词已复制",
    prompt_opened: "已在 ChatWise 中打开",
    style_normal: "普通",
    style_persona: "毒舌",
    watched: "看过",
    not_watched: "没看过",
    none: "无",
    title_separator: "、",
    label_separator: "：",
    year_suffix: "年",
    prompt_normal: "下面是历年最受关注的动画，分为我看过的和没看过的。请根据这份观看记录分析我的动画口味，\
推测我是从哪个年代开始看动画的，并推荐几部我可能会喜欢的作品。",
    prompt_persona: "你是一个什么都看过、对什么都不以为然的毒舌老二次元。下面是历年最受关注的动画，\
分为我看过的和没看过的。请用你的口吻锐评我的观看记录：说说我的选择暴露了什么，嘲讽一下明显的空白，\
最后勉为其难地推荐几部作品。",
    nothing_watched: "还没有选择任何动画。",
    save_failed: "保存失败",
    clipboard_hold: "图片会保留在剪贴板中，直到复制其他内容……",
    controls: "操作",
    status: "状态",
    key_toggle: "选择",
    key_quit: "退出",
    key_style: "风格",
    key_copy: "复制",
    key_scroll: "滚动",
    key_close: "关闭",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_serializes_as_lowercase_code() {
        assert_eq!(serde_json::to_string(&Language::Zh).unwrap(), "\"zh\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::En);
    }

    #[test]
    fn counter_is_localized() {
        assert_eq!(Language::En.texts().counter(3, 180), "I've watched 3/180 anime");
        assert_eq!(Language::Zh.texts().counter(3, 180), "我看过 3/180 部动画");
    }

    #[test]
    fn other_flips_between_languages() {
        assert_eq!(Language::En.other(), Language::Zh);
        assert_eq!(Language::Zh.other().other(), Language::Zh);
    }
}
