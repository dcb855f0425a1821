use once_cell::sync::Lazy;
use regex::Regex;

// 括号样式按优先级排列，取第一个命中的内层文本
static BRACKET_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"《(.+?)》").expect("book bracket pattern"),
        Regex::new("“(.+?)”").expect("quote pattern"),
        Regex::new(r"【(.+?)】").expect("lenticular bracket pattern"),
        Regex::new(r"\[(.+?)\]").expect("square bracket pattern"),
    ]
});

// 标题中常见的营销/栏目词，无括号时剥离后取剩余部分
static GENERIC_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new("攻略|评测|资讯|下载|官网|专区|合集|手游|网游|页游|主机游戏|单机游戏")
        .expect("generic token pattern")
});

/// 从搜索结果标题提取规范化的游戏名
///
/// 清理后为空的标题返回 None，对应的结果块不产出记录
pub fn extract_game_name(title: &str) -> Option<String> {
    for pattern in BRACKET_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(title) {
            return Some(caps[1].to_string());
        }
    }

    let cleaned = GENERIC_TOKENS.replace_all(title, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_pattern_wins_over_keyword_stripping() {
        assert_eq!(
            extract_game_name("《Example Game》攻略"),
            Some("Example Game".to_string())
        );
    }

    #[test]
    fn all_bracket_styles_are_recognized() {
        assert_eq!(extract_game_name("“黑神话”今日上线"), Some("黑神话".to_string()));
        assert_eq!(extract_game_name("【原神】4.0版本前瞻"), Some("原神".to_string()));
        assert_eq!(extract_game_name("[Elden Ring] DLC release"), Some("Elden Ring".to_string()));
    }

    #[test]
    fn keywords_are_stripped_and_remainder_trimmed() {
        assert_eq!(extract_game_name("Some Title 下载"), Some("Some Title".to_string()));
        assert_eq!(extract_game_name("塞尔达传说攻略专区"), Some("塞尔达传说".to_string()));
    }

    #[test]
    fn empty_after_cleaning_suppresses_the_record() {
        assert_eq!(extract_game_name("攻略下载"), None);
        assert_eq!(extract_game_name("   "), None);
    }
}
