//! 顶级域名静态数据
//! 模糊链接只在主机以已知顶级域结尾时才被识别，用于压低误报

use once_cell::sync::Lazy;

/// 全部两字母国家/地区顶级域（正则源码形式）
pub const TLDS_2CH_SRC: &str = "a[cdefgilmnoqrstuwxz]|b[abdefghijmnorstvwyz]|c[acdfghiklmnoruvwxyz]|d[ejkmoz]|e[cegrstu]|f[ijkmor]|g[abdefghilmnpqrstuwy]|h[kmnrtu]|i[delmnoqrst]|j[emop]|k[eghimnprwyz]|l[abcikrstuvy]|m[acdeghklmnopqrstuvwxyz]|n[acefgilopruz]|om|p[aefghklmnrstwy]|qa|r[eosuw]|s[abcdeghijklmnortuvxyz]|t[cdfghjklmnortvwz]|u[agksyz]|v[aceginu]|w[fs]|y[et]|z[amw]";

/// 默认启用的通用顶级域，扩展请使用 `Linkifier::tlds`
pub const TLDS_DEFAULT: [&str; 17] = [
    "biz", "com", "edu", "gov", "net", "org", "pro", "web", "xxx", "aero", "asia", "coop",
    "info", "museum", "name", "shop", "рф",
];

/// 常见通用顶级域（节选自 IANA 列表）
const TLDS_GENERIC: &[&str] = &[
    "academy", "accountant", "actor", "aero", "agency", "app", "art", "asia", "audio", "auto",
    "band", "bank", "bar", "best", "bet", "bid", "bike", "bio", "biz", "black", "blog", "blue",
    "book", "build", "business", "buzz", "cab", "cafe", "cam", "camera", "camp", "capital",
    "car", "cards", "care", "career", "cash", "casino", "cat", "center", "ceo", "chat", "city",
    "click", "cloud", "club", "codes", "coffee", "college", "com", "community", "company",
    "computer", "consulting", "coop", "cool", "credit", "cyou", "dance", "dating", "deals",
    "design", "dev", "diet", "digital", "direct", "directory", "dog", "domains", "download",
    "earth", "eco", "edu", "education", "email", "energy", "engineering", "enterprises",
    "estate", "events", "exchange", "expert", "express", "fail", "family", "fans", "farm",
    "fashion", "finance", "fit", "fitness", "flowers", "fm", "foo", "food", "football",
    "forsale", "foundation", "free", "fun", "fund", "game", "games", "garden", "gay", "gift",
    "gifts", "gives", "glass", "global", "gmbh", "gold", "golf", "google", "gov", "graphics",
    "green", "group", "guide", "guru", "health", "help", "hiphop", "hockey", "holdings",
    "host", "hosting", "house", "how", "icu", "inc", "info", "ink", "institute", "int",
    "international", "investments", "jobs", "kim", "kitchen", "land", "law", "lawyer",
    "life", "limited", "link", "live", "llc", "loan", "love", "ltd", "luxury", "market",
    "marketing", "media", "mil", "mobi", "moe", "money", "movie", "museum", "music", "name",
    "net", "network", "news", "ninja", "one", "online", "ooo", "org", "page", "partners",
    "party", "photo", "photography", "photos", "pics", "pink", "pizza", "place", "plus",
    "post", "press", "pro", "productions", "properties", "pub", "quest", "recipes", "red",
    "rent", "repair", "report", "rest", "review", "reviews", "rocks", "run", "sale", "school",
    "science", "services", "shop", "shopping", "show", "site", "ski", "social", "software",
    "solutions", "space", "sport", "store", "stream", "studio", "study", "style", "support",
    "systems", "team", "tech", "technology", "tel", "theater", "tips", "today", "tools",
    "top", "tours", "town", "toys", "trade", "training", "travel", "tv", "university", "uno",
    "vip", "vision", "vote", "watch", "web", "website", "wiki", "win", "wine", "work",
    "works", "world", "wtf", "xxx", "xyz", "yoga", "zone", "рф", "онлайн", "сайт", "中国",
    "公司", "网络",
];

/// 把 `a[cd]|om` 形式的两字母源码展开为 `["ac", "ad", "om"]`
fn expand_2ch_src(src: &str) -> Vec<String> {
    let mut result = Vec::new();
    for part in src.split('|') {
        let mut chars = part.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        let rest: String = chars.collect();
        match rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Some(set) => result.extend(set.chars().map(|c| format!("{}{}", first, c))),
            None => result.push(format!("{}{}", first, rest)),
        }
    }
    result
}

/// 扩展顶级域列表：通用顶级域 + 全部两字母顶级域
/// 用 `Linkifier::tlds(TLDS.as_slice(), false)` 替换默认列表时，两字母域将按精确列表匹配
pub static TLDS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut list: Vec<String> = TLDS_GENERIC.iter().map(|s| s.to_string()).collect();
    list.extend(expand_2ch_src(TLDS_2CH_SRC));
    list.sort();
    list.dedup();
    list
});

/// 当前生效的顶级域配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TldList {
    list: Vec<String>,
    // 替换过默认列表后，两字母域不再走通配，而是按列表精确匹配
    replaced: bool,
}

impl Default for TldList {
    fn default() -> Self {
        Self {
            list: TLDS_DEFAULT.iter().map(|s| s.to_string()).collect(),
            replaced: false,
        }
    }
}

impl TldList {
    /// 整体替换列表
    pub fn replace<S: AsRef<str>>(&mut self, list: &[S]) {
        self.list = list.iter().map(|s| s.as_ref().to_string()).collect();
        self.replaced = true;
    }

    /// 合并到当前列表：去重后按字典序倒序，保证长域名不被其前缀遮蔽
    pub fn merge<S: AsRef<str>>(&mut self, list: &[S]) {
        self.list.extend(list.iter().map(|s| s.as_ref().to_string()));
        self.list.sort_unstable_by(|a, b| b.cmp(a));
        self.list.dedup();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.list
    }

    pub fn is_replaced(&self) -> bool {
        self.replaced
    }

    /// 生成顶级域交替式源码：列表项（按字面转义）+ 两字母通配（未替换时）+ `xn--` 前缀
    pub fn alternation(&self, src_xn: &str) -> String {
        let mut parts: Vec<String> = self.list.iter().map(|t| regex::escape(t)).collect();
        if !self.replaced {
            parts.push(TLDS_2CH_SRC.to_string());
        }
        parts.push(src_xn.to_string());
        parts.join("|")
    }
}
