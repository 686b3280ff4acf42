// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 解析规则表
//!
//! 所有关键词表、单位表、黑白名单都是有序的只读数据，进程启动时构建一次，
//! 以 `Rules` 上下文的形式传入各个解析组件。表的顺序本身承载优先级语义
//! （例如否定状态词必须先于肯定状态词检查），不能折叠成无序哈希表。

use chrono_tz::Tz;
use once_cell::sync::Lazy;

/// 文件大小单位换算表（转为字节）
///
/// 十进制与二进制写法统一按1024进制处理
static SIZE_UNITS: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    let kib = 1024.0_f64;
    vec![
        ("B", 1.0),
        ("KB", kib),
        ("MB", kib.powi(2)),
        ("GB", kib.powi(3)),
        ("TB", kib.powi(4)),
        ("PB", kib.powi(5)),
        ("KIB", kib),
        ("MIB", kib.powi(2)),
        ("GIB", kib.powi(3)),
        ("TIB", kib.powi(4)),
        ("PIB", kib.powi(5)),
    ]
});

/// 时间单位换算表（转为小时）
static TIME_UNITS: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    let sec = 1.0 / 3600.0;
    let min = 1.0 / 60.0;
    vec![
        ("秒", sec),
        ("S", sec),
        ("SEC", sec),
        ("SECOND", sec),
        ("SECONDS", sec),
        ("分", min),
        ("M", min),
        ("MIN", min),
        ("MINUTE", min),
        ("MINUTES", min),
        ("分钟", min),
        ("分鐘", min),
        ("时", 1.0),
        ("H", 1.0),
        ("HR", 1.0),
        ("HRS", 1.0),
        ("HOUR", 1.0),
        ("HOURS", 1.0),
        ("小时", 1.0),
        ("小時", 1.0),
        ("天", 24.0),
        ("D", 24.0),
        ("DAY", 24.0),
        ("DAYS", 24.0),
        ("日", 24.0),
        ("周", 24.0 * 7.0),
        ("W", 24.0 * 7.0),
        ("WEEK", 24.0 * 7.0),
        ("WEEKS", 24.0 * 7.0),
        ("週", 24.0 * 7.0),
        ("月", 24.0 * 30.0),
        ("MONTH", 24.0 * 30.0),
        ("MONTHS", 24.0 * 30.0),
        ("個月", 24.0 * 30.0),
        ("年", 24.0 * 365.0),
        ("Y", 24.0 * 365.0),
        ("YEAR", 24.0 * 365.0),
        ("YEARS", 24.0 * 365.0),
    ]
});

/// 考核关键词（用于识别考核区块，简繁体+英文）
const ASSESSMENT_KEYWORDS: &[&str] = &[
    // 简体
    "考核",
    "新手任务",
    "养成期",
    "试用期",
    "观察期",
    "新人任务",
    "保号",
    "活跃度",
    "做种任务",
    "上传任务",
    "魔力任务",
    "试炼",
    "分支任务",
    "挑战任务",
    "成就任务",
    // 繁体
    "養成期",
    "試用期",
    "觀察期",
    "新人任務",
    "做種任務",
    "上傳任務",
    "魔力任務",
    "試煉",
    "分支任務",
    "挑戰任務",
    "成就任務",
    // 英文
    "assessment",
    "probation",
    "trial",
    "newbie",
    "requirement",
    "quest",
    "mission",
];

/// 指标名称关键词（按指标类型分组，用于宽松模式识别）
const METRIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "upload",
        &["上传", "上傳", "upload", "上传量", "上傳量", "上传增量", "上傳增量"],
    ),
    (
        "download",
        &["下载", "下載", "download", "下载量", "下載量", "下载增量", "下載增量"],
    ),
    ("ratio", &["分享率", "分享比", "比率", "ratio", "share ratio"]),
    (
        "bonus",
        &[
            "魔力", "积分", "魔力值", "積分", "bonus", "points", "karma", "credits", "魔力增量",
            "做种积分", "做種積分",
        ],
    ),
    (
        "seeding",
        &["做种", "做種", "保种", "保種", "seeding", "seed", "做种量", "做種量"],
    ),
    (
        "seedtime",
        &[
            "做种时间", "做種時間", "保种时间", "保種時間", "seed time", "seeding time",
            "做种时长", "做種時長",
        ],
    ),
    (
        "seedsize",
        &["做种体积", "做種體積", "保种体积", "保種體積", "seeding size"],
    ),
    ("torrents", &["发布数", "發布數", "发种数", "發種數"]),
    ("invites", &["邀请", "邀請", "invite", "邀请数", "邀請數"]),
];

/// 有效指标名称白名单（严格模式使用）
///
/// 只收录考核特有的名称，避免与站点统计混淆
const VALID_METRIC_NAMES: &[&str] = &[
    "上传量",
    "上傳量",
    "上传增量",
    "上傳增量",
    "下载量",
    "下載量",
    "下载增量",
    "下載增量",
    "分享率",
    "分享比",
    "魔力",
    "魔力值",
    "魔力增量",
    "积分",
    "積分",
    "积分增量",
    "做种积分",
    "做種積分",
    "做种积分增量",
    "做种时间",
    "做種時間",
    "做种时长",
    "做種時長",
    "保种时间",
    "保種時間",
    "做种体积",
    "做種體積",
    "保种体积",
    "保種體積",
];

/// 无效指标名称黑名单
const INVALID_METRIC_PATTERNS: &[&str] = &[
    // 站点统计信息
    "注册用户",
    "註冊用戶",
    "访问用户",
    "訪問用戶",
    "当前访问",
    "當前訪問",
    "种子总",
    "種子總",
    "总上传",
    "總上傳",
    "总下载",
    "總下載",
    "总数据",
    "總數據",
    "贵宾",
    "貴賓",
    "被警告",
    "被禁",
    "男生",
    "女生",
    "断种",
    "斷種",
    "同伴",
    "tracker",
    "Tracker",
    // 用户等级
    "Peasant",
    "User",
    "Power User",
    "Elite",
    "Crazy",
    "Insane",
    "Veteran",
    "Extreme",
    "Ultimate",
    "Master",
    // 版块/帖子
    "版块",
    "版塊",
    "Feedback",
    "Appeal",
    "Record",
    // 种子标题特征
    "1080p",
    "2160p",
    "4K",
    "BluRay",
    "Blu-ray",
    "WEB-DL",
    "REMUX",
    "HDR",
    "DoVi",
    "H.264",
    "H.265",
    "HEVC",
    "AVC",
    "DTS",
    "AAC",
    "FLAC",
    "Atmos",
    "导演",
    "主演",
    "类别",
    "國語",
    "国语",
    "中字",
    "字幕",
    // 投票选项
    "弃权",
    "棄權",
    "是，",
    "否，",
    // 时间标签（非指标）
    "开注时间",
    "開注時間",
    "发邀时间",
    "發邀時間",
    // 公告信息
    "招聘",
    "解封",
    "申诉",
    "申訴",
    "QQ群",
    "TG群",
    "PM管理",
];

/// 考核区块结束标记
const ASSESSMENT_END_MARKERS: &[&str] = &[
    "最新种子",
    "最新發布",
    "最新帖子",
    "论坛",
    "論壇",
    "公告",
    "公告栏",
    "热门",
    "熱門",
    "推荐",
    "推薦",
    "排行",
    "榜单",
    "榜單",
    "友情链接",
    "友情連結",
    "站点统计",
    "站點統計",
    "版权",
    "版權",
    "Copyright",
    "©",
];

/// 支持的日期时间格式（按顺序尝试，首个匹配生效）
///
/// 解析前统一把 `/` 替换为 `-`
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d"];

/// 否定状态词（必须在肯定词之前全部检查完）
///
/// 否定词常以肯定词为子串（如"未通过"包含"通过"），拆成两张表
/// 依次检查，结构上保证否定优先
const NEGATIVE_STATUS_KEYWORDS: &[&str] = &[
    "未通过",
    "未通過",
    "不合格",
    "失敗",
    "失败",
    "未達標",
    "未达标",
    "未完成",
    "未達成",
    "未达成",
    "fail",
    "failed",
    "incomplete",
];

/// 肯定状态词
const POSITIVE_STATUS_KEYWORDS: &[&str] = &[
    "已通过",
    "已通過",
    "已完成",
    "已達標",
    "已达标",
    "已達成",
    "已达成",
    "通过",
    "通過",
    "合格",
    "達標",
    "达标",
    "達成",
    "达成",
    "完成",
    "pass",
    "passed",
    "complete",
];

/// 通过图标
const PASS_ICONS: &[char] = &['✓', '✔', '√', '☑', '✅', '⭕', '🟢', '🟩'];

/// 未通过图标
const FAIL_ICONS: &[char] = &['✗', '✘', '×', '☒', '❌', '⭙', '🔴', '🟥'];

/// 解析规则上下文
///
/// 各组件共享的只读配置，包含全部关键词/单位表、时区和进度估算常量
#[derive(Debug, Clone)]
pub struct Rules {
    /// 剩余天数计算使用的时区
    pub timezone: Tz,
    /// 文件大小单位表（转为字节）
    pub size_units: &'static [(&'static str, f64)],
    /// 时间单位表（转为小时）
    pub time_units: &'static [(&'static str, f64)],
    /// 考核关键词
    pub assessment_keywords: &'static [&'static str],
    /// 指标类型关键词
    pub metric_keywords: &'static [(&'static str, &'static [&'static str])],
    /// 指标名称白名单
    pub valid_metric_names: &'static [&'static str],
    /// 指标名称黑名单
    pub invalid_metric_patterns: &'static [&'static str],
    /// 考核区块结束标记
    pub end_markers: &'static [&'static str],
    /// 日期时间格式表
    pub datetime_formats: &'static [&'static str],
    /// 否定状态词
    pub negative_status_keywords: &'static [&'static str],
    /// 肯定状态词
    pub positive_status_keywords: &'static [&'static str],
    /// 通过图标
    pub pass_icons: &'static [char],
    /// 未通过图标
    pub fail_icons: &'static [char],
    /// 未通过但有剩余量数据时的进度估算值
    pub partial_progress_with_data: f64,
    /// 未通过且无数据时的进度估算值
    pub partial_progress_without_data: f64,
}

impl Rules {
    /// 按指定时区构建规则上下文
    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            timezone,
            size_units: &SIZE_UNITS,
            time_units: &TIME_UNITS,
            assessment_keywords: ASSESSMENT_KEYWORDS,
            metric_keywords: METRIC_KEYWORDS,
            valid_metric_names: VALID_METRIC_NAMES,
            invalid_metric_patterns: INVALID_METRIC_PATTERNS,
            end_markers: ASSESSMENT_END_MARKERS,
            datetime_formats: DATETIME_FORMATS,
            negative_status_keywords: NEGATIVE_STATUS_KEYWORDS,
            positive_status_keywords: POSITIVE_STATUS_KEYWORDS,
            pass_icons: PASS_ICONS,
            fail_icons: FAIL_ICONS,
            partial_progress_with_data: 0.3,
            partial_progress_without_data: 0.1,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::with_timezone(chrono_tz::Asia::Shanghai)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_units_binary_convention() {
        let rules = Rules::default();
        let gb = rules
            .size_units
            .iter()
            .find(|(u, _)| *u == "GB")
            .map(|(_, f)| *f)
            .unwrap();
        let gib = rules
            .size_units
            .iter()
            .find(|(u, _)| *u == "GIB")
            .map(|(_, f)| *f)
            .unwrap();
        assert_eq!(gb, 1024.0 * 1024.0 * 1024.0);
        assert_eq!(gb, gib);
    }

    #[test]
    fn test_negative_keywords_precede_positive() {
        let rules = Rules::default();
        // "未通过"在否定表中，"通过"在肯定表中，两表分开保证重叠时否定先命中
        assert!(rules.negative_status_keywords.contains(&"未通过"));
        assert!(rules.positive_status_keywords.contains(&"通过"));
    }
}
