//! Keyword fallback classifier, used when the AI summarizer is
//! unavailable.
//!
//! Every email lands in exactly one of three buckets, checked in
//! priority order: system/billing notices first, then marketing, then
//! everything else. Matching is plain case-insensitive substring
//! containment over a bounded text surface, so the result is fully
//! deterministic.

use crate::types::NormalizedEmail;

/// How much of the body participates in keyword matching.
const SURFACE_BODY_CHARS: usize = 200;

/// Urgency bucket for a classified email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Bills, arrears, renewals, security and service-suspension notices.
    /// High priority; wins over Marketing when both keyword sets match.
    SystemBilling,
    /// Promotions, discounts, install/download calls-to-action. Low
    /// priority.
    Marketing,
    /// Everything else. Medium priority.
    Other,
}

/// Keyword term lists, Chinese and English both. Carried as data rather
/// than logic: the lists are heuristic and meant to be replaced or
/// extended without touching the classifier.
#[derive(Debug, Clone)]
pub struct KeywordLists {
    /// Matched against sender + subject + body preview.
    pub system: Vec<String>,
    /// Matched against subject + body preview only.
    pub marketing: Vec<String>,
}

impl KeywordLists {
    /// Built-in bilingual term lists: billing/arrears/renewal/payment,
    /// security and verification, service suspension and expiry for the
    /// system bucket; discounts, limited-time offers, app-install
    /// calls-to-action and promotional superlatives for marketing.
    pub fn default_lists() -> Self {
        let system = [
            "账单", "欠费", "余额不足", "到期", "续费", "支付", "缴费",
            "bill", "payment", "expired", "renew", "overdue",
            "验证码", "登录异常", "密码", "风险",
            "停机", "暂停服务", "服务到期",
        ];
        let marketing = [
            "优惠", "促销", "折扣", "限时", "抢购", "特价", "活动",
            "sale", "offer", "discount", "deal", "promotion", "% off",
            "1折", "2折", "3折", "5折", "低至", "最低",
            "双11", "618", "秒杀", "团购", "福利",
            "更强大", "更高效", "尽在", "立即体验",
            "免费试用", "新功能", "升级体验",
            "app下载", "下载app", "安装",
            "推荐", "精选", "热门", "爆款",
        ];
        Self {
            system: system.iter().map(|s| s.to_string()).collect(),
            marketing: marketing.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for KeywordLists {
    fn default() -> Self {
        Self::default_lists()
    }
}

/// Classification result: the three buckets, each preserving the order
/// in which its emails were supplied.
#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub system: Vec<&'a NormalizedEmail>,
    pub marketing: Vec<&'a NormalizedEmail>,
    pub other: Vec<&'a NormalizedEmail>,
}

impl Classified<'_> {
    pub fn total(&self) -> usize {
        self.system.len() + self.marketing.len() + self.other.len()
    }
}

/// Assign every email to exactly one bucket.
pub fn classify<'a>(emails: &'a [NormalizedEmail], lists: &KeywordLists) -> Classified<'a> {
    let mut result = Classified::default();
    for email in emails {
        match bucket_for(email, lists) {
            Bucket::SystemBilling => result.system.push(email),
            Bucket::Marketing => result.marketing.push(email),
            Bucket::Other => result.other.push(email),
        }
    }
    result
}

/// Bucket for a single email.
pub fn bucket_for(email: &NormalizedEmail, lists: &KeywordLists) -> Bucket {
    let preview: String = email
        .body
        .chars()
        .take(SURFACE_BODY_CHARS)
        .collect::<String>()
        .to_lowercase();
    let from = email.from.to_lowercase();
    let subject = email.subject.to_lowercase();

    let system_hit = lists
        .system
        .iter()
        .any(|term| from.contains(term) || subject.contains(term) || preview.contains(term));
    if system_hit {
        return Bucket::SystemBilling;
    }

    // Marketing surface is subject + preview only, never the sender.
    let marketing_hit = lists
        .marketing
        .iter()
        .any(|term| subject.contains(term) || preview.contains(term));
    if marketing_hit {
        return Bucket::Marketing;
    }

    Bucket::Other
}
