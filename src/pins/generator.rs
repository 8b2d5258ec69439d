use chrono::Local;
use rand::Rng;

/// One label/value pair of a synthetic metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

pub type Snapshot = Vec<Metric>;

/// Business bucket a pinned question resolves to. Selection is cosmetic demo
/// data, but the resolution order is part of the observable contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Operations,
    Deposits,
    Loans,
    Intermediate,
    Customers,
    General,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::Operations => "经营分析",
            Self::Deposits => "存款业务",
            Self::Loans => "贷款业务",
            Self::Intermediate => "中间业务",
            Self::Customers => "客户分析",
            Self::General => "综合分析",
        }
    }
}

/// Resolve a `(category, query)` pair to a bucket. The first matching rule
/// wins and the rule order is fixed; a query mentioning both 存款 and 贷款
/// lands in deposits because deposits is checked first.
pub fn classify(category: &str, query: &str) -> Bucket {
    let asks = |terms: &[&str]| terms.iter().any(|term| query.contains(term));

    if category.contains("经营") || asks(&["经营", "利润", "营收"]) {
        Bucket::Operations
    } else if category.contains("存款") || asks(&["存款"]) {
        Bucket::Deposits
    } else if category.contains("贷款") || asks(&["贷款", "不良"]) {
        Bucket::Loans
    } else if category.contains("中间") || asks(&["中间业务", "手续费"]) {
        Bucket::Intermediate
    } else if category.contains("客户") || asks(&["客户"]) {
        Bucket::Customers
    } else {
        Bucket::General
    }
}

/// Produces a fresh synthetic metrics snapshot for one pinned item.
///
/// Every snapshot leads with an 更新时间 entry carrying the current wall
/// clock; the remaining labels are stable per bucket while the values move
/// within a bounded band around fixed base figures.
#[derive(Debug, Clone)]
pub struct MetricsGenerator {
    bucket: Bucket,
}

impl MetricsGenerator {
    pub fn new(category: &str, query: &str) -> Self {
        Self {
            bucket: classify(category, query),
        }
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut rng = rand::rng();
        let mut drift = |spread: f64| rng.random_range(0.0..spread);

        let mut out = vec![metric(
            "更新时间",
            Local::now().format("%H:%M:%S").to_string(),
        )];

        match self.bucket {
            Bucket::Operations => {
                out.push(metric("营业收入", format!("{:.2}亿", 12.8 + drift(2.0))));
                out.push(metric("净利润", format!("{:.2}亿", 4.2 + drift(0.8))));
                out.push(metric("成本收入比", format!("{:.1}%", 31.5 + drift(3.0))));
                out.push(metric("净息差", format!("{:.2}%", 1.92 + drift(0.2))));
            }
            Bucket::Deposits => {
                out.push(metric("存款余额", format!("{:.1}亿", 858.0 + drift(40.0))));
                out.push(metric("较上月", format!("+{:.1}%", 2.1 + drift(1.5))));
                out.push(metric("活期占比", format!("{:.1}%", 38.0 + drift(5.0))));
                out.push(metric("对公存款", format!("{:.1}亿", 512.0 + drift(25.0))));
            }
            Bucket::Loans => {
                out.push(metric("贷款余额", format!("{:.1}亿", 642.0 + drift(30.0))));
                out.push(metric("不良贷款率", format!("{:.2}%", 1.35 + drift(0.3))));
                out.push(metric("拨备覆盖率", format!("{:.0}%", 182.0 + drift(20.0))));
                out.push(metric("新增投放", format!("{:.1}亿", 18.5 + drift(6.0))));
            }
            Bucket::Intermediate => {
                out.push(metric("中间业务收入", format!("{:.2}亿", 2.35 + drift(0.5))));
                out.push(metric("手续费收入", format!("{:.0}万", 1860.0 + drift(300.0))));
                out.push(metric("同比增长", format!("+{:.1}%", 12.4 + drift(4.0))));
            }
            Bucket::Customers => {
                out.push(metric("客户总数", format!("{:.1}万", 86.3 + drift(1.2))));
                out.push(metric("本月新增", format!("{:.0}户", 3200.0 + drift(600.0))));
                out.push(metric("活跃率", format!("{:.1}%", 62.0 + drift(6.0))));
                out.push(metric("VIP客户", format!("{:.0}户", 4150.0 + drift(120.0))));
            }
            Bucket::General => {
                out.push(metric("系统状态", "正常".to_string()));
            }
        }

        out
    }
}

fn metric(label: &str, value: String) -> Metric {
    Metric {
        label: label.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.iter().map(|m| m.label.as_str()).collect()
    }

    #[test]
    fn loan_query_resolves_to_loan_bucket() {
        let generator = MetricsGenerator::new("贷款业务", "本月不良贷款率是多少？");
        assert_eq!(generator.bucket(), Bucket::Loans);

        let first = generator.snapshot();
        let second = generator.snapshot();
        assert_eq!(first[0].label, "更新时间");
        assert_eq!(second[0].label, "更新时间");
        assert_eq!(labels(&first), labels(&second));
        assert!(labels(&first).contains(&"不良贷款率"));
    }

    #[test]
    fn first_matching_rule_wins_for_ambiguous_queries() {
        // 存款 precedes 贷款 in the rule order, so a query naming both
        // resolves to deposits.
        assert_eq!(classify("", "对比存款和贷款的增长情况"), Bucket::Deposits);
        // An operations hit shadows everything after it.
        assert_eq!(classify("经营分析", "本月存款情况"), Bucket::Operations);
    }

    #[test]
    fn category_label_matches_without_query_keywords() {
        assert_eq!(classify("中间业务", "这个月表现如何"), Bucket::Intermediate);
        assert_eq!(classify("客户分析", "最近趋势"), Bucket::Customers);
    }

    #[test]
    fn unmatched_input_falls_through_to_general_status() {
        let generator = MetricsGenerator::new("", "今天天气怎么样");
        assert_eq!(generator.bucket(), Bucket::General);

        let snapshot = generator.snapshot();
        assert_eq!(labels(&snapshot), vec!["更新时间", "系统状态"]);
        assert_eq!(snapshot[1].value, "正常");
    }

    #[test]
    fn snapshot_values_stay_within_the_drift_band() {
        let generator = MetricsGenerator::new("贷款业务", "");
        for _ in 0..50 {
            let snapshot = generator.snapshot();
            let npl = snapshot
                .iter()
                .find(|m| m.label == "不良贷款率")
                .expect("loan snapshot should carry the NPL ratio");
            let parsed: f64 = npl
                .value
                .trim_end_matches('%')
                .parse()
                .expect("NPL value should be numeric");
            assert!((1.35..1.65 + f64::EPSILON).contains(&parsed), "{parsed}");
        }
    }
}
